//! Local error alias for the crypto crate.

pub use libreseed_types::error::CryptoError;
