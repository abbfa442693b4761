//! Re-exports the core error taxonomy from the central types crate so
//! downstream crates can depend on `libreseed-api` alone for both traits and
//! errors.

pub use libreseed_types::error::{
    CoreError, CryptoError, DiscoveryError, EngineError, ErrorCode, TransportError,
    ValidationError,
};
pub use libreseed_types::Result;
