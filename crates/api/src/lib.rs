//! # LibreSeed API Crate Lints
//!
//! This crate enforces a strict set of lints to ensure high-quality,
//! panic-free, and well-documented code. Panics are disallowed in non-test
//! code to promote robust error handling.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing
    )
)]
//! # LibreSeed API
//!
//! Cross-cutting trait contracts for the LibreSeed protocol engine: the
//! stable seam between the engine's core crates and both the concrete
//! implementations (`libreseed-crypto`, a `libp2p`-backed DHT, a
//! `librqbit`-backed torrent engine) and the external collaborators named in
//! the protocol's external-interfaces section.

/// Contracts for the external collaborators (storage, trust store, clock)
/// named in the protocol's external-interfaces section.
pub mod collaborators;
/// Defines unified traits for cryptographic primitives.
pub mod crypto;
/// The `DhtClient` contract for the distributed hash table adapter.
pub mod dht;
/// Re-exports the core error taxonomy from `libreseed-types`.
pub mod error;
/// The `TorrentEngine` contract for the BitTorrent swarm adapter.
pub mod torrent;

/// A curated set of the most commonly used traits and types.
pub mod prelude {
    pub use crate::collaborators::{Clock, Storage, SystemClock, TrustStore};
    pub use crate::crypto::{BatchVerifier, SerializableKey, Signature, SigningKey, SigningKeyPair, VerifyingKey};
    pub use crate::dht::{DhtClient, DhtKey};
    pub use crate::error::{CoreError, CryptoError, ErrorCode};
    pub use crate::torrent::{EngineLimits, EngineState, TorrentEngine, TorrentState, TorrentStatus};
}
