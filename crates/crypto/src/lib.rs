//! # LibreSeed Crypto Crate Lints
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
        clippy::indexing_slicing
    )
)]
//! # LibreSeed Crypto
//!
//! Concrete cryptographic primitives for the LibreSeed protocol engine:
//! Ed25519 signing, SHA-256 hashing, canonical JSON encoding for the signing
//! payloads of §4.1, and an at-rest passphrase-encrypted keystore for the
//! publisher's Identity Keypair.

/// SHA-256 hash function implementation over `dcrypt`.
pub mod algorithms;
/// Canonical JSON encoding for record signing payloads (§4.1).
pub mod canonical;
/// Local error alias.
pub mod error;
/// Passphrase-encrypted at-rest storage for the Identity Keypair.
pub mod key_store;
/// Ed25519 signing, verification, and batch verification.
pub mod sign;
