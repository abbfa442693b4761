//! # LibreSeed Content-Hash Crate Lints
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
//! # LibreSeed Content-Hash Engine
//!
//! Implements §4.3 of the protocol: the Merkle-style `contentHash` computed
//! over a file set, and the tarball `infohash` that binds a Full Manifest's
//! signature to the exact bytes of the `.tgz` later distributed over
//! BitTorrent. Also provides tarball pack/unpack helpers so the resolver's
//! `VERIFY_FILES` step (§4.6) has something to extract against.

/// `compute_content_hash` and the tarball `infohash` (§4.3).
pub mod content_hash;
/// `.tgz` construction and extraction honoring §6's layout rules.
pub mod tarball;

pub use content_hash::{compute_content_hash, compute_infohash};
pub use tarball::{pack_tarball, unpack_tarball, TarballEntry};
