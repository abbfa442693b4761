//! # LibreSeed Record Crate Lints
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
//! # LibreSeed Record Model
//!
//! Typed records for the six document kinds the protocol moves around (§4.2,
//! §6): Full Manifest, Minimal Manifest, Publisher Announce, Name Index (and
//! its Publisher Entries), and Seeder Status. Every record exposes
//! `validate()` (returning the first [`libreseed_types::error::ValidationError`]
//! it finds) and a canonical `signing_bytes()` via the [`Record`] trait, built
//! through `libreseed_crypto::canonical` so every producer and verifier in
//! the workspace encodes the same signing payload byte-for-byte.

use libreseed_crypto::error::CryptoError;
use libreseed_types::error::ValidationError;

/// Full Manifest — the record embedded at `manifest.json` inside a tarball
/// (§3, §6).
pub mod full_manifest;
/// Minimal Manifest — the small signed descriptor published to the DHT (§3, §6).
pub mod minimal_manifest;
/// Publisher Announce — a publisher's signed catalog of packages (§3, §6).
pub mod publisher_announce;
/// Name Index and its per-publisher entries (§3, §4.5, §6).
pub mod name_index;
/// Seeder Status — optional bandwidth/seeded-set record (§3).
pub mod seeder_status;
/// Shared field-level validation helpers.
pub mod validate;

pub use full_manifest::FullManifest;
pub use minimal_manifest::MinimalManifest;
pub use name_index::{NameIndex, PublisherEntry};
pub use publisher_announce::{PackageEntry, PublisherAnnounce, VersionEntry};
pub use seeder_status::{SeedEntry, SeederStatus};

/// The common contract every record type implements (§4.2).
pub trait Record {
    /// Checks structural well-formedness (presence, size, format), returning
    /// the first violation encountered.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Returns the canonical byte string this record's signature is computed
    /// over — the exact field subset named in §4.1, not the whole struct.
    fn signing_bytes(&self) -> Result<Vec<u8>, CryptoError>;
}
