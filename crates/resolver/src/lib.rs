//! # LibreSeed Resolver Crate Lints
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
//! # LibreSeed Resolver
//!
//! Implements §4.6: `resolveByName`/`resolveByPublisher`, publisher
//! selection among several valid Name Index entries, the end-to-end install
//! pipeline's verification state machine, and the retry/blacklist controller
//! for transient failures.

/// A bounded, TTL-expiring blacklist of exhausted `(pubkey, name, version)`
/// targets.
pub mod blacklist;
/// The `DOWNLOAD_TARBALL` → `DONE` install pipeline.
pub mod install;
/// Exponential backoff and the transient/fatal retry split.
pub mod retry;
/// `resolveByName`/`resolveByPublisher` and the `Resolver` façade.
pub mod resolve;
/// Publisher selection among several valid Name Index entries.
pub mod select;
/// Fetches `SeederStatus` records and tallies per-publisher seeder
/// observability for the `seeder-count` selection policy.
pub mod seeders;

pub use blacklist::{Blacklist, BlacklistKey};
pub use install::{install, VerifiedPackage};
pub use resolve::{resolve_by_name, resolve_by_publisher, Resolver, ResolutionResult};
pub use retry::{Outcome, RetryController};
pub use seeders::fetch_seeder_counts;
