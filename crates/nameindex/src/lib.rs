//! # LibreSeed Name-Index Crate Lints
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
//! # LibreSeed Name-Index Aggregator
//!
//! Implements §4.5: the per-publisher update protocol over a shared
//! `name-index:<name>` DHT record, reader-side signature verification that
//! drops invalid entries without invalidating the whole record, and local
//! (never-republished) pruning of an over-grown index.

/// The update/fetch protocol atop [`libreseed_dht::DhtAdapter`].
pub mod aggregator;
/// Local-only pruning of an over-grown Name Index (§4.5).
pub mod prune;
/// Ed25519 verification glue for [`libreseed_record::name_index::PublisherEntry`].
pub mod verify;

pub use aggregator::NameIndexAggregator;
pub use prune::LocalPruner;
