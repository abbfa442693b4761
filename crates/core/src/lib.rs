//! # LibreSeed Core Crate Lints
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
//! # LibreSeed Core
//!
//! The single dependency an external collaborator — a CLI, a daemon, an HTTP
//! gateway — takes on the whole protocol engine. Re-exports every subsystem
//! crate's public surface under one namespace so that crate stays in lock
//! step with the workspace instead of hand-picking individual subsystem
//! dependencies.
//!
//! Subsystems, in the order data flows through them: a publisher signs and
//! publishes [`record`] documents to the [`dht`] and [`nameindex`]
//! aggregator; a client's [`resolver`] looks one up, verifying each record
//! against [`crypto`] and the [`content_hash`] engine, then drives the
//! [`torrent`] swarm adapter through the install pipeline. [`api`] is the
//! seam every subsystem programs against; [`types`] is the shared error and
//! constant vocabulary underneath all of them.

pub use libreseed_api as api;
pub use libreseed_content_hash as content_hash;
pub use libreseed_crypto as crypto;
pub use libreseed_dht as dht;
pub use libreseed_nameindex as nameindex;
pub use libreseed_record as record;
pub use libreseed_resolver as resolver;
pub use libreseed_torrent as torrent;
pub use libreseed_types as types;

/// The most commonly needed types and traits, re-exported flat for
/// `use libreseed_core::prelude::*;` callers.
pub mod prelude {
    pub use libreseed_api::prelude::*;
    pub use libreseed_content_hash::{compute_content_hash, compute_infohash, pack_tarball, unpack_tarball};
    pub use libreseed_dht::{DhtAdapter, InMemoryDht, Libp2pDht, ReannounceScheduler};
    pub use libreseed_nameindex::{LocalPruner, NameIndexAggregator};
    pub use libreseed_record::{
        FullManifest, MinimalManifest, NameIndex, PackageEntry, PublisherAnnounce, PublisherEntry,
        Record, SeedEntry, SeederStatus, VersionEntry,
    };
    pub use libreseed_resolver::{
        fetch_seeder_counts, install, resolve_by_name, resolve_by_publisher, Blacklist,
        BlacklistKey, Outcome, ResolutionResult, Resolver, RetryController, VerifiedPackage,
    };
    pub use libreseed_torrent::{
        parse_magnet_infohash, parse_torrent_file, validate_infohash, InMemoryTorrentEngine,
        LibrqbitTorrentEngine, Metainfo,
    };
    pub use libreseed_types::error::{CoreError, ErrorCode};
}
