//! # LibreSeed Torrent Crate Lints
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
//! # LibreSeed Torrent
//!
//! Implements §4.7: a BitTorrent swarm adapter satisfying the
//! `libreseed-api` `TorrentEngine` contract, in both a real `librqbit`-backed
//! form and a fully simulated in-memory form for tests.

/// A `librqbit`-backed [`torrent::TorrentEngine`] implementation.
pub mod librqbit_engine;
/// Magnet URI parsing ("add by magnet link").
pub mod magnet;
/// A `DashMap`-backed, fully simulated `TorrentEngine` implementation.
pub mod memory_engine;
/// `.torrent` metainfo (bencode) parsing ("add by metainfo").
pub mod metainfo;

pub use librqbit_engine::LibrqbitTorrentEngine;
pub use magnet::parse_magnet_infohash;
pub use memory_engine::InMemoryTorrentEngine;
pub use metainfo::{parse_torrent_file, validate_infohash, FileEntry, Info, Metainfo};
