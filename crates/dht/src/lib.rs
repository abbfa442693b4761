//! # LibreSeed DHT Crate Lints
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
//! # LibreSeed DHT Adapter
//!
//! Implements §4.4: key derivation over typed inputs, a generic
//! announce/fetch contract atop the [`libreseed_api::dht::DhtClient`] seam,
//! a re-announce scheduler, and two `DhtClient` implementations — a real
//! `libp2p` Kademlia swarm and an in-memory stub for tests.

/// `announce`/`fetch` atop any [`libreseed_api::dht::DhtClient`].
pub mod adapter;
/// DHT key derivation for each record type (§4.4).
pub mod key;
/// A `libp2p` Kademlia-backed [`libreseed_api::dht::DhtClient`].
pub mod libp2p_dht;
/// A `DashMap`-backed in-memory [`libreseed_api::dht::DhtClient`] for tests.
pub mod memory;
/// The re-announce scheduler (§4.4, §5).
pub mod reannounce;

pub use adapter::DhtAdapter;
pub use libp2p_dht::Libp2pDht;
pub use memory::InMemoryDht;
pub use reannounce::ReannounceScheduler;
