//! The `DhtClient` contract (§4.4): a pluggable key/value store over a
//! Kademlia-style distributed hash table. This mirrors the
//! `BlockSync`/`MempoolGossip` split the kernel's networking crate uses to
//! decouple a protocol's contract from its transport — here there is a
//! single contract with two implementations, a real `libp2p` swarm and an
//! in-memory stub for tests.

use async_trait::async_trait;
use libreseed_types::error::TransportError;
use std::time::Duration;

/// A raw DHT key: the 20-byte SHA-256-truncated digest described in §4.4.
pub type DhtKey = [u8; 20];

/// A trait for a standalone, pluggable DHT adapter.
///
/// Implementations own their own connection/swarm lifecycle; `announce` and
/// `fetch` are the only operations the rest of the engine needs.
#[async_trait]
pub trait DhtClient: Send + Sync {
    /// Stores `value` at `key`, overwriting whatever is currently there.
    ///
    /// Implementations SHOULD treat this as "best effort eventually
    /// consistent" per §4.4: a successful return means the local node
    /// accepted the write and began propagating it, not that every replica
    /// in the network has converged.
    async fn announce(&self, key: DhtKey, value: Vec<u8>) -> Result<(), TransportError>;

    /// Fetches the value currently stored at `key`, if any, waiting up to
    /// `timeout` for a response.
    async fn fetch(&self, key: DhtKey, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError>;
}
