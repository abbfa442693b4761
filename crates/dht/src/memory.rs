//! An in-memory [`DhtClient`] backed by a [`DashMap`], used by
//! `libreseed-nameindex`/`libreseed-resolver` tests and by any caller not yet
//! wired to a live swarm.

use async_trait::async_trait;
use dashmap::DashMap;
use libreseed_api::dht::{DhtClient, DhtKey};
use libreseed_types::error::TransportError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// A `DashMap`-backed [`DhtClient`] that never touches the network.
///
/// PUTs from this process are serialized through an internal lock per §5
/// ("the adapter MUST serialize the adapter's own PUTs originating from the
/// same process") even though the underlying map is already internally
/// synchronized — the lock models the ordering guarantee, not just raw
/// thread-safety.
#[derive(Default)]
pub struct InMemoryDht {
    records: DashMap<DhtKey, Vec<u8>>,
    put_lock: Mutex<()>,
    /// Set of keys configured to simulate `NotFound` or transport failure,
    /// for retry-controller tests.
    unreachable: DashMap<DhtKey, ()>,
}

impl InMemoryDht {
    /// Creates a new, empty in-memory DHT.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Marks `key` as unreachable: subsequent `fetch`/`announce` calls
    /// against it fail with a transient transport error, simulating a flaky
    /// network for retry-controller tests.
    pub fn mark_unreachable(&self, key: DhtKey) {
        self.unreachable.insert(key, ());
    }

    /// Clears a previously-marked unreachable key.
    pub fn mark_reachable(&self, key: DhtKey) {
        self.unreachable.remove(&key);
    }

    /// Returns the raw bytes currently stored at `key`, bypassing the
    /// `DhtClient` contract — test-only introspection.
    pub fn peek(&self, key: &DhtKey) -> Option<Vec<u8>> {
        self.records.get(key).map(|v| v.clone())
    }
}

#[async_trait]
impl DhtClient for InMemoryDht {
    async fn announce(&self, key: DhtKey, value: Vec<u8>) -> Result<(), TransportError> {
        if self.unreachable.contains_key(&key) {
            return Err(TransportError::DhtStoreFailed(
                "simulated unreachable key".into(),
            ));
        }
        let _guard = self.put_lock.lock().await;
        self.records.insert(key, value);
        Ok(())
    }

    async fn fetch(
        &self,
        key: DhtKey,
        _timeout: Duration,
    ) -> Result<Option<Vec<u8>>, TransportError> {
        if self.unreachable.contains_key(&key) {
            return Err(TransportError::DhtTimeout(_timeout));
        }
        Ok(self.records.get(&key).map(|v| v.clone()))
    }
}
