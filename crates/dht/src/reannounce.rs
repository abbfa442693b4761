//! The re-announce scheduler (§4.4, §5): keeps published records alive
//! against typical 24-48h DHT expiration by re-PUTting them every 22 hours,
//! backing off to a 1-hour retry on failure.
//!
//! Single-threaded per process (§5): one tick loop drives every scheduled
//! key, and it never issues overlapping PUTs for the same key, since each
//! tick processes keys sequentially against the scheduler's own registry.

use libreseed_api::dht::{DhtClient, DhtKey};
use libreseed_types::{REANNOUNCE_INTERVAL_SECS, REANNOUNCE_RETRY_SECS};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

struct ScheduledRecord {
    value: Vec<u8>,
    next_due: Instant,
}

/// Tracks which DHT records this process owns and re-announces them on a
/// timer. Construct one per process; `schedule` after every successful
/// `announce`, and start the loop once with [`ReannounceScheduler::spawn`].
pub struct ReannounceScheduler {
    records: Mutex<HashMap<DhtKey, ScheduledRecord>>,
    tick: Duration,
}

impl ReannounceScheduler {
    /// Builds a scheduler with the default 1-hour tick.
    pub fn new() -> Arc<Self> {
        Self::with_tick(Duration::from_secs(60 * 60))
    }

    /// Builds a scheduler with a custom tick interval — tests use a short
    /// tick so the schedule can be exercised without waiting 22 hours.
    pub fn with_tick(tick: Duration) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(HashMap::new()),
            tick,
        })
    }

    /// Registers (or replaces) `key` for periodic re-announce, due again
    /// after the standard [`REANNOUNCE_INTERVAL_SECS`].
    pub async fn schedule(&self, key: DhtKey, value: Vec<u8>) {
        let mut records = self.records.lock().await;
        records.insert(
            key,
            ScheduledRecord {
                value,
                next_due: Instant::now() + Duration::from_secs(REANNOUNCE_INTERVAL_SECS),
            },
        );
    }

    /// Stops re-announcing `key`, e.g. on an explicit local un-publish.
    pub async fn unschedule(&self, key: &DhtKey) {
        self.records.lock().await.remove(key);
    }

    /// Returns the number of records currently tracked — test/health-signal
    /// introspection.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Spawns the background tick loop against `client`, re-PUTting every
    /// due record. Runs until the returned handle is aborted.
    pub fn spawn<C: DhtClient + 'static>(self: &Arc<Self>, client: Arc<C>) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(scheduler.tick);
            loop {
                interval.tick().await;
                scheduler.run_due(&client).await;
            }
        })
    }

    async fn run_due<C: DhtClient>(&self, client: &C) {
        let due_keys: Vec<DhtKey> = {
            let records = self.records.lock().await;
            let now = Instant::now();
            records
                .iter()
                .filter(|(_, r)| r.next_due <= now)
                .map(|(k, _)| *k)
                .collect()
        };

        for key in due_keys {
            let value = {
                let records = self.records.lock().await;
                records.get(&key).map(|r| r.value.clone())
            };
            let Some(value) = value else { continue };

            match client.announce(key, value).await {
                Ok(()) => {
                    let mut records = self.records.lock().await;
                    if let Some(record) = records.get_mut(&key) {
                        record.next_due =
                            Instant::now() + Duration::from_secs(REANNOUNCE_INTERVAL_SECS);
                    }
                }
                Err(e) => {
                    tracing::warn!(target: "dht::reannounce", key = %super::key::to_hex(&key), error = %e, "re-announce failed, entering retry backoff");
                    let mut records = self.records.lock().await;
                    if let Some(record) = records.get_mut(&key) {
                        record.next_due =
                            Instant::now() + Duration::from_secs(REANNOUNCE_RETRY_SECS);
                    }
                }
            }
        }
    }
}

impl Default for ReannounceScheduler {
    fn default() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            tick: Duration::from_secs(60 * 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryDht;

    #[tokio::test]
    async fn schedule_registers_a_record() {
        let scheduler = ReannounceScheduler::with_tick(Duration::from_millis(10));
        scheduler.schedule([1u8; 20], b"v".to_vec()).await;
        assert_eq!(scheduler.len().await, 1);
    }

    #[tokio::test]
    async fn unschedule_removes_a_record() {
        let scheduler = ReannounceScheduler::with_tick(Duration::from_millis(10));
        scheduler.schedule([1u8; 20], b"v".to_vec()).await;
        scheduler.unschedule(&[1u8; 20]).await;
        assert_eq!(scheduler.len().await, 0);
    }

    #[tokio::test]
    async fn due_record_is_reannounced_to_the_client() {
        let dht = InMemoryDht::new();
        let scheduler = ReannounceScheduler::with_tick(Duration::from_millis(10));
        let key = [7u8; 20];
        {
            let mut records = scheduler.records.lock().await;
            records.insert(
                key,
                ScheduledRecord {
                    value: b"payload".to_vec(),
                    next_due: Instant::now(),
                },
            );
        }
        scheduler.run_due(dht.as_ref()).await;
        assert_eq!(dht.peek(&key), Some(b"payload".to_vec()));
    }

    #[tokio::test]
    async fn failed_reannounce_backs_off_one_hour() {
        let dht = InMemoryDht::new();
        let key = [8u8; 20];
        dht.mark_unreachable(key);
        let scheduler = ReannounceScheduler::with_tick(Duration::from_millis(10));
        {
            let mut records = scheduler.records.lock().await;
            records.insert(
                key,
                ScheduledRecord {
                    value: b"payload".to_vec(),
                    next_due: Instant::now(),
                },
            );
        }
        scheduler.run_due(dht.as_ref()).await;
        let records = scheduler.records.lock().await;
        let record = records.get(&key).unwrap();
        assert!(record.next_due > Instant::now() + Duration::from_secs(REANNOUNCE_RETRY_SECS - 5));
    }
}
