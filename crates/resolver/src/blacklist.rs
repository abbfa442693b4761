//! A locally-bounded blacklist of `(pubkey, name, version)` triples that have
//! exhausted their retry budget (§4.6, §9).
//!
//! Bounded both by LRU eviction and by a TTL checked on read, combining both
//! strategies the spec suggests rather than picking one.

use lru::LruCache;
use std::num::NonZeroUsize;
use tokio::sync::Mutex;

/// Default blacklist capacity: entries beyond this are evicted oldest-first.
pub const DEFAULT_CAPACITY: usize = 4096;
/// Default TTL: a blacklisted version becomes eligible for retry again after
/// 24 hours, in case the failure was caused by a transient network partition
/// that outlasted the 10-attempt budget.
pub const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;

/// Identifies one resolution target for blacklist purposes.
pub type BlacklistKey = (String, String, String);

struct Entry {
    blacklisted_at_unix: u64,
}

/// A bounded, TTL-expiring blacklist.
pub struct Blacklist {
    entries: Mutex<LruCache<BlacklistKey, Entry>>,
    ttl_secs: u64,
}

impl Blacklist {
    /// Builds a blacklist with the spec-recommended defaults.
    pub fn new() -> Self {
        Self::with_capacity_and_ttl(DEFAULT_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Builds a blacklist with caller-chosen bounds.
    pub fn with_capacity_and_ttl(capacity: usize, ttl_secs: u64) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl_secs,
        }
    }

    /// Marks `key` as blacklisted as of `now_unix`.
    pub async fn blacklist(&self, key: BlacklistKey, now_unix: u64) {
        self.entries.lock().await.put(
            key,
            Entry {
                blacklisted_at_unix: now_unix,
            },
        );
    }

    /// Returns `true` if `key` is currently blacklisted (present and not
    /// past its TTL). An expired entry is evicted and reported as absent.
    pub async fn is_blacklisted(&self, key: &BlacklistKey, now_unix: u64) -> bool {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get(key) else {
            return false;
        };
        if now_unix.saturating_sub(entry.blacklisted_at_unix) > self.ttl_secs {
            entries.pop(key);
            return false;
        }
        true
    }

    /// Removes `key` from the blacklist unconditionally, for callers that
    /// learn a previously-blacklisted version is now known-good.
    pub async fn clear(&self, key: &BlacklistKey) {
        self.entries.lock().await.pop(key);
    }
}

impl Default for Blacklist {
    fn default() -> Self {
        Self::new()
    }
}
