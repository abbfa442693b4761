//! Local-only pruning of an over-grown Name Index (§4.5).
//!
//! Pruning exists so a client's own view of a crowded name doesn't grow
//! without bound; it never touches the DHT. Clients MUST NOT write a pruned
//! Name Index back — doing so would let any single reader erase other
//! publishers' entries for everyone.

use libreseed_record::name_index::PublisherEntry;
use libreseed_types::NAME_INDEX_SOFT_PRUNE_BOUND;

/// Prunes a verified publisher list down to a local working set.
///
/// `is_healthy` flags entries worth keeping regardless of count (reachable,
/// currently seeded, etc). Once unhealthy entries are dropped, if the
/// remainder still exceeds the soft bound, the oldest `firstSeen` entries are
/// kept first — an older `firstSeen` is harder to fake than an invented one,
/// so it doubles as a weak anti-squatting signal.
pub struct LocalPruner {
    soft_bound: usize,
}

impl Default for LocalPruner {
    fn default() -> Self {
        Self {
            soft_bound: NAME_INDEX_SOFT_PRUNE_BOUND,
        }
    }
}

impl LocalPruner {
    /// Builds a pruner using the spec's default soft bound (300).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a pruner with a caller-supplied soft bound, for callers that
    /// want a tighter local working set than the spec's default.
    pub fn with_soft_bound(soft_bound: usize) -> Self {
        Self { soft_bound }
    }

    /// Prunes `entries` for local use only. The result is never republished.
    pub fn prune(
        &self,
        mut entries: Vec<PublisherEntry>,
        is_healthy: impl Fn(&PublisherEntry) -> bool,
    ) -> Vec<PublisherEntry> {
        entries.retain(|e| is_healthy(e));
        if entries.len() <= self.soft_bound {
            return entries;
        }
        entries.sort_by_key(|e| e.first_seen);
        entries.truncate(self.soft_bound);
        entries
    }
}
