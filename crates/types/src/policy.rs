//! Publisher selection policies used by `resolve_by_name` (§4.6) when a Name
//! Index lists more than one valid publisher entry for the requested name.

use serde::{Deserialize, Serialize};

/// How the resolver picks a publisher among several valid Name Index entries
/// for the same package name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublisherPolicy {
    /// Prefer the entry with the oldest `firstSeen` timestamp (the sticky
    /// default; §4.5 calls this the anti-squatting signal).
    FirstSeen,
    /// Prefer whichever publisher currently announces the highest semver
    /// version for this name.
    LatestVersion,
    /// Prefer a publisher pubkey explicitly pinned by the caller via a
    /// `TrustStore`, falling back to `FirstSeen` if none of the entries match.
    UserTrust,
    /// Prefer the publisher whose current manifest has the most active
    /// seeders, per the most recent Seeder Status observed.
    SeederCount,
}

impl Default for PublisherPolicy {
    fn default() -> Self {
        Self::FirstSeen
    }
}
