//! Publisher selection among several valid Name Index entries (§4.6 step 2).

use libreseed_api::collaborators::TrustStore;
use libreseed_record::PublisherEntry;
use libreseed_types::policy::PublisherPolicy;
use std::collections::HashMap;

fn first_seen_pick(entries: &[PublisherEntry]) -> Option<&PublisherEntry> {
    entries
        .iter()
        .min_by(|a, b| a.first_seen.cmp(&b.first_seen).then(a.pubkey.cmp(&b.pubkey)))
}

fn latest_version_pick(entries: &[PublisherEntry]) -> Option<&PublisherEntry> {
    entries.iter().max_by(|a, b| {
        let av = semver::Version::parse(&a.latest_version);
        let bv = semver::Version::parse(&b.latest_version);
        match (av, bv) {
            (Ok(av), Ok(bv)) => av
                .cmp(&bv)
                .then(b.first_seen.cmp(&a.first_seen))
                .then(b.pubkey.cmp(&a.pubkey)),
            // An entry with an unparseable version loses to one with a valid
            // version; between two unparseable ones, fall back to first-seen.
            (Ok(_), Err(_)) => std::cmp::Ordering::Greater,
            (Err(_), Ok(_)) => std::cmp::Ordering::Less,
            (Err(_), Err(_)) => b.first_seen.cmp(&a.first_seen).then(b.pubkey.cmp(&a.pubkey)),
        }
    })
}

fn user_trust_pick<'a>(
    entries: &'a [PublisherEntry],
    trust: &dyn TrustStore,
) -> Option<&'a PublisherEntry> {
    entries
        .iter()
        .find(|e| trust.is_trusted(&e.pubkey))
        .or_else(|| first_seen_pick(entries))
}

fn seeder_count_pick<'a>(
    entries: &'a [PublisherEntry],
    seeder_counts: &HashMap<String, u64>,
) -> Option<&'a PublisherEntry> {
    let best = entries
        .iter()
        .filter(|e| seeder_counts.contains_key(&e.pubkey))
        .max_by_key(|e| seeder_counts.get(&e.pubkey).copied().unwrap_or(0));
    best.or_else(|| first_seen_pick(entries))
}

/// Picks one publisher entry from `entries` per `policy` (§4.6 step 2).
///
/// `trust` is consulted only for [`PublisherPolicy::UserTrust`]; `seeder_counts`
/// (keyed by tagged pubkey) only for [`PublisherPolicy::SeederCount`]. Both
/// policies fall back to `first-seen` when their signal is absent.
pub fn select_publisher<'a>(
    entries: &'a [PublisherEntry],
    policy: PublisherPolicy,
    trust: Option<&dyn TrustStore>,
    seeder_counts: Option<&HashMap<String, u64>>,
) -> Option<&'a PublisherEntry> {
    match policy {
        PublisherPolicy::FirstSeen => first_seen_pick(entries),
        PublisherPolicy::LatestVersion => latest_version_pick(entries),
        PublisherPolicy::UserTrust => match trust {
            Some(trust) => user_trust_pick(entries, trust),
            None => first_seen_pick(entries),
        },
        PublisherPolicy::SeederCount => match seeder_counts {
            Some(counts) => seeder_count_pick(entries, counts),
            None => first_seen_pick(entries),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(pubkey: &str, first_seen: u64, version: &str) -> PublisherEntry {
        PublisherEntry {
            pubkey: pubkey.to_string(),
            latest_version: version.to_string(),
            first_seen,
            timestamp: first_seen,
            signature: "ed25519:AA==".to_string(),
        }
    }

    struct FixedTrust(Vec<String>);
    impl TrustStore for FixedTrust {
        fn is_trusted(&self, pubkey_hex: &str) -> bool {
            self.0.iter().any(|p| p == pubkey_hex)
        }
    }

    #[test]
    fn first_seen_picks_smallest_timestamp() {
        let entries = vec![entry("b", 200, "1.0.0"), entry("a", 100, "1.0.0")];
        let picked = select_publisher(&entries, PublisherPolicy::FirstSeen, None, None).unwrap();
        assert_eq!(picked.pubkey, "a");
    }

    #[test]
    fn first_seen_tie_breaks_on_pubkey() {
        let entries = vec![entry("z", 100, "1.0.0"), entry("a", 100, "1.0.0")];
        let picked = select_publisher(&entries, PublisherPolicy::FirstSeen, None, None).unwrap();
        assert_eq!(picked.pubkey, "a");
    }

    #[test]
    fn latest_version_picks_highest_semver() {
        let entries = vec![entry("a", 100, "1.0.0"), entry("b", 200, "2.3.0")];
        let picked = select_publisher(&entries, PublisherPolicy::LatestVersion, None, None).unwrap();
        assert_eq!(picked.pubkey, "b");
    }

    #[test]
    fn user_trust_picks_trusted_pubkey() {
        let entries = vec![entry("a", 100, "1.0.0"), entry("b", 200, "1.0.0")];
        let trust = FixedTrust(vec!["b".to_string()]);
        let picked =
            select_publisher(&entries, PublisherPolicy::UserTrust, Some(&trust), None).unwrap();
        assert_eq!(picked.pubkey, "b");
    }

    #[test]
    fn user_trust_falls_back_to_first_seen_when_untrusted() {
        let entries = vec![entry("a", 100, "1.0.0"), entry("b", 200, "1.0.0")];
        let trust = FixedTrust(vec!["nobody".to_string()]);
        let picked =
            select_publisher(&entries, PublisherPolicy::UserTrust, Some(&trust), None).unwrap();
        assert_eq!(picked.pubkey, "a");
    }

    #[test]
    fn seeder_count_picks_most_seeded() {
        let entries = vec![entry("a", 100, "1.0.0"), entry("b", 200, "1.0.0")];
        let counts = HashMap::from([("a".to_string(), 2u64), ("b".to_string(), 9u64)]);
        let picked =
            select_publisher(&entries, PublisherPolicy::SeederCount, None, Some(&counts)).unwrap();
        assert_eq!(picked.pubkey, "b");
    }

    #[test]
    fn seeder_count_falls_back_without_observations() {
        let entries = vec![entry("a", 100, "1.0.0"), entry("b", 200, "1.0.0")];
        let picked = select_publisher(&entries, PublisherPolicy::SeederCount, None, None).unwrap();
        assert_eq!(picked.pubkey, "a");
    }
}
