//! Seeder observability for the `seeder-count` publisher selection policy
//! (§4.6 step 2: "query the Seeder records (when available) and prefer the
//! entry with the highest seeder observability").
//!
//! Nothing else in the workspace ever fetches a [`SeederStatus`] record, so
//! without this module `seeder_counts` could only ever be an empty map a
//! caller had no way to populate and the policy could only ever fall back
//! to `first-seen`. [`fetch_seeder_counts`] closes that gap: given a set of
//! candidate `seederID`s to query (seeder discovery itself — how a caller
//! learns which seeder IDs exist — is outside the core's contract, same as
//! any other discovery the DHT doesn't enumerate), it fetches each one's
//! [`SeederStatus`] and tallies, per publisher entry, how many seeders are
//! currently seeding that publisher's resolved package for `name`.

use crate::resolve::resolve_by_publisher;
use libreseed_api::dht::DhtClient;
use libreseed_crypto::canonical;
use libreseed_dht::{key, DhtAdapter};
use libreseed_record::{PublisherEntry, Record, SeederStatus};
use std::collections::HashMap;

/// Fetches the `SeederStatus` record for each of `seeder_ids` and tallies,
/// per publisher pubkey in `entries`, how many list a `seeding` entry whose
/// `(name, infohash)` matches that publisher's currently resolved package.
///
/// A seeder entry is matched by infohash rather than by pubkey because
/// `SeedEntry` (§3, §6) never carries the publisher's pubkey — only the
/// tarball's `infohash` is link enough back to a specific `(name, version)`
/// release. Each candidate publisher is therefore resolved first (to learn
/// the infohash it currently serves for `name`) before the seeder records
/// are consulted.
///
/// Seeders whose record doesn't decode, fails structural validation, or
/// isn't present at its derived key are silently skipped: seeder
/// observability is a best-effort selection signal only, never a security
/// decision (§9) — the publisher this ultimately helps select still goes
/// through the full Announce/Minimal-Manifest signature chain in
/// [`resolve_by_publisher`](crate::resolve::resolve_by_publisher).
pub async fn fetch_seeder_counts<C: DhtClient + 'static>(
    adapter: &DhtAdapter<C>,
    entries: &[PublisherEntry],
    name: &str,
    seeder_ids: &[String],
) -> HashMap<String, u64> {
    let mut infohash_to_pubkey = HashMap::new();
    for entry in entries {
        let Ok(pubkey) = canonical::untag_ed25519(&entry.pubkey) else {
            continue;
        };
        if let Ok(resolution) = resolve_by_publisher(adapter, &pubkey, name, None).await {
            infohash_to_pubkey.insert(resolution.infohash, entry.pubkey.clone());
        }
    }

    let mut counts: HashMap<String, u64> = HashMap::new();
    for seeder_id in seeder_ids {
        let Ok(dht_key) = key::seeder_key(seeder_id) else {
            continue;
        };
        let Ok(Some(bytes)) = adapter.fetch_raw(dht_key).await else {
            continue;
        };
        let Ok(status) = serde_json::from_slice::<SeederStatus>(&bytes) else {
            continue;
        };
        if status.validate().is_err() {
            continue;
        }
        for seeding in &status.seeding {
            if seeding.name != name {
                continue;
            }
            if let Some(pubkey) = infohash_to_pubkey.get(&seeding.infohash) {
                *counts.entry(pubkey.clone()).or_insert(0) += 1;
            }
        }
    }
    counts
}
