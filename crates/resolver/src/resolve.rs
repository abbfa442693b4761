//! Name and publisher resolution (§4.6 `resolveByName`/`resolveByPublisher`).

use crate::select::select_publisher;
use libreseed_api::collaborators::TrustStore;
use libreseed_api::dht::DhtClient;
use libreseed_crypto::canonical;
use libreseed_dht::{key, DhtAdapter};
use libreseed_nameindex::verify::verify_ed25519;
use libreseed_nameindex::NameIndexAggregator;
use libreseed_record::{MinimalManifest, PublisherAnnounce, Record};
use libreseed_types::error::{CoreError, CryptoError, DiscoveryError, ValidationError};
use libreseed_types::policy::PublisherPolicy;
use std::collections::HashMap;
use std::sync::Arc;

/// The outcome of a successful resolution (§4.6): enough to drive the
/// install pipeline without re-touching the DHT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    /// `"sha256:<hex>"` tarball infohash.
    pub infohash: String,
    /// `"ed25519:<base64>"` publisher pubkey that signed this manifest.
    pub pubkey: String,
    /// Resolved package name.
    pub name: String,
    /// Resolved version.
    pub version: String,
}

fn verify_signed_payload(
    payload: &[u8],
    pubkey_tag: &str,
    signature_tag: &str,
) -> Result<(), CryptoError> {
    let pubkey = canonical::untag_ed25519(pubkey_tag)?;
    let signature = canonical::untag_ed25519(signature_tag)?;
    if verify_ed25519(&pubkey, payload, &signature) {
        Ok(())
    } else {
        Err(CryptoError::VerifyFailed)
    }
}

/// `resolveByPublisher` (§4.6): fetches the Publisher Announce for `pubkey`,
/// locates `name`, selects a version under `version_range` (or the
/// publisher's own `latestVersion` if unspecified), and fetches + verifies
/// the corresponding Minimal Manifest.
pub async fn resolve_by_publisher<C: DhtClient + 'static>(
    adapter: &DhtAdapter<C>,
    pubkey: &[u8],
    name: &str,
    version_range: Option<&str>,
) -> Result<ResolutionResult, CoreError> {
    let announce_key = key::announce_key(pubkey)?;
    let bytes = adapter
        .fetch_raw(announce_key)
        .await
        .map_err(CoreError::Transport)?
        .ok_or_else(|| DiscoveryError::AnnounceNotFound(canonical::tag_ed25519(pubkey)))?;
    let announce: PublisherAnnounce = serde_json::from_slice(&bytes)
        .map_err(|e| ValidationError::SchemaInvalid(format!("announce decode: {e}")))?;
    announce.validate()?;
    verify_signed_payload(&announce.signing_bytes()?, &announce.pubkey, &announce.signature)?;

    let pkg = announce.find_package(name).ok_or_else(|| {
        DiscoveryError::PackageNotFound {
            name: name.to_string(),
            pubkey: announce.pubkey.clone(),
        }
    })?;

    let version = match version_range {
        None => pkg.latest_version.clone(),
        Some(range) => {
            let req = semver::VersionReq::parse(range).map_err(|e| {
                ValidationError::FieldFormat {
                    field: "versionRange",
                    reason: e.to_string(),
                }
            })?;
            pkg.versions
                .iter()
                .filter_map(|v| semver::Version::parse(&v.version).ok().map(|parsed| (parsed, &v.version)))
                .filter(|(parsed, _)| req.matches(parsed))
                .max_by(|(a, _), (b, _)| a.cmp(b))
                .map(|(_, original)| original.clone())
                .ok_or_else(|| DiscoveryError::NoVersionSatisfies {
                    name: name.to_string(),
                    range: range.to_string(),
                })?
        }
    };

    let manifest_key = key::manifest_key(name, &version)?;
    let mbytes = adapter
        .fetch_raw(manifest_key)
        .await
        .map_err(CoreError::Transport)?
        .ok_or_else(|| DiscoveryError::ManifestNotFound {
            name: name.to_string(),
            version: version.clone(),
        })?;
    let manifest: MinimalManifest = serde_json::from_slice(&mbytes)
        .map_err(|e| ValidationError::SchemaInvalid(format!("manifest decode: {e}")))?;
    manifest.validate()?;
    verify_signed_payload(&manifest.signing_bytes()?, &manifest.pubkey, &manifest.signature)?;

    if manifest.pubkey != announce.pubkey {
        return Err(CryptoError::PubkeyMismatch {
            expected: announce.pubkey,
            got: manifest.pubkey,
        }
        .into());
    }

    Ok(ResolutionResult {
        infohash: manifest.infohash,
        pubkey: manifest.pubkey,
        name: name.to_string(),
        version,
    })
}

/// `resolveByName` (§4.6): fetches and verifies the Name Index for `name`,
/// selects one publisher entry per `policy`, and delegates to
/// [`resolve_by_publisher`].
#[allow(clippy::too_many_arguments)]
pub async fn resolve_by_name<C: DhtClient + 'static>(
    adapter: &DhtAdapter<C>,
    aggregator: &NameIndexAggregator<C>,
    name: &str,
    version_range: Option<&str>,
    policy: PublisherPolicy,
    trust: Option<&dyn TrustStore>,
    seeder_counts: Option<&HashMap<String, u64>>,
) -> Result<ResolutionResult, CoreError> {
    let entries = aggregator.fetch_verified(name).await?;
    let selected = select_publisher(&entries, policy, trust, seeder_counts)
        .ok_or_else(|| DiscoveryError::NoValidPublishers(name.to_string()))?;
    let pubkey = canonical::untag_ed25519(&selected.pubkey)?;
    resolve_by_publisher(adapter, &pubkey, name, version_range).await
}

/// Convenience wrapper bundling a [`DhtAdapter`] and its
/// [`NameIndexAggregator`] under one `Arc`, for callers (the core facade)
/// that want a single resolver handle rather than threading both through.
pub struct Resolver<C: DhtClient + 'static> {
    adapter: Arc<DhtAdapter<C>>,
    aggregator: NameIndexAggregator<C>,
}

impl<C: DhtClient + 'static> Resolver<C> {
    /// Builds a resolver atop a shared adapter.
    pub fn new(adapter: Arc<DhtAdapter<C>>) -> Self {
        let aggregator = NameIndexAggregator::new(Arc::clone(&adapter));
        Self { adapter, aggregator }
    }

    /// See [`resolve_by_name`].
    pub async fn resolve_by_name(
        &self,
        name: &str,
        version_range: Option<&str>,
        policy: PublisherPolicy,
        trust: Option<&dyn TrustStore>,
        seeder_counts: Option<&HashMap<String, u64>>,
    ) -> Result<ResolutionResult, CoreError> {
        resolve_by_name(
            &self.adapter,
            &self.aggregator,
            name,
            version_range,
            policy,
            trust,
            seeder_counts,
        )
        .await
    }

    /// See [`resolve_by_publisher`].
    pub async fn resolve_by_publisher(
        &self,
        pubkey: &[u8],
        name: &str,
        version_range: Option<&str>,
    ) -> Result<ResolutionResult, CoreError> {
        resolve_by_publisher(&self.adapter, pubkey, name, version_range).await
    }

    /// Runs [`PublisherPolicy::SeederCount`] end to end: fetches and
    /// verifies `name`'s Name Index entries, queries `seeder_ids` for
    /// [`SeederStatus`](libreseed_record::SeederStatus) observability via
    /// [`crate::seeders::fetch_seeder_counts`], then resolves using the
    /// resulting counts. `seeder_ids` is the caller's own candidate list —
    /// the core has no seeder-discovery mechanism of its own (§4.4's DHT
    /// contract doesn't support enumeration), so whatever collaborator
    /// tracks known seeders supplies it here.
    pub async fn resolve_by_name_with_seeder_counts(
        &self,
        name: &str,
        version_range: Option<&str>,
        seeder_ids: &[String],
    ) -> Result<ResolutionResult, CoreError> {
        let entries = self.aggregator.fetch_verified(name).await?;
        let counts =
            crate::seeders::fetch_seeder_counts(&self.adapter, &entries, name, seeder_ids).await;
        let selected = select_publisher(&entries, PublisherPolicy::SeederCount, None, Some(&counts))
            .ok_or_else(|| DiscoveryError::NoValidPublishers(name.to_string()))?;
        let pubkey = canonical::untag_ed25519(&selected.pubkey)?;
        resolve_by_publisher(&self.adapter, &pubkey, name, version_range).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libreseed_api::crypto::{SerializableKey, SigningKeyPair};
    use libreseed_crypto::sign::eddsa::Ed25519KeyPair;
    use libreseed_dht::InMemoryDht;
    use libreseed_record::{PackageEntry, VersionEntry};

    fn setup() -> (Arc<DhtAdapter<InMemoryDht>>, Ed25519KeyPair) {
        let dht = InMemoryDht::new();
        (Arc::new(DhtAdapter::new(dht)), Ed25519KeyPair::generate().unwrap())
    }

    async fn publish_announce_and_manifest(
        adapter: &DhtAdapter<InMemoryDht>,
        kp: &Ed25519KeyPair,
        name: &str,
        versions: &[&str],
    ) {
        let pubkey_tag = canonical::tag_ed25519(&kp.public_key().to_bytes());
        let version_entries: Vec<VersionEntry> = versions
            .iter()
            .map(|v| VersionEntry {
                version: v.to_string(),
                manifest_key: key::to_hex(&key::manifest_key(name, v).unwrap()),
                timestamp: 1000,
            })
            .collect();
        let mut announce = PublisherAnnounce {
            protocol: "libreseed/1".into(),
            announce_version: 1,
            pubkey: pubkey_tag.clone(),
            timestamp: 1000,
            packages: vec![PackageEntry {
                name: name.to_string(),
                latest_version: versions.last().unwrap().to_string(),
                versions: version_entries,
            }],
            signature: String::new(),
        };
        let payload = announce.signing_bytes().unwrap();
        announce.signature = canonical::tag_ed25519(&kp.sign(&payload).unwrap().to_bytes());
        let bytes = serde_json::to_vec(&announce).unwrap();
        adapter
            .announce_raw(key::announce_key(&kp.public_key().to_bytes()).unwrap(), bytes)
            .await
            .unwrap();

        for version in versions {
            let mut manifest = MinimalManifest {
                protocol: "libreseed/1".into(),
                version: version.to_string(),
                name: name.to_string(),
                infohash: canonical::tag_sha256(&[7u8; 32]),
                pubkey: pubkey_tag.clone(),
                signature: String::new(),
                timestamp: 1000,
            };
            let payload = manifest.signing_bytes().unwrap();
            manifest.signature = canonical::tag_ed25519(&kp.sign(&payload).unwrap().to_bytes());
            let bytes = serde_json::to_vec(&manifest).unwrap();
            adapter
                .announce_raw(key::manifest_key(name, version).unwrap(), bytes)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn resolve_by_publisher_returns_latest_by_default() {
        let (adapter, kp) = setup();
        publish_announce_and_manifest(&adapter, &kp, "hello", &["1.0.0", "1.2.0"]).await;
        let result = resolve_by_publisher(&adapter, &kp.public_key().to_bytes(), "hello", None)
            .await
            .unwrap();
        assert_eq!(result.version, "1.2.0");
    }

    #[tokio::test]
    async fn resolve_by_publisher_honors_version_range() {
        let (adapter, kp) = setup();
        publish_announce_and_manifest(&adapter, &kp, "hello", &["1.0.0", "2.0.0", "2.5.0"]).await;
        let result = resolve_by_publisher(&adapter, &kp.public_key().to_bytes(), "hello", Some(">=2.0.0, <2.5.0"))
            .await
            .unwrap();
        assert_eq!(result.version, "2.0.0");
    }

    #[tokio::test]
    async fn resolve_by_publisher_fails_when_no_version_satisfies() {
        let (adapter, kp) = setup();
        publish_announce_and_manifest(&adapter, &kp, "hello", &["1.0.0"]).await;
        let err = resolve_by_publisher(&adapter, &kp.public_key().to_bytes(), "hello", Some(">=9.0.0"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Discovery(DiscoveryError::NoVersionSatisfies { .. })
        ));
    }

    #[tokio::test]
    async fn semver_resolution_worked_example() {
        // §8 scenario 6, literally: an announce listing {1.0.0, 1.1.0,
        // 1.2.3, 2.0.0-rc.1}. `^1.0.0` takes the highest non-prerelease
        // match; `~1.1.0` stays within the 1.1.x line; `>=2.0.0` excludes
        // the 2.0.0 prerelease because a bare `>=2.0.0` requirement carries
        // no prerelease component of its own (the `semver` crate's own
        // exclusion rule, adopted rather than invented) — so it resolves to
        // `NoVersionSatisfies` rather than silently accepting a prerelease
        // nobody asked for.
        let (adapter, kp) = setup();
        publish_announce_and_manifest(
            &adapter,
            &kp,
            "libx",
            &["1.0.0", "1.1.0", "1.2.3", "2.0.0-rc.1"],
        )
        .await;

        let caret = resolve_by_publisher(&adapter, &kp.public_key().to_bytes(), "libx", Some("^1.0.0"))
            .await
            .unwrap();
        assert_eq!(caret.version, "1.2.3");

        let tilde = resolve_by_publisher(&adapter, &kp.public_key().to_bytes(), "libx", Some("~1.1.0"))
            .await
            .unwrap();
        assert_eq!(tilde.version, "1.1.0");

        let err = resolve_by_publisher(&adapter, &kp.public_key().to_bytes(), "libx", Some(">=2.0.0"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Discovery(DiscoveryError::NoVersionSatisfies { .. })
        ));
    }

    #[tokio::test]
    async fn resolve_by_publisher_missing_announce_fails() {
        let (adapter, kp) = setup();
        let err = resolve_by_publisher(&adapter, &kp.public_key().to_bytes(), "hello", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Discovery(DiscoveryError::AnnounceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn resolve_by_name_end_to_end() {
        let (adapter, kp) = setup();
        publish_announce_and_manifest(&adapter, &kp, "hello", &["1.0.0"]).await;

        let aggregator = NameIndexAggregator::new(Arc::clone(&adapter));
        let pubkey = kp.public_key().to_bytes();
        aggregator
            .publish("hello", &pubkey, "1.0.0", 500, |msg| {
                Ok(kp.sign(msg).unwrap().to_bytes())
            })
            .await
            .unwrap();

        let result = resolve_by_name(
            &adapter,
            &aggregator,
            "hello",
            None,
            PublisherPolicy::FirstSeen,
            None,
            None,
        )
        .await
        .unwrap();
        assert_eq!(result.version, "1.0.0");
        assert_eq!(result.pubkey, canonical::tag_ed25519(&pubkey));
    }

    /// Publishes a distinct-infohash release of `name@1.0.0` under `kp`, for
    /// tests that need two publishers of the same name to resolve to
    /// different infohashes (`publish_announce_and_manifest` fixes every
    /// publisher to the same test infohash, which can't distinguish them).
    async fn publish_with_infohash(
        adapter: &DhtAdapter<InMemoryDht>,
        kp: &Ed25519KeyPair,
        name: &str,
        infohash: &str,
    ) {
        let pubkey_tag = canonical::tag_ed25519(&kp.public_key().to_bytes());
        let mut announce = PublisherAnnounce {
            protocol: "libreseed/1".into(),
            announce_version: 1,
            pubkey: pubkey_tag.clone(),
            timestamp: 1000,
            packages: vec![PackageEntry {
                name: name.to_string(),
                latest_version: "1.0.0".to_string(),
                versions: vec![VersionEntry {
                    version: "1.0.0".to_string(),
                    manifest_key: key::to_hex(&key::manifest_key(name, "1.0.0").unwrap()),
                    timestamp: 1000,
                }],
            }],
            signature: String::new(),
        };
        let payload = announce.signing_bytes().unwrap();
        announce.signature = canonical::tag_ed25519(&kp.sign(&payload).unwrap().to_bytes());
        let bytes = serde_json::to_vec(&announce).unwrap();
        adapter
            .announce_raw(key::announce_key(&kp.public_key().to_bytes()).unwrap(), bytes)
            .await
            .unwrap();

        let mut manifest = MinimalManifest {
            protocol: "libreseed/1".into(),
            version: "1.0.0".into(),
            name: name.to_string(),
            infohash: infohash.to_string(),
            pubkey: pubkey_tag,
            signature: String::new(),
            timestamp: 1000,
        };
        let payload = manifest.signing_bytes().unwrap();
        manifest.signature = canonical::tag_ed25519(&kp.sign(&payload).unwrap().to_bytes());
        let bytes = serde_json::to_vec(&manifest).unwrap();
        adapter
            .announce_raw(key::manifest_key(name, "1.0.0").unwrap(), bytes)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn resolve_by_name_with_seeder_counts_prefers_most_seeded_publisher() {
        use libreseed_record::{SeedEntry, SeederStatus};

        let dht = InMemoryDht::new();
        let adapter = Arc::new(DhtAdapter::new(dht));
        let kp_a = Ed25519KeyPair::generate().unwrap();
        let kp_b = Ed25519KeyPair::generate().unwrap();
        let infohash_a = canonical::tag_sha256(&[1u8; 32]);
        let infohash_b = canonical::tag_sha256(&[2u8; 32]);

        publish_with_infohash(&adapter, &kp_a, "hello", &infohash_a).await;
        publish_with_infohash(&adapter, &kp_b, "hello", &infohash_b).await;

        let aggregator = NameIndexAggregator::new(Arc::clone(&adapter));
        // `kp_a` is first-seen, so a plain `first-seen` resolution would
        // pick it; seeder counts below favor `kp_b` instead.
        aggregator
            .publish("hello", &kp_a.public_key().to_bytes(), "1.0.0", 100, |m| {
                Ok(kp_a.sign(m).unwrap().to_bytes())
            })
            .await
            .unwrap();
        aggregator
            .publish("hello", &kp_b.public_key().to_bytes(), "1.0.0", 200, |m| {
                Ok(kp_b.sign(m).unwrap().to_bytes())
            })
            .await
            .unwrap();

        for (id, infohash) in [
            ("seeder-a1", &infohash_a),
            ("seeder-b1", &infohash_b),
            ("seeder-b2", &infohash_b),
        ] {
            let status = SeederStatus {
                protocol: "libreseed/1".into(),
                seeder_id: id.to_string(),
                upload_bandwidth_bps: None,
                seeding: vec![SeedEntry {
                    name: "hello".to_string(),
                    version: "1.0.0".to_string(),
                    infohash: infohash.clone(),
                }],
                timestamp: 1_000,
                signature: canonical::tag_ed25519(&[0u8; 64]),
            };
            let bytes = serde_json::to_vec(&status).unwrap();
            adapter
                .announce_raw(key::seeder_key(id).unwrap(), bytes)
                .await
                .unwrap();
        }

        let resolver = Resolver::new(Arc::clone(&adapter));
        let result = resolver
            .resolve_by_name_with_seeder_counts(
                "hello",
                None,
                &[
                    "seeder-a1".to_string(),
                    "seeder-b1".to_string(),
                    "seeder-b2".to_string(),
                ],
            )
            .await
            .unwrap();
        assert_eq!(result.pubkey, canonical::tag_ed25519(&kp_b.public_key().to_bytes()));
        assert_eq!(result.infohash, infohash_b);

        let err = resolver
            .resolve_by_name_with_seeder_counts("nonexistent", None, &[])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Discovery(DiscoveryError::NoValidPublishers(_))
        ));
    }
}
