//! End-to-end scenarios from the protocol's concrete worked examples: a
//! happy-path install resolved by name, and the two tamper scenarios that
//! must abort the install pipeline rather than silently accept bad bytes.

use async_trait::async_trait;
use libreseed_content_hash::TarballEntry;
use libreseed_core::prelude::*;
use libreseed_record::{PackageEntry, VersionEntry};
use libreseed_types::error::{CoreError, CryptoError};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;

/// Records the bytes handed to `install` so tests can assert the pipeline
/// ran to completion, without needing a real on-disk content-addressed
/// layout (that layout is an external collaborator's concern, not the
/// core's).
struct RecordingStorage {
    installed: AsyncMutex<Option<Vec<u8>>>,
}

impl RecordingStorage {
    fn new() -> Self {
        Self {
            installed: AsyncMutex::new(None),
        }
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn read(&self, _key: &str) -> Result<Option<Vec<u8>>, libreseed_types::error::ValidationError> {
        Ok(None)
    }

    async fn write(&self, _key: &str, _value: &[u8]) -> Result<(), libreseed_types::error::ValidationError> {
        Ok(())
    }

    async fn remove(&self, _key: &str) -> Result<(), libreseed_types::error::ValidationError> {
        Ok(())
    }

    async fn install(
        &self,
        tarball: &[u8],
        _dest: &Path,
    ) -> Result<(), libreseed_types::error::ValidationError> {
        *self.installed.lock().await = Some(tarball.to_vec());
        Ok(())
    }
}

fn hash_of(bytes: &[u8]) -> String {
    let digest = libreseed_crypto::algorithms::hash::sha256(bytes).unwrap();
    libreseed_crypto::canonical::tag_sha256(&digest)
}

/// Builds a one-file package: a signed `FullManifest`/tarball/`MinimalManifest`
/// triple for `(name, version)` under `kp`, using `a_txt_contents` for the
/// single file `a.txt`.
fn build_package(
    kp: &libreseed_crypto::sign::eddsa::Ed25519KeyPair,
    name: &str,
    version: &str,
    a_txt_contents: &[u8],
    declared_a_txt_hash: &str,
    now_ms: u64,
) -> (Vec<u8>, MinimalManifest) {
    use libreseed_api::crypto::{SerializableKey, SigningKeyPair};

    let pubkey_tag = libreseed_crypto::canonical::tag_ed25519(&kp.public_key().to_bytes());

    let mut files = BTreeMap::new();
    files.insert("a.txt".to_string(), declared_a_txt_hash.to_string());
    let content_hash = compute_content_hash(&files).unwrap();

    let mut full = FullManifest {
        protocol: "libreseed/1".into(),
        name: name.to_string(),
        version: version.to_string(),
        description: None,
        author: None,
        license: None,
        homepage: None,
        repository: None,
        files,
        content_hash,
        pubkey: pubkey_tag.clone(),
        signature: String::new(),
        timestamp: now_ms,
        dependencies: None,
        scripts: None,
    };
    let payload = full.signing_bytes().unwrap();
    full.signature =
        libreseed_crypto::canonical::tag_ed25519(&kp.sign(&payload).unwrap().to_bytes());

    let manifest_json = serde_json::to_vec(&full).unwrap();
    let tarball = pack_tarball(&[
        TarballEntry {
            path: "manifest.json".to_string(),
            contents: manifest_json,
        },
        TarballEntry {
            path: "a.txt".to_string(),
            contents: a_txt_contents.to_vec(),
        },
    ])
    .unwrap();

    let infohash = compute_infohash(&tarball).unwrap();
    let mut minimal = MinimalManifest {
        protocol: "libreseed/1".into(),
        version: version.to_string(),
        name: name.to_string(),
        infohash,
        pubkey: pubkey_tag,
        signature: String::new(),
        timestamp: now_ms,
    };
    let payload = minimal.signing_bytes().unwrap();
    minimal.signature =
        libreseed_crypto::canonical::tag_ed25519(&kp.sign(&payload).unwrap().to_bytes());

    (tarball, minimal)
}

async fn publish_everything<C: libreseed_api::dht::DhtClient + 'static>(
    adapter: &Arc<DhtAdapter<C>>,
    kp: &libreseed_crypto::sign::eddsa::Ed25519KeyPair,
    name: &str,
    version: &str,
    minimal: &MinimalManifest,
    now_ms: u64,
) {
    use libreseed_api::crypto::{SerializableKey, SigningKeyPair};

    let manifest_key = libreseed_dht::key::manifest_key(name, version).unwrap();
    let bytes = serde_json::to_vec(minimal).unwrap();
    adapter.announce_raw(manifest_key, bytes).await.unwrap();

    let pubkey_tag = libreseed_crypto::canonical::tag_ed25519(&kp.public_key().to_bytes());
    let mut announce = PublisherAnnounce {
        protocol: "libreseed/1".into(),
        announce_version: 1,
        pubkey: pubkey_tag.clone(),
        timestamp: now_ms,
        packages: vec![PackageEntry {
            name: name.to_string(),
            latest_version: version.to_string(),
            versions: vec![VersionEntry {
                version: version.to_string(),
                manifest_key: libreseed_dht::key::to_hex(&manifest_key),
                timestamp: now_ms,
            }],
        }],
        signature: String::new(),
    };
    let payload = announce.signing_bytes().unwrap();
    announce.signature =
        libreseed_crypto::canonical::tag_ed25519(&kp.sign(&payload).unwrap().to_bytes());
    let announce_key = libreseed_dht::key::announce_key(&kp.public_key().to_bytes()).unwrap();
    let bytes = serde_json::to_vec(&announce).unwrap();
    adapter.announce_raw(announce_key, bytes).await.unwrap();

    let aggregator = NameIndexAggregator::new(Arc::clone(adapter));
    let pubkey = kp.public_key().to_bytes();
    aggregator
        .publish(name, &pubkey, version, now_ms, |msg| {
            Ok(kp.sign(msg).unwrap().to_bytes())
        })
        .await
        .unwrap();
}

/// Drives a tarball through the install pipeline: stages it where the
/// in-memory torrent engine expects it, marks the download complete, then
/// runs [`install`].
async fn run_install(
    resolution: &ResolutionResult,
    served_tarball: &[u8],
    download_dir: &Path,
    storage: &RecordingStorage,
) -> Result<VerifiedPackage, CoreError> {
    let engine = InMemoryTorrentEngine::new(EngineLimits::default());
    engine.start().await.unwrap();

    let btih = libreseed_resolver::install::torrent_infohash(&resolution.infohash).unwrap();
    let tarball_path = download_dir.join(format!("{btih}.tgz"));
    tokio::fs::write(&tarball_path, served_tarball).await.unwrap();

    engine
        .add_torrent(&btih, &download_dir.to_path_buf())
        .await
        .unwrap();
    engine.complete(&btih, served_tarball.len() as u64).unwrap();

    install(
        &engine,
        storage,
        resolution,
        download_dir,
        &download_dir.join("installed"),
        Duration::from_millis(5),
        Duration::from_secs(2),
    )
    .await
}

#[tokio::test]
async fn happy_path_resolve_by_name_then_install() {
    let kp = libreseed_crypto::sign::eddsa::Ed25519KeyPair::generate().unwrap();
    let a_txt = b"hi\n";
    let a_hash = hash_of(a_txt);
    let (tarball, minimal) = build_package(&kp, "hello", "1.0.0", a_txt, &a_hash, 1_000);

    let dht = InMemoryDht::new();
    let adapter = Arc::new(DhtAdapter::new(dht));
    publish_everything(&adapter, &kp, "hello", "1.0.0", &minimal, 1_000).await;

    let resolver = Resolver::new(Arc::clone(&adapter));
    let resolution = resolver
        .resolve_by_name(
            "hello",
            Some("^1.0.0"),
            libreseed_types::policy::PublisherPolicy::FirstSeen,
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(resolution.version, "1.0.0");
    assert_eq!(resolution.infohash, minimal.infohash);

    let tmp = tempfile::tempdir().unwrap();
    let storage = RecordingStorage::new();
    let verified = run_install(&resolution, &tarball, tmp.path(), &storage).await.unwrap();

    assert_eq!(verified.manifest.name, "hello");
    assert_eq!(verified.manifest.version, "1.0.0");
    assert!(storage.installed.lock().await.is_some());
}

#[tokio::test]
async fn tampered_file_fails_verify_files_without_touching_storage() {
    let kp = libreseed_crypto::sign::eddsa::Ed25519KeyPair::generate().unwrap();
    // `manifest.json` declares the hash of the *original* file, but the
    // tarball's actual `a.txt` bytes were mutated afterward without
    // updating the manifest — the protocol's tamper-rejection worked
    // example. `infohash`/the Minimal Manifest are still self-consistent
    // with the tampered bytes actually served, so only `VERIFY_FILES`
    // (not `VERIFY_INFOHASH`) should catch this.
    let declared_hash = hash_of(b"hi\n");
    let (tampered_tarball, minimal) =
        build_package(&kp, "hello", "1.0.0", b"HI\n", &declared_hash, 1_000);

    let dht = InMemoryDht::new();
    let adapter = Arc::new(DhtAdapter::new(dht));
    publish_everything(&adapter, &kp, "hello", "1.0.0", &minimal, 1_000).await;

    let resolver = Resolver::new(Arc::clone(&adapter));
    let resolution = resolver
        .resolve_by_name(
            "hello",
            None,
            libreseed_types::policy::PublisherPolicy::FirstSeen,
            None,
            None,
        )
        .await
        .unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let storage = RecordingStorage::new();
    let err = run_install(&resolution, &tampered_tarball, tmp.path(), &storage)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Crypto(CryptoError::ContentHashMismatch { .. })
    ));
    assert!(storage.installed.lock().await.is_none());
}

#[tokio::test]
async fn swapped_tarball_fails_verify_infohash() {
    let kp = libreseed_crypto::sign::eddsa::Ed25519KeyPair::generate().unwrap();
    let a_txt = b"hi\n";
    let a_hash = hash_of(a_txt);
    let (_original_tarball, minimal) = build_package(&kp, "hello", "1.0.0", a_txt, &a_hash, 1_000);

    // A different, independently valid tarball signed by the same
    // publisher, served at the same claimed infohash.
    let other_txt = b"a different package entirely\n";
    let (swapped_tarball, _) = build_package(&kp, "hello", "1.0.0", other_txt, &hash_of(other_txt), 1_000);

    let dht = InMemoryDht::new();
    let adapter = Arc::new(DhtAdapter::new(dht));
    publish_everything(&adapter, &kp, "hello", "1.0.0", &minimal, 1_000).await;

    let resolver = Resolver::new(Arc::clone(&adapter));
    let resolution = resolver
        .resolve_by_name(
            "hello",
            None,
            libreseed_types::policy::PublisherPolicy::FirstSeen,
            None,
            None,
        )
        .await
        .unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let storage = RecordingStorage::new();
    let err = run_install(&resolution, &swapped_tarball, tmp.path(), &storage)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Crypto(CryptoError::InfohashMismatch { .. })
    ));
    assert!(storage.installed.lock().await.is_none());
}
