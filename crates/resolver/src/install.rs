//! The end-to-end installation pipeline (§4.6): `DOWNLOAD_TARBALL →
//! VERIFY_INFOHASH → VERIFY_FULL_MANIFEST → VERIFY_FILES → DONE`, run against
//! an already-[`ResolutionResult`](crate::resolve::ResolutionResult).
//!
//! Bridges the protocol's content-addressed `infohash` (a tagged SHA-256 of
//! the whole tarball, §4.3) to the torrent engine's BitTorrent-v1-shaped
//! 40-hex infohash: the first 20 bytes of the same SHA-256 digest are used as
//! the swarm identifier, so a single content hash drives both integrity
//! checks. See `DESIGN.md` for why this convention was chosen over a second,
//! independent BitTorrent infohash.

use crate::resolve::ResolutionResult;
use libreseed_api::collaborators::Storage;
use libreseed_api::torrent::TorrentEngine;
use libreseed_content_hash::{compute_content_hash, compute_infohash, unpack_tarball};
use libreseed_crypto::canonical;
use libreseed_record::{FullManifest, Record};
use libreseed_types::error::{CoreError, CryptoError, TransportError, ValidationError};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A fully verified, extracted package ready for storage (§4.6 step 5).
#[derive(Debug, Clone)]
pub struct VerifiedPackage {
    /// The embedded, signature-verified Full Manifest.
    pub manifest: FullManifest,
    /// The raw, un-repacked tarball bytes, for [`Storage::install`].
    pub tarball_bytes: Vec<u8>,
}

/// Derives the 40-hex surrogate BitTorrent infohash the torrent engine
/// tracks this package's swarm under, from the protocol's tagged SHA-256
/// `infohash` field.
pub fn torrent_infohash(tagged_infohash: &str) -> Result<String, CryptoError> {
    let digest = canonical::untag_sha256(tagged_infohash)?;
    Ok(canonical::hex_codec::encode(&digest[..20]))
}

fn verify_signed_full_manifest(manifest: &FullManifest) -> Result<(), CoreError> {
    let payload = manifest.signing_bytes()?;
    let pubkey = canonical::untag_ed25519(&manifest.pubkey)?;
    let signature = canonical::untag_ed25519(&manifest.signature)?;
    if libreseed_nameindex::verify::verify_ed25519(&pubkey, &payload, &signature) {
        Ok(())
    } else {
        Err(CryptoError::VerifyFailed.into())
    }
}

/// Runs the install pipeline for an already-resolved package.
///
/// `download_dir` is where the torrent engine stages the tarball;
/// `resolution.infohash` is expected to name a single file at
/// `download_dir/<infohash-hex>.tgz` once the torrent completes — the layout
/// convention documented in `DESIGN.md`.
pub async fn install<E, S>(
    engine: &E,
    storage: &S,
    resolution: &ResolutionResult,
    download_dir: &Path,
    install_dest: &Path,
    poll_interval: Duration,
    download_timeout: Duration,
) -> Result<VerifiedPackage, CoreError>
where
    E: TorrentEngine,
    S: Storage,
{
    // DOWNLOAD_TARBALL
    let btih = torrent_infohash(&resolution.infohash)?;
    let download_dir_buf: PathBuf = download_dir.to_path_buf();
    engine
        .add_torrent(&btih, &download_dir_buf)
        .await
        .map_err(CoreError::Engine)?;

    let deadline = tokio::time::Instant::now() + download_timeout;
    loop {
        let status = engine.status(&btih).await.map_err(CoreError::Engine)?;
        if status.is_complete {
            break;
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(TransportError::TorrentUnreachable(format!(
                "download of {btih} did not complete within {download_timeout:?}"
            ))
            .into());
        }
        tokio::time::sleep(poll_interval).await;
    }

    let tarball_path = download_dir.join(format!("{btih}.tgz"));
    let tarball_bytes = tokio::fs::read(&tarball_path).await.map_err(|e| {
        ValidationError::SchemaInvalid(format!("reading downloaded tarball: {e}"))
    })?;

    // VERIFY_INFOHASH
    let recomputed_infohash = compute_infohash(&tarball_bytes)?;
    if recomputed_infohash != resolution.infohash {
        return Err(CryptoError::InfohashMismatch {
            expected: resolution.infohash.clone(),
            got: recomputed_infohash,
        }
        .into());
    }

    // VERIFY_FULL_MANIFEST
    let files = unpack_tarball(&tarball_bytes)?;
    let manifest_bytes = files
        .get("manifest.json")
        .ok_or(ValidationError::FieldMissing("manifest.json"))?;
    let manifest: FullManifest = serde_json::from_slice(manifest_bytes)
        .map_err(|e| ValidationError::SchemaInvalid(format!("manifest decode: {e}")))?;
    manifest.validate()?;
    verify_signed_full_manifest(&manifest)?;

    if manifest.pubkey != resolution.pubkey {
        return Err(CryptoError::PubkeyMismatch {
            expected: resolution.pubkey.clone(),
            got: manifest.pubkey,
        }
        .into());
    }

    let recomputed_content_hash = compute_content_hash(&manifest.files)?;
    if recomputed_content_hash != manifest.content_hash {
        return Err(CryptoError::ContentHashMismatch {
            expected: manifest.content_hash,
            got: recomputed_content_hash,
        }
        .into());
    }

    // VERIFY_FILES
    for (path, declared_hash) in &manifest.files {
        let bytes = files
            .get(path)
            .ok_or_else(|| ValidationError::FieldMissing("files entry missing from tarball"))?;
        let digest = libreseed_crypto::algorithms::hash::sha256(bytes)?;
        let actual_hash = canonical::tag_sha256(&digest);
        if &actual_hash != declared_hash {
            return Err(CryptoError::ContentHashMismatch {
                expected: declared_hash.clone(),
                got: actual_hash,
            }
            .into());
        }
    }
    let extra = files
        .keys()
        .find(|path| path.as_str() != "manifest.json" && !manifest.files.contains_key(*path));
    if let Some(path) = extra {
        return Err(ValidationError::SchemaInvalid(format!(
            "tarball contains undeclared file: {path}"
        ))
        .into());
    }

    // DONE
    storage.install(&tarball_bytes, install_dest).await?;

    Ok(VerifiedPackage {
        manifest,
        tarball_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn torrent_infohash_is_20_bytes_hex() {
        let tagged = canonical::tag_sha256(&[9u8; 32]);
        let btih = torrent_infohash(&tagged).unwrap();
        assert_eq!(btih.len(), 40);
    }

    #[test]
    fn torrent_infohash_rejects_malformed_tag() {
        assert!(torrent_infohash("not-tagged").is_err());
    }
}
