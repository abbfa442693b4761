//! The Full Manifest: embedded at `manifest.json` inside every tarball,
//! signing the `contentHash` (§3, §4.1, §6). Never mutated after build.

use crate::validate::{
    check_name, check_non_empty, check_tagged_pubkey, check_tagged_sha256, check_tagged_signature,
    check_timestamp, check_version,
};
use crate::Record;
use libreseed_crypto::canonical;
use libreseed_crypto::error::CryptoError;
use libreseed_types::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The Full Manifest record (§6 schema).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullManifest {
    /// Protocol identifier, e.g. `"libreseed/1"`.
    pub protocol: String,
    /// Package name, at most 64 bytes.
    pub name: String,
    /// Package version, a valid semver string at most 32 bytes.
    pub version: String,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// SPDX license identifier or similar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Homepage URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    /// Source repository URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Map of tarball-relative path to `"sha256:<hex>"` content hash.
    pub files: BTreeMap<String, String>,
    /// `"sha256:<hex>"` Merkle-style hash over `files` (§4.3).
    pub content_hash: String,
    /// `"ed25519:<base64>"` publisher public key.
    pub pubkey: String,
    /// `"ed25519:<base64>"` signature over the signing payload (§4.1).
    pub signature: String,
    /// Unix milliseconds at build time.
    pub timestamp: u64,
    /// Optional dependency name -> version-range map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeMap<String, String>>,
    /// Optional named lifecycle scripts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scripts: Option<BTreeMap<String, String>>,
}

/// The exact field subset signed for a Full Manifest (§4.1):
/// `{protocol, name, version, contentHash}`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FullManifestSigningPayload<'a> {
    protocol: &'a str,
    name: &'a str,
    version: &'a str,
    content_hash: &'a str,
}

impl Record for FullManifest {
    fn validate(&self) -> Result<(), ValidationError> {
        check_non_empty(&self.protocol, "protocol")?;
        check_name(&self.name)?;
        check_version(&self.version)?;
        check_tagged_sha256(&self.content_hash, "contentHash")?;
        check_tagged_pubkey(&self.pubkey, "pubkey")?;
        check_tagged_signature(&self.signature, "signature")?;
        check_timestamp(self.timestamp, "timestamp")?;
        for (path, hash) in &self.files {
            if path.is_empty() {
                return Err(ValidationError::FieldMissing("files.path"));
            }
            check_tagged_sha256(hash, "files.hash")?;
        }
        Ok(())
    }

    fn signing_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        canonical::to_canonical_bytes(&FullManifestSigningPayload {
            protocol: &self.protocol,
            name: &self.name,
            version: &self.version,
            content_hash: &self.content_hash,
        })
    }
}
