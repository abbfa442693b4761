//! The Minimal Manifest: the small signed descriptor published to the DHT,
//! signing the tarball `infohash` (§3, §4.1, §6). Re-announced every 22 hours.

use crate::validate::{
    check_name, check_non_empty, check_tagged_pubkey, check_tagged_sha256, check_tagged_signature,
    check_timestamp, check_version,
};
use crate::Record;
use libreseed_crypto::canonical;
use libreseed_crypto::error::CryptoError;
use libreseed_types::error::ValidationError;
use serde::{Deserialize, Serialize};

/// The Minimal Manifest record (§6 schema).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimalManifest {
    /// Protocol identifier, e.g. `"libreseed/1"`.
    pub protocol: String,
    /// Package version, a valid semver string at most 32 bytes.
    pub version: String,
    /// Package name, at most 64 bytes.
    pub name: String,
    /// `"sha256:<hex>"` hash of the entire tarball (§4.3).
    pub infohash: String,
    /// `"ed25519:<base64>"` publisher public key.
    pub pubkey: String,
    /// `"ed25519:<base64>"` signature over the signing payload (§4.1).
    pub signature: String,
    /// Unix milliseconds at publish time.
    pub timestamp: u64,
}

/// The exact field subset signed for a Minimal Manifest (§4.1):
/// `{protocol, name, version, infohash}`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MinimalManifestSigningPayload<'a> {
    protocol: &'a str,
    name: &'a str,
    version: &'a str,
    infohash: &'a str,
}

impl Record for MinimalManifest {
    fn validate(&self) -> Result<(), ValidationError> {
        check_non_empty(&self.protocol, "protocol")?;
        check_name(&self.name)?;
        check_version(&self.version)?;
        check_tagged_sha256(&self.infohash, "infohash")?;
        check_tagged_pubkey(&self.pubkey, "pubkey")?;
        check_tagged_signature(&self.signature, "signature")?;
        check_timestamp(self.timestamp, "timestamp")?;
        Ok(())
    }

    fn signing_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        canonical::to_canonical_bytes(&MinimalManifestSigningPayload {
            protocol: &self.protocol,
            name: &self.name,
            version: &self.version,
            infohash: &self.infohash,
        })
    }
}
