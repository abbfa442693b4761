//! Seeder Status: an optional, periodically re-announced record describing a
//! seeder's bandwidth and currently-seeded package set (§3, §4.1).

use crate::validate::{check_bare_seeder_id, check_non_empty, check_tagged_sha256, check_timestamp};
use crate::Record;
use libreseed_crypto::canonical;
use libreseed_crypto::error::CryptoError;
use libreseed_types::error::ValidationError;
use serde::{Deserialize, Serialize};

/// A single package version a seeder currently holds and serves (§3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedEntry {
    /// Package name.
    pub name: String,
    /// Package version.
    pub version: String,
    /// `"sha256:<hex>"` infohash of the seeded tarball.
    pub infohash: String,
}

/// The Seeder Status record. `seederID = base64(SHA-256(seeder pubkey))`
/// (§3), published under `seeder:<seederID>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeederStatus {
    /// Protocol identifier, e.g. `"libreseed/1"`.
    pub protocol: String,
    /// Bare base64 `SHA-256(seeder pubkey)`, per §3's field convention.
    pub seeder_id: String,
    /// Reported upload bandwidth in bytes/sec, if the seeder chooses to share it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_bandwidth_bps: Option<u64>,
    /// Every package version currently seeded.
    pub seeding: Vec<SeedEntry>,
    /// Unix milliseconds this status was last (re-)signed.
    pub timestamp: u64,
    /// `"ed25519:<base64>"` signature over the whole document minus this field.
    pub signature: String,
}

impl Record for SeederStatus {
    fn validate(&self) -> Result<(), ValidationError> {
        check_non_empty(&self.protocol, "protocol")?;
        check_bare_seeder_id(&self.seeder_id, "seederID")?;
        check_timestamp(self.timestamp, "timestamp")?;
        if self.signature.is_empty() {
            return Err(ValidationError::FieldMissing("signature"));
        }
        for entry in &self.seeding {
            check_non_empty(&entry.name, "seeding.name")?;
            check_non_empty(&entry.version, "seeding.version")?;
            check_tagged_sha256(&entry.infohash, "seeding.infohash")?;
        }
        Ok(())
    }

    fn signing_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        canonical::to_canonical_bytes_without_signature(self)
    }
}

impl SeederStatus {
    /// Derives the `seederID` for a raw 32-byte seeder Ed25519 public key
    /// (§3): `base64(SHA-256(pubkey))`.
    pub fn derive_seeder_id(pubkey: &[u8]) -> Result<String, CryptoError> {
        let digest = libreseed_crypto::algorithms::hash::sha256(pubkey)?;
        Ok(canonical::base64_codec::encode(&digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SeederStatus {
        SeederStatus {
            protocol: "libreseed/1".into(),
            seeder_id: SeederStatus::derive_seeder_id(&[1u8; 32]).unwrap(),
            upload_bandwidth_bps: Some(1_000_000),
            seeding: vec![SeedEntry {
                name: "hello".into(),
                version: "1.0.0".into(),
                infohash: canonical::tag_sha256(&[4u8; 32]),
            }],
            timestamp: 1_700_000_000_000,
            signature: canonical::tag_ed25519(&[3u8; 64]),
        }
    }

    #[test]
    fn valid_status_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn signing_bytes_excludes_signature() {
        let s = sample();
        let bytes = s.signing_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(!text.contains("\"signature\""));
        assert!(text.contains("seederId"));
    }

    #[test]
    fn derive_seeder_id_is_deterministic() {
        let a = SeederStatus::derive_seeder_id(&[9u8; 32]).unwrap();
        let b = SeederStatus::derive_seeder_id(&[9u8; 32]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_seeder_id_encoding() {
        let mut s = sample();
        s.seeder_id = "not-base64!!".into();
        assert!(s.validate().is_err());
    }
}
