//! The Publisher Announce: one per publisher, listing all their packages and
//! per-version manifest keys, fully re-signed on each update (§3, §4.1, §6).

use crate::validate::{
    check_name, check_non_empty, check_tagged_pubkey, check_tagged_signature, check_timestamp,
    check_version,
};
use crate::Record;
use libreseed_crypto::canonical;
use libreseed_crypto::error::CryptoError;
use libreseed_types::error::ValidationError;
use serde::{Deserialize, Serialize};

/// A single published version within a [`PackageEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    /// Semver version string.
    pub version: String,
    /// The derived DHT key (lowercase hex) the Minimal Manifest for this
    /// version was published under.
    pub manifest_key: String,
    /// Unix milliseconds when this version was added to the announce.
    pub timestamp: u64,
}

/// A package name and its published versions, within a [`PublisherAnnounce`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageEntry {
    /// Package name.
    pub name: String,
    /// The highest version currently published for this name, by this
    /// publisher.
    pub latest_version: String,
    /// Every version this publisher has ever published for this name.
    pub versions: Vec<VersionEntry>,
}

/// The Publisher Announce record (§6 schema).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherAnnounce {
    /// Protocol identifier, e.g. `"libreseed/1"`.
    pub protocol: String,
    /// Announce document schema version, incremented on breaking changes.
    pub announce_version: u32,
    /// `"ed25519:<base64>"` publisher public key.
    pub pubkey: String,
    /// Unix milliseconds this document was last (re-)signed.
    pub timestamp: u64,
    /// Every package this publisher has announced.
    pub packages: Vec<PackageEntry>,
    /// `"ed25519:<base64>"` signature over the whole document minus this
    /// field (§4.1).
    pub signature: String,
}

impl Record for PublisherAnnounce {
    fn validate(&self) -> Result<(), ValidationError> {
        check_non_empty(&self.protocol, "protocol")?;
        check_tagged_pubkey(&self.pubkey, "pubkey")?;
        check_timestamp(self.timestamp, "timestamp")?;
        check_tagged_signature(&self.signature, "signature")?;
        for pkg in &self.packages {
            check_name(&pkg.name)?;
            check_version(&pkg.latest_version)?;
            if pkg.versions.is_empty() {
                return Err(ValidationError::FieldMissing("packages.versions"));
            }
            for v in &pkg.versions {
                check_version(&v.version)?;
                check_non_empty(&v.manifest_key, "packages.versions.manifestKey")?;
                check_timestamp(v.timestamp, "packages.versions.timestamp")?;
            }
        }
        Ok(())
    }

    fn signing_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        canonical::to_canonical_bytes_without_signature(self)
    }
}

impl PublisherAnnounce {
    /// Finds the [`PackageEntry`] for `name`, if this publisher has
    /// announced it.
    pub fn find_package(&self, name: &str) -> Option<&PackageEntry> {
        self.packages.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PublisherAnnounce {
        PublisherAnnounce {
            protocol: "libreseed/1".into(),
            announce_version: 1,
            pubkey: canonical::tag_ed25519(&[1u8; 32]),
            timestamp: 1_700_000_000_000,
            packages: vec![PackageEntry {
                name: "hello".into(),
                latest_version: "1.0.0".into(),
                versions: vec![VersionEntry {
                    version: "1.0.0".into(),
                    manifest_key: "abcd".into(),
                    timestamp: 1_700_000_000_000,
                }],
            }],
            signature: canonical::tag_ed25519(&[9u8; 64]),
        }
    }

    #[test]
    fn valid_announce_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn signing_bytes_excludes_signature_field_only() {
        let a = sample();
        let bytes = a.signing_bytes().unwrap();
        let s = String::from_utf8(bytes).unwrap();
        assert!(!s.contains("\"signature\""));
        assert!(s.contains("\"packages\""));
        assert!(s.contains("hello"));
    }

    #[test]
    fn find_package_locates_by_name() {
        let a = sample();
        assert!(a.find_package("hello").is_some());
        assert!(a.find_package("missing").is_none());
    }

    #[test]
    fn rejects_package_with_no_versions() {
        let mut a = sample();
        a.packages[0].versions.clear();
        assert!(a.validate().is_err());
    }
}
