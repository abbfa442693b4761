//! The Name Index: a shared record under `name-index:<name>`, aggregating
//! one independently-signed entry per publisher of that name (§3, §4.5, §6).
//!
//! This module only defines the record shape and per-entry signature
//! contract; the merge protocol and reader-side pruning live in
//! `libreseed-nameindex`, which is the component that actually owns
//! concurrent multi-writer updates to this record.

use crate::validate::{
    check_name, check_non_empty, check_tagged_pubkey, check_tagged_signature, check_timestamp,
    check_version,
};
use crate::Record;
use libreseed_crypto::canonical;
use libreseed_crypto::error::CryptoError;
use libreseed_types::error::ValidationError;
use serde::{Deserialize, Serialize};

/// A single publisher's entry within a [`NameIndex`] (§4.5).
///
/// Each entry is signed independently by the publisher it describes, over
/// `{name, latestVersion, firstSeen, timestamp}` (§4.1). `timestamp` here is
/// this *entry's own* last-write time, not the enclosing document's — it is
/// carried alongside the entry (rather than shared from one document-wide
/// field) specifically so that one publisher's update can bump the
/// document's visible freshness without invalidating every other
/// publisher's independently-produced signature. See `DESIGN.md` for why
/// binding the payload to a single shared record timestamp doesn't work
/// under concurrent multi-writer updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherEntry {
    /// `"ed25519:<base64>"` publisher public key; unique within a well-formed
    /// [`NameIndex`].
    pub pubkey: String,
    /// The highest version this publisher currently claims for this name.
    pub latest_version: String,
    /// Unix milliseconds this publisher's entry was first written. Sticky:
    /// never rewritten once an entry exists for a given `pubkey`.
    pub first_seen: u64,
    /// Unix milliseconds this entry was last (re-)signed.
    pub timestamp: u64,
    /// `"ed25519:<base64>"` signature over this entry's signing payload.
    pub signature: String,
}

impl PublisherEntry {
    /// Validates this entry's own fields, including its signature shape (the
    /// signature's validity itself requires the enclosing index's `name`,
    /// see [`NameIndex::verify_entry`]).
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_tagged_pubkey(&self.pubkey, "publishers.pubkey")?;
        check_version(&self.latest_version)?;
        check_timestamp(self.first_seen, "publishers.firstSeen")?;
        check_timestamp(self.timestamp, "publishers.timestamp")?;
        check_tagged_signature(&self.signature, "publishers.signature")?;
        Ok(())
    }

    /// Builds the canonical signing payload for this entry: `{name,
    /// latestVersion, firstSeen, timestamp}`, where `name` comes from the
    /// enclosing [`NameIndex`] and every other field is this entry's own
    /// (§4.1).
    pub fn signing_bytes(&self, name: &str) -> Result<Vec<u8>, CryptoError> {
        canonical::to_canonical_bytes(&PublisherEntrySigningPayload {
            name,
            latest_version: &self.latest_version,
            first_seen: self.first_seen,
            timestamp: self.timestamp,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PublisherEntrySigningPayload<'a> {
    name: &'a str,
    latest_version: &'a str,
    first_seen: u64,
    timestamp: u64,
}

/// The Name Index record (§6 schema): shared under `name-index:<name>`,
/// updatable by any publisher of `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameIndex {
    /// Protocol identifier, e.g. `"libreseed/1"`.
    pub protocol: String,
    /// Name Index document schema version.
    pub index_version: u32,
    /// The package name this index is keyed on.
    pub name: String,
    /// Unix milliseconds this record was last touched by any publisher — a
    /// document-wide freshness hint, not part of any entry's signing payload.
    pub timestamp: u64,
    /// One entry per publisher that has announced `name`.
    pub publishers: Vec<PublisherEntry>,
}

impl NameIndex {
    /// Builds a fresh, empty index for `name`, as the aggregator does when
    /// no record yet exists under the derived key (§4.5 step 1).
    pub fn empty(protocol: &str, name: &str) -> Self {
        Self {
            protocol: protocol.to_string(),
            index_version: 1,
            name: name.to_string(),
            timestamp: 0,
            publishers: Vec::new(),
        }
    }

    /// Verifies a single entry's signature against this index's own `name`
    /// and the entry's own `timestamp` (§4.1, §4.5 reader-side verification).
    pub fn verify_entry<V>(&self, entry: &PublisherEntry, verify: V) -> bool
    where
        V: FnOnce(&[u8], &[u8], &[u8]) -> bool,
    {
        let Ok(payload) = entry.signing_bytes(&self.name) else {
            return false;
        };
        let Ok(pubkey_bytes) = canonical::untag_ed25519(&entry.pubkey) else {
            return false;
        };
        let Ok(sig_bytes) = canonical::untag_ed25519(&entry.signature) else {
            return false;
        };
        verify(&pubkey_bytes, &payload, &sig_bytes)
    }
}

impl Record for NameIndex {
    fn validate(&self) -> Result<(), ValidationError> {
        check_non_empty(&self.protocol, "protocol")?;
        check_name(&self.name)?;
        check_timestamp(self.timestamp, "timestamp")?;
        for entry in &self.publishers {
            entry.validate()?;
        }
        Ok(())
    }

    /// A [`NameIndex`] has no single signing payload of its own: each
    /// [`PublisherEntry`] is independently signed (§4.5). Callers that need
    /// the per-entry signing payload should use
    /// [`PublisherEntry::signing_bytes`] instead.
    fn signing_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        Err(CryptoError::EncodeError(
            "NameIndex has no whole-record signing payload; sign individual PublisherEntry values"
                .to_string(),
        ))
    }
}
