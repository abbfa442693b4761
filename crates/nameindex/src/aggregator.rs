//! The Name-Index update and reader-verification protocol (§4.5).

use crate::verify::verify_ed25519;
use libreseed_api::dht::DhtClient;
use libreseed_crypto::canonical;
use libreseed_crypto::error::CryptoError;
use libreseed_dht::{key, DhtAdapter};
use libreseed_record::name_index::{NameIndex, PublisherEntry};
use libreseed_record::Record;
use libreseed_types::error::{CoreError, DiscoveryError, ValidationError};
use libreseed_types::PROTOCOL_ID;
use std::collections::HashSet;
use std::sync::Arc;

/// Drives the update protocol (§4.5, steps 1-5) and reader-side verification
/// against a Name Index record, atop any [`DhtClient`].
pub struct NameIndexAggregator<C: DhtClient> {
    adapter: Arc<DhtAdapter<C>>,
}

impl<C: DhtClient + 'static> NameIndexAggregator<C> {
    /// Builds an aggregator over an existing [`DhtAdapter`].
    pub fn new(adapter: Arc<DhtAdapter<C>>) -> Self {
        Self { adapter }
    }

    /// Publishes (or updates) this publisher's entry for `name` (§4.5):
    ///
    /// 1. GET the current record, or start from an empty one.
    /// 2. Locate this publisher's existing entry by `pubkey`; `firstSeen` is
    ///    sticky and only set on first publish.
    /// 3. Set `latestVersion` and bump the record's `timestamp`.
    /// 4. Sign only this publisher's entry — every other entry is carried
    ///    over untouched.
    /// 5. PUT the updated record.
    ///
    /// `sign` computes an Ed25519 signature over the bytes it's given, using
    /// the caller's own private key.
    pub async fn publish(
        &self,
        name: &str,
        pubkey: &[u8],
        version: &str,
        now_ms: u64,
        sign: impl FnOnce(&[u8]) -> Result<Vec<u8>, CryptoError>,
    ) -> Result<(), CoreError> {
        let key = key::name_index_key(name)?;
        let mut index = match self.adapter.fetch_raw(key).await.map_err(CoreError::Transport)? {
            Some(bytes) => serde_json::from_slice::<NameIndex>(&bytes)
                .map_err(|e| ValidationError::SchemaInvalid(format!("name index decode: {e}")))?,
            None => NameIndex::empty(PROTOCOL_ID, name),
        };

        let pubkey_tag = canonical::tag_ed25519(pubkey);
        let first_seen = index
            .publishers
            .iter()
            .find(|e| e.pubkey == pubkey_tag)
            .map(|e| e.first_seen)
            .unwrap_or(now_ms);

        index.timestamp = now_ms;

        let mut entry = PublisherEntry {
            pubkey: pubkey_tag.clone(),
            latest_version: version.to_string(),
            first_seen,
            timestamp: now_ms,
            signature: String::new(),
        };
        let payload = entry.signing_bytes(name)?;
        let signature = sign(&payload)?;
        entry.signature = canonical::tag_ed25519(&signature);
        entry.validate()?;

        match index.publishers.iter_mut().find(|e| e.pubkey == pubkey_tag) {
            Some(existing) => *existing = entry,
            None => index.publishers.push(entry),
        }
        index.validate()?;

        let bytes = serde_json::to_vec(&index)
            .map_err(|e| ValidationError::SchemaInvalid(format!("name index encode: {e}")))?;
        self.adapter
            .announce_raw(key, bytes)
            .await
            .map_err(CoreError::Transport)?;
        Ok(())
    }

    /// Fetches the Name Index for `name` and returns every entry that
    /// survives reader-side verification (§4.5):
    ///
    /// - Entries sharing a `pubkey` with an earlier entry in the record are
    ///   dropped (duplicate pubkey is a malformed record; first wins).
    /// - Entries whose signature fails to verify are dropped.
    ///
    /// Fails with [`DiscoveryError::NameIndexNotFound`] if no record exists,
    /// or [`DiscoveryError::NoValidPublishers`] if every entry is dropped.
    pub async fn fetch_verified(&self, name: &str) -> Result<Vec<PublisherEntry>, CoreError> {
        let key = key::name_index_key(name)?;
        let bytes = self
            .adapter
            .fetch_raw(key)
            .await
            .map_err(CoreError::Transport)?
            .ok_or_else(|| DiscoveryError::NameIndexNotFound(name.to_string()))?;
        let index: NameIndex = serde_json::from_slice(&bytes)
            .map_err(|e| ValidationError::SchemaInvalid(format!("name index decode: {e}")))?;
        index.validate()?;

        let mut seen_pubkeys = HashSet::new();
        let deduped: Vec<&PublisherEntry> = index
            .publishers
            .iter()
            .filter(|e| seen_pubkeys.insert(e.pubkey.clone()))
            .collect();

        let verified: Vec<PublisherEntry> = deduped
            .into_iter()
            .filter(|entry| entry.validate().is_ok())
            .filter(|entry| index.verify_entry(entry, verify_ed25519))
            .cloned()
            .collect();

        if verified.is_empty() {
            return Err(DiscoveryError::NoValidPublishers(name.to_string()).into());
        }
        Ok(verified)
    }
}
