//! The generic `announce`/`fetch` contract (§4.4) atop any [`DhtClient`]:
//! structural validation, canonical (de)serialization, and re-announce
//! scheduling. Record-type-specific signature verification is supplied by
//! the caller, since each record type's signing payload and pubkey location
//! differ (§4.1) — the adapter itself stays record-shape-agnostic.

use libreseed_api::dht::{DhtClient, DhtKey};
use libreseed_record::Record;
use libreseed_types::error::{CoreError, TransportError, ValidationError};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::reannounce::ReannounceScheduler;

/// Wraps a [`DhtClient`] transport with the record-hygiene and re-announce
/// behavior every LibreSeed record publisher needs (§4.4).
pub struct DhtAdapter<C: DhtClient> {
    client: Arc<C>,
    fetch_timeout: Duration,
    reannounce: Arc<ReannounceScheduler>,
}

impl<C: DhtClient + 'static> DhtAdapter<C> {
    /// Builds an adapter over `client` with the default 30s fetch timeout
    /// (§4.4) and its own re-announce scheduler.
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            fetch_timeout: Duration::from_secs(libreseed_types::DHT_FETCH_TIMEOUT_SECS),
            reannounce: ReannounceScheduler::new(),
        }
    }

    /// Overrides the default fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Starts the background re-announce loop against this adapter's
    /// client.
    pub fn spawn_reannounce_loop(&self) -> tokio::task::JoinHandle<()> {
        self.reannounce.spawn(Arc::clone(&self.client))
    }

    /// Validates and (locally) verifies `record`, then PUTs its canonical
    /// bytes at `key` and schedules it for periodic re-announce (§4.4).
    ///
    /// `verify` performs the record-type-specific signature check — e.g. an
    /// `Ed25519PublicKey::verify` against the record's own `pubkey` field —
    /// since the adapter has no notion of which field holds the signer.
    pub async fn announce<T>(
        &self,
        key: DhtKey,
        record: &T,
        verify: impl FnOnce(&T) -> bool,
    ) -> Result<(), CoreError>
    where
        T: Record + Serialize,
    {
        record.validate()?;
        if !verify(record) {
            return Err(libreseed_types::error::CryptoError::VerifyFailed.into());
        }
        let bytes = serde_json::to_vec(record)
            .map_err(|e| ValidationError::SchemaInvalid(e.to_string()))?;
        self.client
            .announce(key, bytes.clone())
            .await
            .map_err(CoreError::Transport)?;
        self.reannounce.schedule(key, bytes).await;
        Ok(())
    }

    /// GETs the value at `key`, decodes and validates it as `T`, and runs
    /// `verify` against it. Returns `Ok(None)` if nothing is stored at
    /// `key`; callers map that to the record-type-specific "not found" error
    /// (`NameIndexNotFound`, `AnnounceNotFound`, `ManifestNotFound`).
    pub async fn fetch<T>(
        &self,
        key: DhtKey,
        verify: impl FnOnce(&T) -> bool,
    ) -> Result<Option<T>, CoreError>
    where
        T: Record + DeserializeOwned,
    {
        let value = self
            .client
            .fetch(key, self.fetch_timeout)
            .await
            .map_err(CoreError::Transport)?;
        let Some(bytes) = value else {
            return Ok(None);
        };
        let record: T = serde_json::from_slice(&bytes)
            .map_err(|e| ValidationError::SchemaInvalid(format!("decode: {e}")))?;
        record.validate()?;
        if !verify(&record) {
            return Err(libreseed_types::error::CryptoError::VerifyFailed.into());
        }
        Ok(Some(record))
    }

    /// Fetches the raw bytes at `key` without decoding, for callers (the
    /// Name-Index aggregator) that need to merge into an existing record
    /// rather than replace it outright.
    pub async fn fetch_raw(&self, key: DhtKey) -> Result<Option<Vec<u8>>, TransportError> {
        self.client.fetch(key, self.fetch_timeout).await
    }

    /// PUTs raw, already-canonicalized bytes at `key` and schedules
    /// re-announce, for callers that construct their own canonical form
    /// (the Name-Index aggregator, after merging entries).
    pub async fn announce_raw(&self, key: DhtKey, bytes: Vec<u8>) -> Result<(), TransportError> {
        self.client.announce(key, bytes.clone()).await?;
        self.reannounce.schedule(key, bytes).await;
        Ok(())
    }
}
