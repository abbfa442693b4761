//! Contracts for the external collaborators named in §6 but explicitly out of
//! scope for this engine (on-disk layout, a trusted-publisher store, wall
//! clock access). The engine is constructed against these traits so it never
//! depends on a concrete collaborator crate; an external CLI/daemon/HTTP API
//! supplies the implementations.

use async_trait::async_trait;
use libreseed_types::error::ValidationError;
use std::path::Path;

/// Local persistence for installed packages and cached records (§6).
///
/// This is intentionally narrow: the engine only needs to read and write
/// opaque byte blobs under string keys, leaving on-disk layout entirely to
/// the collaborator.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Reads the bytes stored at `key`, if present.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ValidationError>;

    /// Writes `value` at `key`, overwriting any existing value.
    async fn write(&self, key: &str, value: &[u8]) -> Result<(), ValidationError>;

    /// Removes the value at `key`, if any.
    async fn remove(&self, key: &str) -> Result<(), ValidationError>;

    /// Extracts a downloaded, verified tarball into `dest`.
    async fn install(&self, tarball: &[u8], dest: &Path) -> Result<(), ValidationError>;
}

/// A caller-maintained store of explicitly trusted publisher pubkeys, used by
/// the `UserTrust` publisher-selection policy (§4.6).
pub trait TrustStore: Send + Sync {
    /// Returns `true` if the given hex-encoded pubkey is explicitly trusted.
    fn is_trusted(&self, pubkey_hex: &str) -> bool;
}

/// Wall-clock access, abstracted so the resolver's retry/backoff and
/// re-announce scheduling logic can be driven by a fake clock in tests.
pub trait Clock: Send + Sync {
    /// Returns the current Unix timestamp in seconds.
    fn now_unix(&self) -> u64;
}

/// A [`Clock`] backed by [`std::time::SystemTime`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
