//! The `TorrentEngine` contract (§4.7): a pluggable BitTorrent swarm adapter
//! the resolver uses to fetch a package tarball once its infohash has been
//! verified against a signed manifest.

use async_trait::async_trait;
use libreseed_types::error::EngineError;
use std::path::PathBuf;

/// Lifecycle state of a torrent engine (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// The engine has not been started, or `stop` has completed.
    Stopped,
    /// `start` has been called but the engine is not yet accepting operations.
    Starting,
    /// The engine is accepting `add_torrent`/`remove_torrent` calls.
    Running,
    /// `stop` has been called and background tasks are winding down.
    Stopping,
}

/// Per-torrent state (§4.7), distinct from the engine's own lifecycle
/// ([`EngineState`]): many torrents share one engine and each tracks its own
/// progress independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorrentState {
    /// Added but not yet downloading or seeding (e.g. awaiting metadata).
    Idle,
    /// Actively fetching pieces.
    Downloading,
    /// Download complete; uploading to other peers.
    Seeding,
    /// Paused by the caller; no network activity for this torrent.
    Paused,
    /// Re-verifying on-disk pieces against the torrent's piece hashes.
    Checking,
    /// The torrent hit an unrecoverable error (disk I/O, corrupt metadata).
    Error,
}

/// Progress/status snapshot for a single tracked torrent.
#[derive(Debug, Clone)]
pub struct TorrentStatus {
    /// Lowercase hex infohash, 40 characters for BitTorrent v1.
    pub infohash: String,
    /// This torrent's own lifecycle state, independent of the engine's.
    pub state: TorrentState,
    /// Bytes downloaded so far.
    pub downloaded_bytes: u64,
    /// Bytes uploaded so far.
    pub uploaded_bytes: u64,
    /// Total size of the torrent's content, once known from metadata.
    pub total_bytes: Option<u64>,
    /// Number of connected peers currently seeding or leeching this torrent.
    pub peer_count: usize,
    /// Whether the download has completed and all files are on disk.
    pub is_complete: bool,
}

/// Per-instance resource limits the engine enforces across all tracked
/// torrents (§4.7).
#[derive(Debug, Clone, Copy)]
pub struct EngineLimits {
    /// Maximum number of torrents the engine will track at once.
    pub max_active_torrents: usize,
    /// Maximum established peer connections per torrent.
    pub max_connections_per_torrent: usize,
    /// Optional upload rate cap, in bytes/second.
    pub upload_rate_limit_bps: Option<u64>,
    /// Optional download rate cap, in bytes/second.
    pub download_rate_limit_bps: Option<u64>,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_active_torrents: 64,
            max_connections_per_torrent: 50,
            upload_rate_limit_bps: None,
            download_rate_limit_bps: None,
        }
    }
}

/// A trait for a standalone, pluggable BitTorrent swarm engine.
#[async_trait]
pub trait TorrentEngine: Send + Sync {
    /// Starts the engine's background swarm tasks. Idempotent: starting an
    /// already-running engine succeeds without side effects.
    async fn start(&self) -> Result<(), EngineError>;

    /// Stops all background swarm tasks. Idempotent: stopping an
    /// already-stopped engine succeeds without side effects.
    async fn stop(&self) -> Result<(), EngineError>;

    /// Returns the engine's current lifecycle state.
    fn state(&self) -> EngineState;

    /// Begins seeding/leeching the torrent identified by `infohash`,
    /// downloading its content under `download_dir`. Returns
    /// [`EngineError::TorrentExists`] if already tracked, or
    /// [`EngineError::MaxTorrentsReached`] if the configured cap would be
    /// exceeded. Fails with [`EngineError::EngineNotStarted`] unless the
    /// engine is [`EngineState::Running`].
    async fn add_torrent(&self, infohash: &str, download_dir: &PathBuf) -> Result<(), EngineError>;

    /// Adds a torrent from raw `.torrent` metainfo bytes rather than a bare
    /// infohash, for the "add by metainfo" path of §4.7. Returns the
    /// torrent's derived infohash.
    async fn add_torrent_from_metainfo(
        &self,
        metainfo: &[u8],
        download_dir: &PathBuf,
    ) -> Result<String, EngineError>;

    /// Adds a torrent from a magnet URI, for the "add by magnet link" path of
    /// §4.7. Returns the torrent's infohash, extracted from the magnet's
    /// `xt` parameter. The resulting torrent stays in
    /// [`TorrentState::Idle`] until metadata arrives from peers.
    async fn add_torrent_from_magnet(
        &self,
        magnet_uri: &str,
        download_dir: &PathBuf,
    ) -> Result<String, EngineError>;

    /// Blocks until metadata is available for a torrent added by bare
    /// infohash or magnet link, or `deadline` elapses.
    async fn wait_for_metadata(
        &self,
        infohash: &str,
        deadline: std::time::Duration,
    ) -> Result<(), EngineError>;

    /// Pauses a tracked torrent: stops network activity without forgetting
    /// progress. A no-op if already paused.
    async fn pause_torrent(&self, infohash: &str) -> Result<(), EngineError>;

    /// Resumes a paused torrent.
    async fn resume_torrent(&self, infohash: &str) -> Result<(), EngineError>;

    /// Re-verifies a tracked torrent's on-disk pieces against its piece
    /// hashes, transitioning it through [`TorrentState::Checking`].
    async fn reverify_torrent(&self, infohash: &str) -> Result<(), EngineError>;

    /// Stops tracking and seeding the given torrent, optionally deleting its
    /// downloaded data.
    async fn remove_torrent(&self, infohash: &str, delete_data: bool) -> Result<(), EngineError>;

    /// Returns a status snapshot for the given torrent.
    async fn status(&self, infohash: &str) -> Result<TorrentStatus, EngineError>;
}
