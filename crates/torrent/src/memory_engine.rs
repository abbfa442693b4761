//! A fully simulated, `DashMap`-backed [`TorrentEngine`] used by resolver
//! and install-pipeline tests and by any caller not yet wired to a live
//! swarm.

use crate::magnet::parse_magnet_infohash;
use crate::metainfo::{files_by_path, parse_torrent_file, validate_infohash};
use async_trait::async_trait;
use dashmap::DashMap;
use libreseed_api::torrent::{EngineLimits, EngineState, TorrentEngine, TorrentState, TorrentStatus};
use libreseed_types::error::EngineError;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

const STOPPED: u8 = 0;
const STARTING: u8 = 1;
const RUNNING: u8 = 2;
const STOPPING: u8 = 3;

#[derive(Clone)]
struct Tracked {
    state: TorrentState,
    download_dir: PathBuf,
    downloaded_bytes: u64,
    uploaded_bytes: u64,
    total_bytes: Option<u64>,
    peer_count: usize,
}

impl Tracked {
    fn new(download_dir: PathBuf) -> Self {
        Self {
            state: TorrentState::Idle,
            download_dir,
            downloaded_bytes: 0,
            uploaded_bytes: 0,
            total_bytes: None,
            peer_count: 0,
        }
    }

    fn to_status(&self, infohash: &str) -> TorrentStatus {
        TorrentStatus {
            infohash: infohash.to_string(),
            state: self.state,
            downloaded_bytes: self.downloaded_bytes,
            uploaded_bytes: self.uploaded_bytes,
            total_bytes: self.total_bytes,
            peer_count: self.peer_count,
            is_complete: self.state == TorrentState::Seeding,
        }
    }
}

/// A `DashMap`-backed [`TorrentEngine`] that never touches the network:
/// `add_torrent` immediately marks a torrent `Downloading` and a test harness
/// drives it to completion with [`InMemoryTorrentEngine::complete`] rather
/// than waiting on real peers.
pub struct InMemoryTorrentEngine {
    state: AtomicU8,
    limits: EngineLimits,
    torrents: DashMap<String, Tracked>,
    add_lock: Mutex<()>,
}

impl InMemoryTorrentEngine {
    /// Creates a new, stopped engine with the given resource limits.
    pub fn new(limits: EngineLimits) -> Self {
        Self {
            state: AtomicU8::new(STOPPED),
            limits,
            torrents: DashMap::new(),
            add_lock: Mutex::new(()),
        }
    }

    fn require_running(&self) -> Result<(), EngineError> {
        if self.state.load(Ordering::SeqCst) != RUNNING {
            return Err(EngineError::EngineNotStarted);
        }
        Ok(())
    }

    /// Test/demo hook: marks a tracked torrent complete and fully seeded,
    /// simulating a finished download without real peer I/O.
    pub fn complete(&self, infohash: &str, total_bytes: u64) -> Result<(), EngineError> {
        let mut entry = self
            .torrents
            .get_mut(infohash)
            .ok_or_else(|| EngineError::TorrentNotFound(infohash.to_string()))?;
        entry.state = TorrentState::Seeding;
        entry.total_bytes = Some(total_bytes);
        entry.downloaded_bytes = total_bytes;
        Ok(())
    }

    /// Test/demo hook: returns the download directory an infohash was added
    /// under, for writing the simulated downloaded bytes to disk.
    pub fn download_dir_for(&self, infohash: &str) -> Option<PathBuf> {
        self.torrents.get(infohash).map(|t| t.download_dir.clone())
    }
}

#[async_trait]
impl TorrentEngine for InMemoryTorrentEngine {
    async fn start(&self) -> Result<(), EngineError> {
        self.state.store(RUNNING, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        self.state.store(STOPPED, Ordering::SeqCst);
        Ok(())
    }

    fn state(&self) -> EngineState {
        match self.state.load(Ordering::SeqCst) {
            STARTING => EngineState::Starting,
            RUNNING => EngineState::Running,
            STOPPING => EngineState::Stopping,
            _ => EngineState::Stopped,
        }
    }

    async fn add_torrent(&self, infohash: &str, download_dir: &PathBuf) -> Result<(), EngineError> {
        self.require_running()?;
        validate_infohash(infohash)?;
        let _guard = self.add_lock.lock().await;
        if self.torrents.contains_key(infohash) {
            return Err(EngineError::TorrentExists(infohash.to_string()));
        }
        if self.torrents.len() >= self.limits.max_active_torrents {
            return Err(EngineError::MaxTorrentsReached(self.limits.max_active_torrents));
        }
        let mut tracked = Tracked::new(download_dir.clone());
        tracked.state = TorrentState::Downloading;
        self.torrents.insert(infohash.to_string(), tracked);
        Ok(())
    }

    async fn add_torrent_from_metainfo(
        &self,
        metainfo: &[u8],
        download_dir: &PathBuf,
    ) -> Result<String, EngineError> {
        let (parsed, infohash) = parse_torrent_file(metainfo)?;
        let by_path = files_by_path(&parsed.info);
        let raw_file_count = parsed.info.files.as_ref().map_or(1, |f| f.len());
        if by_path.len() != raw_file_count {
            return Err(EngineError::InvalidTorrentFile(
                "duplicate file path in metainfo".to_string(),
            ));
        }
        self.add_torrent(&infohash, download_dir).await?;
        if let Some(mut entry) = self.torrents.get_mut(&infohash) {
            entry.total_bytes = Some(by_path.values().sum());
        }
        Ok(infohash)
    }

    async fn add_torrent_from_magnet(
        &self,
        magnet_uri: &str,
        download_dir: &PathBuf,
    ) -> Result<String, EngineError> {
        let infohash = parse_magnet_infohash(magnet_uri)?;
        self.require_running()?;
        let _guard = self.add_lock.lock().await;
        if self.torrents.contains_key(&infohash) {
            return Err(EngineError::TorrentExists(infohash));
        }
        if self.torrents.len() >= self.limits.max_active_torrents {
            return Err(EngineError::MaxTorrentsReached(self.limits.max_active_torrents));
        }
        self.torrents
            .insert(infohash.clone(), Tracked::new(download_dir.clone()));
        Ok(infohash)
    }

    async fn wait_for_metadata(
        &self,
        infohash: &str,
        _deadline: Duration,
    ) -> Result<(), EngineError> {
        let entry = self
            .torrents
            .get(infohash)
            .ok_or_else(|| EngineError::TorrentNotFound(infohash.to_string()))?;
        if entry.total_bytes.is_some() {
            Ok(())
        } else {
            Err(EngineError::TorrentNotFound(infohash.to_string()))
        }
    }

    async fn pause_torrent(&self, infohash: &str) -> Result<(), EngineError> {
        let mut entry = self
            .torrents
            .get_mut(infohash)
            .ok_or_else(|| EngineError::TorrentNotFound(infohash.to_string()))?;
        entry.state = TorrentState::Paused;
        Ok(())
    }

    async fn resume_torrent(&self, infohash: &str) -> Result<(), EngineError> {
        let mut entry = self
            .torrents
            .get_mut(infohash)
            .ok_or_else(|| EngineError::TorrentNotFound(infohash.to_string()))?;
        if entry.state == TorrentState::Paused {
            entry.state = if entry.downloaded_bytes == entry.total_bytes.unwrap_or(u64::MAX) {
                TorrentState::Seeding
            } else {
                TorrentState::Downloading
            };
        }
        Ok(())
    }

    async fn reverify_torrent(&self, infohash: &str) -> Result<(), EngineError> {
        let mut entry = self
            .torrents
            .get_mut(infohash)
            .ok_or_else(|| EngineError::TorrentNotFound(infohash.to_string()))?;
        let restore_to = entry.state;
        entry.state = TorrentState::Checking;
        drop(entry);
        if let Some(mut entry) = self.torrents.get_mut(infohash) {
            entry.state = restore_to;
        }
        Ok(())
    }

    async fn remove_torrent(&self, infohash: &str, _delete_data: bool) -> Result<(), EngineError> {
        self.torrents
            .remove(infohash)
            .map(|_| ())
            .ok_or_else(|| EngineError::TorrentNotFound(infohash.to_string()))
    }

    async fn status(&self, infohash: &str) -> Result<TorrentStatus, EngineError> {
        self.torrents
            .get(infohash)
            .map(|t| t.to_status(infohash))
            .ok_or_else(|| EngineError::TorrentNotFound(infohash.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infohash(byte: u8) -> String {
        libreseed_crypto::canonical::hex_codec::encode(&[byte; 20])
    }

    #[tokio::test]
    async fn add_torrent_requires_a_running_engine() {
        let engine = InMemoryTorrentEngine::new(EngineLimits::default());
        let ih = infohash(1);
        let err = engine.add_torrent(&ih, &PathBuf::from("/tmp")).await;
        assert!(matches!(err, Err(EngineError::EngineNotStarted)));
    }

    #[tokio::test]
    async fn add_then_complete_then_status_reports_seeding() {
        let engine = InMemoryTorrentEngine::new(EngineLimits::default());
        engine.start().await.unwrap();
        let ih = infohash(2);
        engine.add_torrent(&ih, &PathBuf::from("/tmp")).await.unwrap();
        engine.complete(&ih, 1024).unwrap();
        let status = engine.status(&ih).await.unwrap();
        assert!(status.is_complete);
        assert_eq!(status.total_bytes, Some(1024));
    }

    #[tokio::test]
    async fn duplicate_infohash_is_rejected() {
        let engine = InMemoryTorrentEngine::new(EngineLimits::default());
        engine.start().await.unwrap();
        let ih = infohash(3);
        engine.add_torrent(&ih, &PathBuf::from("/tmp")).await.unwrap();
        let err = engine.add_torrent(&ih, &PathBuf::from("/tmp")).await;
        assert!(matches!(err, Err(EngineError::TorrentExists(_))));
    }

    #[tokio::test]
    async fn max_active_torrents_is_enforced() {
        let engine = InMemoryTorrentEngine::new(EngineLimits {
            max_active_torrents: 1,
            ..EngineLimits::default()
        });
        engine.start().await.unwrap();
        engine
            .add_torrent(&infohash(4), &PathBuf::from("/tmp"))
            .await
            .unwrap();
        let err = engine.add_torrent(&infohash(5), &PathBuf::from("/tmp")).await;
        assert!(matches!(err, Err(EngineError::MaxTorrentsReached(1))));
    }

    #[tokio::test]
    async fn pause_then_resume_restores_downloading() {
        let engine = InMemoryTorrentEngine::new(EngineLimits::default());
        engine.start().await.unwrap();
        let ih = infohash(6);
        engine.add_torrent(&ih, &PathBuf::from("/tmp")).await.unwrap();
        engine.pause_torrent(&ih).await.unwrap();
        assert_eq!(engine.status(&ih).await.unwrap().state, TorrentState::Paused);
        engine.resume_torrent(&ih).await.unwrap();
        assert_eq!(engine.status(&ih).await.unwrap().state, TorrentState::Downloading);
    }

    #[tokio::test]
    async fn remove_torrent_forgets_it() {
        let engine = InMemoryTorrentEngine::new(EngineLimits::default());
        engine.start().await.unwrap();
        let ih = infohash(7);
        engine.add_torrent(&ih, &PathBuf::from("/tmp")).await.unwrap();
        engine.remove_torrent(&ih, true).await.unwrap();
        assert!(matches!(
            engine.status(&ih).await,
            Err(EngineError::TorrentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn add_torrent_from_metainfo_sums_distinct_file_paths() {
        use crate::metainfo::{FileEntry, Info, Metainfo};
        use serde_bytes::ByteBuf;

        let metainfo = Metainfo {
            announce: None,
            info: Info {
                name: "pkg".to_string(),
                piece_length: 16_384,
                pieces: ByteBuf::from(vec![0u8; 20]),
                length: None,
                files: Some(vec![
                    FileEntry { length: 10, path: vec!["a.txt".to_string()] },
                    FileEntry { length: 20, path: vec!["b.txt".to_string()] },
                ]),
            },
        };
        let bytes = serde_bencode::to_bytes(&metainfo).unwrap();

        let engine = InMemoryTorrentEngine::new(EngineLimits::default());
        engine.start().await.unwrap();
        let ih = engine
            .add_torrent_from_metainfo(&bytes, &PathBuf::from("/tmp"))
            .await
            .unwrap();
        assert_eq!(engine.status(&ih).await.unwrap().total_bytes, Some(30));
    }

    #[tokio::test]
    async fn add_torrent_from_metainfo_rejects_duplicate_file_paths() {
        use crate::metainfo::{FileEntry, Info, Metainfo};
        use serde_bytes::ByteBuf;

        let metainfo = Metainfo {
            announce: None,
            info: Info {
                name: "pkg".to_string(),
                piece_length: 16_384,
                pieces: ByteBuf::from(vec![0u8; 20]),
                length: None,
                files: Some(vec![
                    FileEntry { length: 10, path: vec!["a.txt".to_string()] },
                    FileEntry { length: 20, path: vec!["a.txt".to_string()] },
                ]),
            },
        };
        let bytes = serde_bencode::to_bytes(&metainfo).unwrap();

        let engine = InMemoryTorrentEngine::new(EngineLimits::default());
        engine.start().await.unwrap();
        let err = engine
            .add_torrent_from_metainfo(&bytes, &PathBuf::from("/tmp"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTorrentFile(_)));
    }

    #[tokio::test]
    async fn add_torrent_from_magnet_leaves_torrent_idle_until_metadata() {
        let engine = InMemoryTorrentEngine::new(EngineLimits::default());
        engine.start().await.unwrap();
        let uri = format!("magnet:?xt=urn:btih:{}", "c".repeat(40));
        let ih = engine
            .add_torrent_from_magnet(&uri, &PathBuf::from("/tmp"))
            .await
            .unwrap();
        assert_eq!(engine.status(&ih).await.unwrap().state, TorrentState::Idle);
        assert!(engine.wait_for_metadata(&ih, Duration::from_millis(1)).await.is_err());
    }
}
