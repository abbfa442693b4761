//! A real [`TorrentEngine`] backed by [`librqbit`], the pack's chosen
//! BitTorrent implementation. Wraps a single `librqbit::Session` and tracks
//! one `librqbit` torrent handle per infohash this engine has been asked to
//! manage.

use crate::magnet::parse_magnet_infohash;
use crate::metainfo::{parse_torrent_file, validate_infohash};
use async_trait::async_trait;
use dashmap::DashMap;
use libreseed_api::torrent::{EngineLimits, EngineState, TorrentEngine, TorrentState, TorrentStatus};
use libreseed_types::error::EngineError;
use librqbit::{AddTorrent, AddTorrentOptions, AddTorrentResponse, Session, SessionOptions};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

const STOPPED: u8 = 0;
const RUNNING: u8 = 2;

struct Handle {
    managed: librqbit::ManagedTorrent,
    paused: bool,
}

/// A [`TorrentEngine`] that drives real BitTorrent swarms through
/// `librqbit`. `start`/`stop` create and tear down the underlying
/// `librqbit::Session`; all per-torrent state lives in `handles`.
pub struct LibrqbitTorrentEngine {
    state: AtomicU8,
    limits: EngineLimits,
    default_output_dir: PathBuf,
    session: RwLock<Option<Arc<Session>>>,
    handles: DashMap<String, Handle>,
    add_lock: Mutex<()>,
}

impl LibrqbitTorrentEngine {
    /// Creates a new, stopped engine. `default_output_dir` seeds
    /// `librqbit::Session`'s own output folder; per-call `download_dir`
    /// arguments override it on a per-torrent basis.
    pub fn new(default_output_dir: PathBuf, limits: EngineLimits) -> Self {
        Self {
            state: AtomicU8::new(STOPPED),
            limits,
            default_output_dir,
            session: RwLock::new(None),
            handles: DashMap::new(),
            add_lock: Mutex::new(()),
        }
    }

    async fn session(&self) -> Result<Arc<Session>, EngineError> {
        self.session
            .read()
            .await
            .clone()
            .ok_or(EngineError::EngineNotStarted)
    }

    fn require_running(&self) -> Result<(), EngineError> {
        if self.state.load(Ordering::SeqCst) != RUNNING {
            return Err(EngineError::EngineNotStarted);
        }
        Ok(())
    }

    async fn register(
        &self,
        infohash: String,
        download_dir: &PathBuf,
        source: AddTorrent<'_>,
    ) -> Result<(), EngineError> {
        self.require_running()?;
        let _guard = self.add_lock.lock().await;
        if self.handles.contains_key(&infohash) {
            return Err(EngineError::TorrentExists(infohash));
        }
        if self.handles.len() >= self.limits.max_active_torrents {
            return Err(EngineError::MaxTorrentsReached(self.limits.max_active_torrents));
        }
        let session = self.session().await?;
        let opts = AddTorrentOptions {
            output_folder: Some(download_dir.to_string_lossy().into_owned()),
            ..Default::default()
        };
        let response = session
            .add_torrent(source, Some(opts))
            .await
            .map_err(|e| EngineError::InvalidTorrentFile(e.to_string()))?;
        let managed = match response {
            AddTorrentResponse::Added(_, handle) => handle,
            AddTorrentResponse::AlreadyManaged(_, handle) => handle,
            AddTorrentResponse::ListOnly(_) => {
                return Err(EngineError::InvalidTorrentFile(
                    "torrent added in list-only mode".into(),
                ))
            }
        };
        self.handles.insert(
            infohash,
            Handle {
                managed,
                paused: false,
            },
        );
        Ok(())
    }
}

#[async_trait]
impl TorrentEngine for LibrqbitTorrentEngine {
    async fn start(&self) -> Result<(), EngineError> {
        if self.state.load(Ordering::SeqCst) == RUNNING {
            return Ok(());
        }
        let session = Session::new_with_opts(
            self.default_output_dir.clone(),
            SessionOptions::default(),
        )
        .await
        .map_err(|e| EngineError::InvalidTorrentFile(e.to_string()))?;
        *self.session.write().await = Some(session);
        self.state.store(RUNNING, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        if let Some(session) = self.session.write().await.take() {
            session.stop().await;
        }
        self.handles.clear();
        self.state.store(STOPPED, Ordering::SeqCst);
        Ok(())
    }

    fn state(&self) -> EngineState {
        match self.state.load(Ordering::SeqCst) {
            RUNNING => EngineState::Running,
            _ => EngineState::Stopped,
        }
    }

    async fn add_torrent(&self, infohash: &str, download_dir: &PathBuf) -> Result<(), EngineError> {
        validate_infohash(infohash)?;
        let magnet = format!("magnet:?xt=urn:btih:{infohash}");
        self.register(infohash.to_string(), download_dir, AddTorrent::from_url(&magnet))
            .await
    }

    async fn add_torrent_from_metainfo(
        &self,
        metainfo: &[u8],
        download_dir: &PathBuf,
    ) -> Result<String, EngineError> {
        let (_, infohash) = parse_torrent_file(metainfo)?;
        self.register(
            infohash.clone(),
            download_dir,
            AddTorrent::from_bytes(metainfo.to_vec()),
        )
        .await?;
        Ok(infohash)
    }

    async fn add_torrent_from_magnet(
        &self,
        magnet_uri: &str,
        download_dir: &PathBuf,
    ) -> Result<String, EngineError> {
        let infohash = parse_magnet_infohash(magnet_uri)?;
        self.register(
            infohash.clone(),
            download_dir,
            AddTorrent::from_url(magnet_uri),
        )
        .await?;
        Ok(infohash)
    }

    async fn wait_for_metadata(
        &self,
        infohash: &str,
        deadline: Duration,
    ) -> Result<(), EngineError> {
        let entry = self
            .handles
            .get(infohash)
            .ok_or_else(|| EngineError::TorrentNotFound(infohash.to_string()))?;
        tokio::time::timeout(deadline, entry.managed.wait_until_initialized())
            .await
            .map_err(|_| EngineError::TorrentNotFound(infohash.to_string()))?
            .map_err(|e| EngineError::InvalidTorrentFile(e.to_string()))
    }

    async fn pause_torrent(&self, infohash: &str) -> Result<(), EngineError> {
        let mut entry = self
            .handles
            .get_mut(infohash)
            .ok_or_else(|| EngineError::TorrentNotFound(infohash.to_string()))?;
        entry
            .managed
            .pause()
            .map_err(|e| EngineError::InvalidTorrentFile(e.to_string()))?;
        entry.paused = true;
        Ok(())
    }

    async fn resume_torrent(&self, infohash: &str) -> Result<(), EngineError> {
        let mut entry = self
            .handles
            .get_mut(infohash)
            .ok_or_else(|| EngineError::TorrentNotFound(infohash.to_string()))?;
        entry
            .managed
            .start(Default::default())
            .map_err(|e| EngineError::InvalidTorrentFile(e.to_string()))?;
        entry.paused = false;
        Ok(())
    }

    async fn reverify_torrent(&self, infohash: &str) -> Result<(), EngineError> {
        let entry = self
            .handles
            .get(infohash)
            .ok_or_else(|| EngineError::TorrentNotFound(infohash.to_string()))?;
        entry
            .managed
            .force_reload_torrent_metadata()
            .await
            .map_err(|e| EngineError::InvalidTorrentFile(e.to_string()))
    }

    async fn remove_torrent(&self, infohash: &str, delete_data: bool) -> Result<(), EngineError> {
        let session = self.session().await?;
        let (_, handle) = self
            .handles
            .remove(infohash)
            .ok_or_else(|| EngineError::TorrentNotFound(infohash.to_string()))?;
        session
            .delete(handle.managed.into(), delete_data)
            .await
            .map_err(|e| EngineError::InvalidTorrentFile(e.to_string()))
    }

    async fn status(&self, infohash: &str) -> Result<TorrentStatus, EngineError> {
        let entry = self
            .handles
            .get(infohash)
            .ok_or_else(|| EngineError::TorrentNotFound(infohash.to_string()))?;
        let stats = entry.managed.stats();
        let state = if entry.paused {
            TorrentState::Paused
        } else if stats.finished {
            TorrentState::Seeding
        } else {
            TorrentState::Downloading
        };
        Ok(TorrentStatus {
            infohash: infohash.to_string(),
            state,
            downloaded_bytes: stats.progress_bytes,
            uploaded_bytes: stats.uploaded_bytes,
            total_bytes: stats.total_bytes,
            peer_count: stats.live_peers as usize,
            is_complete: stats.finished,
        })
    }
}
