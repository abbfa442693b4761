//! `.torrent` metainfo parsing (§4.7 "add by metainfo"), typed bencode
//! structs in the style of the pack's `bedit-torrent` crate rather than a
//! hand-rolled bencode reader.
//!
//! The protocol's own infohash namespace is a tagged SHA-256 over a whole
//! tarball (§4.3), not BEP-0003's SHA-1 over the bencoded `info` dict. Rather
//! than compute a second, BitTorrent-standard infohash this engine derives
//! the swarm identifier the same way `libreseed-resolver` does for a
//! protocol infohash: the first 20 bytes of `SHA-256(metainfo bytes)`, hex
//! encoded. Two engines fed the same `.torrent` bytes derive the same
//! infohash; that is the only property this adapter's callers rely on.

use libreseed_crypto::algorithms::hash::sha256;
use libreseed_crypto::canonical::hex_codec;
use libreseed_types::error::EngineError;
use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;
use std::collections::BTreeMap;

/// A single file entry within a multi-file torrent's `info` dict.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileEntry {
    /// Length of this file in bytes.
    pub length: u64,
    /// Path components; the last element is the file name.
    pub path: Vec<String>,
}

/// The `info` dictionary of a `.torrent` file (BEP-0003).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Info {
    /// Suggested file or directory name.
    pub name: String,
    /// Bytes per piece.
    #[serde(rename = "piece length")]
    pub piece_length: u64,
    /// Concatenated 20-byte SHA-1 piece hashes.
    pub pieces: ByteBuf,
    /// Single-file torrent length, if this is not a multi-file torrent.
    #[serde(default)]
    pub length: Option<u64>,
    /// Multi-file torrent's file list, if this is not a single-file torrent.
    #[serde(default)]
    pub files: Option<Vec<FileEntry>>,
}

/// A parsed `.torrent` file (BEP-0003), trimmed to the fields this engine
/// actually consults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Metainfo {
    /// Primary tracker URL, if any (DHT-only torrents may omit it).
    #[serde(default)]
    pub announce: Option<String>,
    /// The file/piece description this infohash is derived from.
    pub info: Info,
}

impl Metainfo {
    /// Returns the total content size across all files described by `info`.
    pub fn total_size(&self) -> u64 {
        match (&self.info.length, &self.info.files) {
            (Some(len), _) => *len,
            (None, Some(files)) => files.iter().map(|f| f.length).sum(),
            (None, None) => 0,
        }
    }
}

/// Parses raw `.torrent` bytes and derives this engine's infohash for it.
/// Fails with [`EngineError::InvalidTorrentFile`] on malformed bencode.
pub fn parse_torrent_file(bytes: &[u8]) -> Result<(Metainfo, String), EngineError> {
    let metainfo: Metainfo = serde_bencode::from_bytes(bytes)
        .map_err(|e| EngineError::InvalidTorrentFile(e.to_string()))?;
    let digest = sha256(bytes).map_err(|e| EngineError::InvalidTorrentFile(e.to_string()))?;
    let infohash = hex_codec::encode(&digest[..20]);
    Ok((metainfo, infohash))
}

/// Validates that `infohash` is exactly 40 lowercase hex characters (§4.7).
pub fn validate_infohash(infohash: &str) -> Result<(), EngineError> {
    if infohash.len() != 40
        || !infohash
            .bytes()
            .all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
    {
        return Err(EngineError::InvalidInfoHash(infohash.to_string()));
    }
    Ok(())
}

/// Builds a deterministic path-keyed view of `info`'s file list: joined
/// path components to declared length, collapsing a multi-file torrent down
/// to one entry per distinct path. Used by
/// [`crate::memory_engine::InMemoryTorrentEngine::add_torrent_from_metainfo`]
/// to reject a `.torrent` whose file list repeats a path — `BTreeMap`
/// insertion silently keeps the last entry, so comparing its length against
/// the raw file count is how a collision is detected.
pub fn files_by_path(info: &Info) -> BTreeMap<String, u64> {
    match &info.files {
        Some(files) => files
            .iter()
            .map(|f| (f.path.join("/"), f.length))
            .collect(),
        None => {
            let mut map = BTreeMap::new();
            if let Some(len) = info.length {
                map.insert(info.name.clone(), len);
            }
            map
        }
    }
}
