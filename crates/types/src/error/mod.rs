//! The error taxonomy of protocol spec §7.
//!
//! Each family of errors is its own `thiserror` enum rather than one giant
//! enum, so call sites can match narrowly and `?` can convert with `#[from]`
//! where a containing error legitimately wraps a lower one. Every enum also
//! implements [`ErrorCode`], giving it a stable string identifier that
//! survives message-text changes — useful for a blacklist key, a metrics
//! label, or a user-facing "reason" field, none of which should break when
//! someone rewords a `#[error(...)]` string.

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Validation errors: a record failed its own structural checks (§4.2).
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The record did not match its expected JSON schema/shape.
    #[error("schema invalid: {0}")]
    SchemaInvalid(String),
    /// A required field was absent.
    #[error("field missing: {0}")]
    FieldMissing(&'static str),
    /// A field exceeded its documented size ceiling.
    #[error("field too long: {field} ({got} > {max} bytes)")]
    FieldTooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Its encoded length.
        got: usize,
        /// The ceiling it exceeded.
        max: usize,
    },
    /// A field failed a format check (semver, hex, base64, ...).
    #[error("field format invalid: {field}: {reason}")]
    FieldFormat {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// A timestamp field was zero or otherwise non-sensical.
    #[error("invalid timestamp for field: {0}")]
    InvalidTimestamp(&'static str),
}

impl ErrorCode for ValidationError {
    fn code(&self) -> &'static str {
        match self {
            Self::SchemaInvalid(_) => "VALIDATION_SCHEMA_INVALID",
            Self::FieldMissing(_) => "VALIDATION_FIELD_MISSING",
            Self::FieldTooLong { .. } => "VALIDATION_FIELD_TOO_LONG",
            Self::FieldFormat { .. } => "VALIDATION_FIELD_FORMAT",
            Self::InvalidTimestamp(_) => "VALIDATION_INVALID_TIMESTAMP",
        }
    }
}

/// Cryptographic errors: key handling, signing, verification, hashing (§4.1).
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A key did not decode to its expected byte length.
    #[error("invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        got: usize,
    },
    /// A signature did not decode to its expected byte length.
    #[error("invalid signature length: expected {expected}, got {got}")]
    InvalidSignatureLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        got: usize,
    },
    /// Signature verification failed cryptographically.
    #[error("signature verification failed")]
    VerifyFailed,
    /// A public key did not match the expected one for this record pair.
    #[error("pubkey mismatch: expected {expected}, got {got}")]
    PubkeyMismatch {
        /// Expected pubkey, as configured per-field encoding.
        expected: String,
        /// Actual pubkey found on the record.
        got: String,
    },
    /// The recomputed `contentHash` did not match the declared one.
    #[error("content hash mismatch: expected {expected}, got {got}")]
    ContentHashMismatch {
        /// Declared content hash.
        expected: String,
        /// Recomputed content hash.
        got: String,
    },
    /// The recomputed tarball `infohash` did not match the resolved one.
    #[error("infohash mismatch: expected {expected}, got {got}")]
    InfohashMismatch {
        /// Resolved (trusted) infohash.
        expected: String,
        /// Recomputed infohash of the downloaded bytes.
        got: String,
    },
    /// Encoding to canonical bytes failed (should not happen for well-formed records).
    #[error("encode error: {0}")]
    EncodeError(String),
    /// A lower-level cryptographic operation failed.
    #[error("crypto operation failed: {0}")]
    OperationFailed(String),
}

impl ErrorCode for CryptoError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidKeyLength { .. } => "CRYPTO_INVALID_KEY_LENGTH",
            Self::InvalidSignatureLength { .. } => "CRYPTO_INVALID_SIGNATURE_LENGTH",
            Self::VerifyFailed => "CRYPTO_VERIFY_FAILED",
            Self::PubkeyMismatch { .. } => "CRYPTO_PUBKEY_MISMATCH",
            Self::ContentHashMismatch { .. } => "CRYPTO_CONTENT_HASH_MISMATCH",
            Self::InfohashMismatch { .. } => "CRYPTO_INFOHASH_MISMATCH",
            Self::EncodeError(_) => "CRYPTO_ENCODE_ERROR",
            Self::OperationFailed(_) => "CRYPTO_OPERATION_FAILED",
        }
    }
}

/// Discovery errors: the thing being looked up does not exist or has no
/// valid publishers (§4.5, §4.6).
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// No Name Index record exists for the requested package name.
    #[error("name index not found for {0}")]
    NameIndexNotFound(String),
    /// A Name Index was found but every entry failed signature verification.
    #[error("no valid publishers for {0}")]
    NoValidPublishers(String),
    /// No Publisher Announce record exists for the requested pubkey.
    #[error("announce not found for publisher {0}")]
    AnnounceNotFound(String),
    /// The announce exists but lists nothing for the requested package name.
    #[error("package {name} not found in announce for {pubkey}")]
    PackageNotFound {
        /// Requested package name.
        name: String,
        /// Publisher's pubkey.
        pubkey: String,
    },
    /// No listed version satisfies the requested semver range.
    #[error("no version satisfies {range} for {name}")]
    NoVersionSatisfies {
        /// Package name.
        name: String,
        /// The requested range.
        range: String,
    },
    /// No Minimal Manifest exists at the derived key.
    #[error("manifest not found for {name}@{version}")]
    ManifestNotFound {
        /// Package name.
        name: String,
        /// Package version.
        version: String,
    },
}

impl ErrorCode for DiscoveryError {
    fn code(&self) -> &'static str {
        match self {
            Self::NameIndexNotFound(_) => "DISCOVERY_NAME_INDEX_NOT_FOUND",
            Self::NoValidPublishers(_) => "DISCOVERY_NO_VALID_PUBLISHERS",
            Self::AnnounceNotFound(_) => "DISCOVERY_ANNOUNCE_NOT_FOUND",
            Self::PackageNotFound { .. } => "DISCOVERY_PACKAGE_NOT_FOUND",
            Self::NoVersionSatisfies { .. } => "DISCOVERY_NO_VERSION_SATISFIES",
            Self::ManifestNotFound { .. } => "DISCOVERY_MANIFEST_NOT_FOUND",
        }
    }
}

/// Transport errors: the DHT or torrent swarm could not be reached in time (§4.4, §4.7).
#[derive(Debug, Error)]
pub enum TransportError {
    /// A DHT GET/PUT did not complete before its deadline.
    #[error("dht operation timed out after {0:?}")]
    DhtTimeout(std::time::Duration),
    /// A DHT PUT failed for a reason other than timeout.
    #[error("dht store failed: {0}")]
    DhtStoreFailed(String),
    /// The torrent swarm could not be reached (no peers, tracker/DHT bootstrap failed).
    #[error("torrent swarm unreachable: {0}")]
    TorrentUnreachable(String),
    /// Waiting for torrent metadata (from an infohash-only add) exceeded its deadline.
    #[error("metadata fetch timed out after {0:?}")]
    MetadataTimeout(std::time::Duration),
}

impl ErrorCode for TransportError {
    fn code(&self) -> &'static str {
        match self {
            Self::DhtTimeout(_) => "TRANSPORT_DHT_TIMEOUT",
            Self::DhtStoreFailed(_) => "TRANSPORT_DHT_STORE_FAILED",
            Self::TorrentUnreachable(_) => "TRANSPORT_TORRENT_UNREACHABLE",
            Self::MetadataTimeout(_) => "TRANSPORT_METADATA_TIMEOUT",
        }
    }
}

/// Torrent-engine lifecycle/usage errors (§4.7).
#[derive(Debug, Error)]
pub enum EngineError {
    /// An operation was attempted while the engine was not in the `running` state.
    #[error("torrent engine is not started")]
    EngineNotStarted,
    /// `add_torrent` was called with an infohash already tracked by the engine.
    #[error("torrent already exists: {0}")]
    TorrentExists(String),
    /// An operation referenced an infohash the engine is not tracking.
    #[error("torrent not found: {0}")]
    TorrentNotFound(String),
    /// Adding a torrent would exceed the configured `max_active_torrents`.
    #[error("maximum active torrent count reached ({0})")]
    MaxTorrentsReached(usize),
    /// An infohash string was not exactly 40 hex characters.
    #[error("invalid infohash: {0}")]
    InvalidInfoHash(String),
    /// A `.torrent` file failed to parse as valid bencoded metainfo.
    #[error("invalid torrent file: {0}")]
    InvalidTorrentFile(String),
    /// A magnet link failed to parse.
    #[error("invalid magnet link: {0}")]
    InvalidMagnetLink(String),
}

impl ErrorCode for EngineError {
    fn code(&self) -> &'static str {
        match self {
            Self::EngineNotStarted => "ENGINE_NOT_STARTED",
            Self::TorrentExists(_) => "ENGINE_TORRENT_EXISTS",
            Self::TorrentNotFound(_) => "ENGINE_TORRENT_NOT_FOUND",
            Self::MaxTorrentsReached(_) => "ENGINE_MAX_TORRENTS_REACHED",
            Self::InvalidInfoHash(_) => "ENGINE_INVALID_INFOHASH",
            Self::InvalidTorrentFile(_) => "ENGINE_INVALID_TORRENT_FILE",
            Self::InvalidMagnetLink(_) => "ENGINE_INVALID_MAGNET_LINK",
        }
    }
}

/// The umbrella error returned by the resolver's public entry points: a
/// resolution attempt can fail at a validation, crypto, discovery, transport,
/// or engine step, and callers generally want to match on "what kind of
/// failure" before drilling into the specific variant.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A record failed structural validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A cryptographic check failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    /// The requested name/publisher/version could not be found.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    /// A network call to the DHT or torrent swarm failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The torrent engine rejected the operation.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ErrorCode for CoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.code(),
            Self::Crypto(e) => e.code(),
            Self::Discovery(e) => e.code(),
            Self::Transport(e) => e.code(),
            Self::Engine(e) => e.code(),
        }
    }
}

impl CoreError {
    /// Whether this error represents a transient condition (§4.6, §7) that
    /// the retry controller should retry with backoff rather than treat as
    /// immediately fatal for the `(pubkey, name, version)` in play.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CoreError::Discovery(
                DiscoveryError::NameIndexNotFound(_)
                    | DiscoveryError::AnnounceNotFound(_)
                    | DiscoveryError::ManifestNotFound { .. }
            ) | CoreError::Transport(_)
        )
    }
}
