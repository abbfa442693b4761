#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # LibreSeed Types
//!
//! Foundational crate for the LibreSeed protocol engine: the error taxonomy
//! (§7 of the protocol spec) and the handful of constants and small enums
//! every other core crate shares.
//!
//! ## Architectural role
//!
//! As the base crate, `libreseed-types` has minimal dependencies and is a
//! dependency of almost every other crate in the workspace. This mirrors the
//! role the teacher's `ioi-types` plays for the IOI Kernel: a stable,
//! canonical definition for shared error enums that every other crate
//! converts into with `#[from]`/`From` impls rather than redefining.

/// The protocol identifier embedded in every record's `protocol` field.
pub const PROTOCOL_ID: &str = "libreseed/1";
/// The maximum length in bytes of a package `name` field (§4.2).
pub const MAX_NAME_LEN: usize = 64;
/// The maximum length in bytes of a `version` field (§4.2).
pub const MAX_VERSION_LEN: usize = 32;
/// Length in raw bytes of an Ed25519 public key.
pub const PUBKEY_LEN: usize = 32;
/// Length in raw bytes of an Ed25519 signature.
pub const SIGNATURE_LEN: usize = 64;
/// Length in raw bytes of a SHA-256 digest.
pub const SHA256_LEN: usize = 32;
/// Default DHT re-announce interval (§4.4): 22 hours.
pub const REANNOUNCE_INTERVAL_SECS: u64 = 22 * 60 * 60;
/// Backoff applied before the next re-announce attempt after a failed PUT (§4.4).
pub const REANNOUNCE_RETRY_SECS: u64 = 60 * 60;
/// Default DHT fetch timeout (§4.4).
pub const DHT_FETCH_TIMEOUT_SECS: u64 = 30;
/// Maximum consecutive transient-failure retries before blacklisting (§4.6).
pub const MAX_RETRY_ATTEMPTS: u32 = 10;
/// Base delay for the exponential backoff schedule (§4.6).
pub const RETRY_BASE_DELAY_SECS: u64 = 1;
/// Cap on the exponential backoff delay (§4.6).
pub const RETRY_MAX_DELAY_SECS: u64 = 60;
/// Soft bound on locally cached Name Index entries (§4.5).
pub const NAME_INDEX_SOFT_PRUNE_BOUND: usize = 300;

/// A crate-wide `Result` alias; most call sites use a more specific error
/// enum but this is convenient at API boundaries that return `CoreError`.
pub type Result<T, E = crate::error::CoreError> = std::result::Result<T, E>;

/// The error taxonomy of spec §7, plus the `ErrorCode` trait used to give
/// every variant a stable, machine-readable string identifier.
pub mod error;

/// Publisher selection policies for `resolve_by_name` (§4.6).
pub mod policy;
