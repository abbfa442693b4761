//! Canonical JSON encoding for record signing payloads (§4.1).
//!
//! Every signing payload is an explicit, fixed field list — never "the whole
//! struct minus `signature`" by accident — serialized through `serde_json`'s
//! default `Map`, which this workspace relies on being a `BTreeMap` (the
//! `preserve_order` feature is never enabled anywhere in the workspace) so
//! object keys come out lexicographically sorted at every depth for free.
//! Every producer and verifier MUST go through [`to_canonical_bytes`] (or
//! [`to_canonical_bytes_without_signature`]) for a signing payload; never
//! `serde_json::to_vec` on a record struct directly, since a record struct
//! generally carries more fields than its signing payload.

use crate::error::CryptoError;
use serde::Serialize;
use serde_json::Value;

/// Serializes `value` to its canonical byte form: UTF-8, sorted object keys,
/// no insignificant whitespace.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CryptoError> {
    let v = serde_json::to_value(value).map_err(|e| CryptoError::EncodeError(e.to_string()))?;
    serde_json::to_vec(&v).map_err(|e| CryptoError::EncodeError(e.to_string()))
}

/// Serializes `value` canonically with its top-level `signature` field
/// removed, for the signing payloads that sign "the whole document minus
/// `signature`" (Publisher Announce, Seeder Status — §4.1).
pub fn to_canonical_bytes_without_signature<T: Serialize>(
    value: &T,
) -> Result<Vec<u8>, CryptoError> {
    let mut v = serde_json::to_value(value).map_err(|e| CryptoError::EncodeError(e.to_string()))?;
    if let Value::Object(map) = &mut v {
        map.remove("signature");
    }
    serde_json::to_vec(&v).map_err(|e| CryptoError::EncodeError(e.to_string()))
}

/// Base64 (standard alphabet, padded) codec, used for `ed25519:<base64>`
/// tagged fields and the bare `seederID` field.
pub mod base64_codec {
    use crate::error::CryptoError;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    /// Encodes `bytes` as standard, padded base64.
    pub fn encode(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    /// Decodes a standard, padded base64 string.
    pub fn decode(s: &str) -> Result<Vec<u8>, CryptoError> {
        STANDARD
            .decode(s)
            .map_err(|e| CryptoError::EncodeError(format!("base64 decode: {e}")))
    }
}

/// Lowercase hex codec, used for `sha256:<hex>` tagged fields and bare
/// `infohash`/`contentHash` values.
pub mod hex_codec {
    use crate::error::CryptoError;

    /// Encodes `bytes` as lowercase hex.
    pub fn encode(bytes: &[u8]) -> String {
        hex::encode(bytes)
    }

    /// Decodes a hex string, rejecting uppercase digits and odd lengths.
    pub fn decode(s: &str) -> Result<Vec<u8>, CryptoError> {
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) || s.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(CryptoError::EncodeError(format!(
                "not lowercase hex: {s}"
            )));
        }
        hex::decode(s).map_err(|e| CryptoError::EncodeError(format!("hex decode: {e}")))
    }
}

/// The `"sha256:"` tag prefix used throughout the record model.
pub const SHA256_TAG: &str = "sha256:";
/// The `"ed25519:"` tag prefix used throughout the record model.
pub const ED25519_TAG: &str = "ed25519:";

/// Formats a raw digest as a tagged `"sha256:<hex>"` string.
pub fn tag_sha256(digest: &[u8]) -> String {
    format!("{SHA256_TAG}{}", hex_codec::encode(digest))
}

/// Parses a tagged `"sha256:<hex>"` string back to raw bytes.
pub fn untag_sha256(s: &str) -> Result<Vec<u8>, CryptoError> {
    let hex_part = s
        .strip_prefix(SHA256_TAG)
        .ok_or_else(|| CryptoError::EncodeError(format!("expected {SHA256_TAG} prefix: {s}")))?;
    hex_codec::decode(hex_part)
}

/// Formats raw bytes as a tagged `"ed25519:<base64>"` string.
pub fn tag_ed25519(bytes: &[u8]) -> String {
    format!("{ED25519_TAG}{}", base64_codec::encode(bytes))
}

/// Parses a tagged `"ed25519:<base64>"` string back to raw bytes.
pub fn untag_ed25519(s: &str) -> Result<Vec<u8>, CryptoError> {
    let b64_part = s
        .strip_prefix(ED25519_TAG)
        .ok_or_else(|| CryptoError::EncodeError(format!("expected {ED25519_TAG} prefix: {s}")))?;
    base64_codec::decode(b64_part)
}
