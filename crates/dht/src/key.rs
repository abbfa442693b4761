//! DHT key derivation (§4.4, §6).
//!
//! Every key is the 20-byte prefix of `SHA-256(structured-string)`, where the
//! structured string is an ASCII literal built from typed inputs per the
//! table in §4.4. Two independent implementations given the same structured
//! inputs MUST produce byte-identical keys.

use libreseed_api::dht::DhtKey;
use libreseed_crypto::algorithms::hash::sha256;
use libreseed_crypto::canonical;
use libreseed_crypto::error::CryptoError;

fn truncate(structured: &str) -> Result<DhtKey, CryptoError> {
    let digest = sha256(structured.as_bytes())?;
    let mut key = [0u8; 20];
    key.copy_from_slice(&digest[..20]);
    Ok(key)
}

/// Derives the DHT key for a Minimal Manifest: `"libreseed:manifest:" + name
/// + "@" + version`.
pub fn manifest_key(name: &str, version: &str) -> Result<DhtKey, CryptoError> {
    truncate(&format!("libreseed:manifest:{name}@{version}"))
}

/// Derives the DHT key for a Name Index: `"libreseed:name-index:" + name`.
pub fn name_index_key(name: &str) -> Result<DhtKey, CryptoError> {
    truncate(&format!("libreseed:name-index:{name}"))
}

/// Derives the DHT key for a Publisher Announce: `"libreseed:announce:" +
/// base64(pubkey)`.
pub fn announce_key(pubkey: &[u8]) -> Result<DhtKey, CryptoError> {
    truncate(&format!(
        "libreseed:announce:{}",
        canonical::base64_codec::encode(pubkey)
    ))
}

/// Derives the DHT key for a Seeder Status: `"libreseed:seeder:" +
/// seederID`, where `seederID` is already `base64(SHA-256(seeder pubkey))`.
pub fn seeder_key(seeder_id: &str) -> Result<DhtKey, CryptoError> {
    truncate(&format!("libreseed:seeder:{seeder_id}"))
}

/// Renders a [`DhtKey`] as lowercase hex, for logging and the Publisher
/// Announce's `manifestKey` field (§6).
pub fn to_hex(key: &DhtKey) -> String {
    canonical::hex_codec::encode(key)
}
