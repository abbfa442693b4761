//! Magnet URI parsing for the "add by magnet link" path of §4.7.
//!
//! Only the `xt` (exact topic) parameter is consulted; `dn`, `tr`, and other
//! parameters are accepted but ignored since this engine discovers peers
//! through the swarm rather than embedded tracker URLs.

use libreseed_types::error::EngineError;

const BTIH_PREFIX: &str = "urn:btih:";

/// Extracts the 40-hex infohash from a magnet URI's `xt=urn:btih:<hex>`
/// parameter. Fails with [`EngineError::InvalidMagnetLink`] if the URI is
/// not a `magnet:` URI or carries no BitTorrent infohash topic.
pub fn parse_magnet_infohash(magnet_uri: &str) -> Result<String, EngineError> {
    let query = magnet_uri
        .strip_prefix("magnet:?")
        .ok_or_else(|| EngineError::InvalidMagnetLink(magnet_uri.to_string()))?;

    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        if key != "xt" {
            continue;
        }
        let decoded = percent_decode(value);
        if let Some(hex) = decoded.strip_prefix(BTIH_PREFIX) {
            let hex = hex.to_lowercase();
            if hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Ok(hex);
            }
        }
    }

    Err(EngineError::InvalidMagnetLink(magnet_uri.to_string()))
}

/// Minimal percent-decoder sufficient for the ASCII `xt` parameter; magnet
/// URIs don't percent-encode the hex infohash itself in practice, but `dn`
/// and other parameters often do, so this keeps `split('&')` honest.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
