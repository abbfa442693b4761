//! The `contentHash` and tarball `infohash` algorithms (§4.3).

use libreseed_crypto::algorithms::hash::sha256;
use libreseed_crypto::canonical;
use libreseed_crypto::error::CryptoError;
use std::collections::BTreeMap;

/// Computes `contentHash` over a `files` map of tarball-relative path to
/// `"sha256:<hex>"` per-file hash (§4.3):
///
/// 1. Sort the set of paths in lexicographic byte order — a [`BTreeMap`] key
///    already iterates in this order, so callers passing one get this for
///    free.
/// 2. For each path in that order, decode its hex hash to 32 raw bytes and
///    append to an accumulator buffer.
/// 3. Return `"sha256:" + hex(SHA-256(accumulator))`.
///
/// Deterministic and input-order-independent: the result depends only on the
/// *set* of `(path, hash)` pairs, never on the order they were inserted into
/// `files`, because the sort in step 1 is by path, not by insertion order.
pub fn compute_content_hash(files: &BTreeMap<String, String>) -> Result<String, CryptoError> {
    let mut accumulator = Vec::with_capacity(files.len() * 32);
    for hash in files.values() {
        let raw = canonical::untag_sha256(hash)?;
        accumulator.extend_from_slice(&raw);
    }
    let digest = sha256(&accumulator)?;
    Ok(canonical::tag_sha256(&digest))
}

/// Computes the tarball `infohash`: `SHA-256` of the entire `.tgz` byte
/// stream (§4.3). Signing this value binds the packager to the exact bytes
/// later distributed over BitTorrent.
pub fn compute_infohash(tarball_bytes: &[u8]) -> Result<String, CryptoError> {
    let digest = sha256(tarball_bytes)?;
    Ok(canonical::tag_sha256(&digest))
}
