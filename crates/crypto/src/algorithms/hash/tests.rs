//! Tests for hash function implementations.

use super::{sha256, GenericHasher, HashFunction, Sha256Hash};

#[test]
fn test_sha256_hash() {
    let message = b"test message";
    let hasher = Sha256Hash;

    let digest = hasher.hash(message).unwrap();

    assert_eq!(digest.len(), hasher.digest_size());
    assert_eq!(hasher.digest_size(), 32);
    assert_eq!(hasher.hash(message).unwrap(), hasher.hash(message).unwrap());
}

#[test]
fn test_generic_hasher() {
    let message = b"test message";
    let hasher = GenericHasher::new(Sha256Hash);

    let digest = hasher.hash(message).unwrap();

    assert_eq!(digest.len(), hasher.digest_size());
    assert_eq!(hasher.digest_size(), 32);
}

#[test]
fn test_sha256_convenience_fn_matches_trait() {
    let message = b"another message";
    let via_fn = sha256(message).unwrap();
    let via_trait = Sha256Hash.hash(message).unwrap();
    assert_eq!(via_fn.to_vec(), via_trait);
}

#[test]
fn test_sha256_differs_on_different_input() {
    assert_ne!(sha256(b"a").unwrap(), sha256(b"b").unwrap());
}
