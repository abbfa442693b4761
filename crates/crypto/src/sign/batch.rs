//! A CPU-parallel `BatchVerifier` for the single suite this protocol uses.
//!
//! The Name-Index aggregator (§4.5) verifies every publisher entry in a
//! record independently; for records near the soft 300-entry prune bound
//! that is enough signatures to be worth spreading across cores rather than
//! checking one at a time.

use crate::error::CryptoError;
use crate::sign::eddsa::{Ed25519PublicKey, Ed25519Signature};
use libreseed_api::crypto::{BatchVerifier, SerializableKey, VerifyingKey};
use rayon::prelude::*;

/// A [`BatchVerifier`] that checks each `(pubkey, message, signature)` triple
/// on a Rayon thread, returning one boolean per input in input order.
#[derive(Default, Debug)]
pub struct CpuBatchVerifier;

impl CpuBatchVerifier {
    /// Creates a new batch verifier.
    pub fn new() -> Self {
        Self
    }

    fn verify_one(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
        let Ok(pk) = Ed25519PublicKey::from_bytes(public_key) else {
            return false;
        };
        let Ok(sig) = Ed25519Signature::from_bytes(signature) else {
            return false;
        };
        pk.verify(message, &sig).is_ok()
    }
}

impl BatchVerifier for CpuBatchVerifier {
    fn verify_batch(&self, items: &[(&[u8], &[u8], &[u8])]) -> Result<Vec<bool>, CryptoError> {
        Ok(items
            .par_iter()
            .map(|(pk, msg, sig)| Self::verify_one(pk, msg, sig))
            .collect())
    }
}
