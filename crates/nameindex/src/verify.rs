//! Ed25519 verification glue between the record model's tagged string fields
//! and `libreseed-crypto`'s concrete key types.

use libreseed_api::crypto::{SerializableKey, VerifyingKey};
use libreseed_crypto::sign::eddsa::{Ed25519PublicKey, Ed25519Signature};

/// Verifies a raw `(pubkey, message, signature)` triple, returning `false`
/// (never panicking) on any decode or cryptographic failure.
pub fn verify_ed25519(pubkey: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let Ok(pk) = Ed25519PublicKey::from_bytes(pubkey) else {
        return false;
    };
    let Ok(sig) = Ed25519Signature::from_bytes(signature) else {
        return false;
    };
    pk.verify(message, &sig).is_ok()
}
