//! Ed25519 signing and verification over `dcrypt`, the sole signature suite
//! used by the protocol (§4.1): the Identity Keypair signs Publisher
//! Announce and Name Index entries, the Release Keypair signs manifests.

use crate::error::CryptoError;
use dcrypt::api::Signature as SignatureTrait;
use dcrypt::sign::eddsa;
use libreseed_api::crypto::{SerializableKey, Signature, SigningKey, SigningKeyPair, VerifyingKey};
use rand::rngs::OsRng;

/// An Ed25519 key pair.
#[derive(Clone)]
pub struct Ed25519KeyPair {
    public_key: eddsa::Ed25519PublicKey,
    secret_key: eddsa::Ed25519SecretKey,
}

/// An Ed25519 signature.
pub struct Ed25519Signature(eddsa::Ed25519Signature);

/// An Ed25519 public (verification) key.
pub struct Ed25519PublicKey(eddsa::Ed25519PublicKey);

/// An Ed25519 private (signing) key.
pub struct Ed25519PrivateKey(eddsa::Ed25519SecretKey);

impl Ed25519KeyPair {
    /// Generates a new random Ed25519 key pair.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut rng = OsRng;
        let (public_key, secret_key) = eddsa::Ed25519::keypair(&mut rng)
            .map_err(|e| CryptoError::OperationFailed(format!("keygen: {e:?}")))?;
        Ok(Self {
            public_key,
            secret_key,
        })
    }

    /// Reconstructs a full key pair from just the private key, deriving the
    /// public key.
    pub fn from_private_key(private_key: &Ed25519PrivateKey) -> Result<Self, CryptoError> {
        let secret_key = private_key.0.clone();
        let public_key = secret_key
            .public_key()
            .map_err(|e| CryptoError::OperationFailed(format!("derive pubkey: {e:?}")))?;
        Ok(Self {
            public_key,
            secret_key,
        })
    }
}

impl SigningKeyPair for Ed25519KeyPair {
    type PublicKey = Ed25519PublicKey;
    type PrivateKey = Ed25519PrivateKey;
    type Signature = Ed25519Signature;

    fn public_key(&self) -> Self::PublicKey {
        Ed25519PublicKey(self.public_key.clone())
    }

    fn private_key(&self) -> Self::PrivateKey {
        Ed25519PrivateKey(self.secret_key.clone())
    }

    fn sign(&self, message: &[u8]) -> Result<Self::Signature, CryptoError> {
        let signature = eddsa::Ed25519::sign(message, &self.secret_key)
            .map_err(|e| CryptoError::OperationFailed(format!("sign: {e:?}")))?;
        Ok(Ed25519Signature(signature))
    }
}

impl VerifyingKey for Ed25519PublicKey {
    type Signature = Ed25519Signature;

    fn verify(&self, message: &[u8], signature: &Self::Signature) -> Result<(), CryptoError> {
        eddsa::Ed25519::verify(message, &signature.0, &self.0).map_err(|_| CryptoError::VerifyFailed)
    }
}

impl SerializableKey for Ed25519PublicKey {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                got: bytes.len(),
            });
        }
        eddsa::Ed25519PublicKey::from_bytes(bytes)
            .map(Ed25519PublicKey)
            .map_err(|e| CryptoError::OperationFailed(format!("parse pubkey: {e:?}")))
    }
}

impl SigningKey for Ed25519PrivateKey {
    type Signature = Ed25519Signature;

    fn sign(&self, message: &[u8]) -> Result<Self::Signature, CryptoError> {
        let signature = eddsa::Ed25519::sign(message, &self.0)
            .map_err(|e| CryptoError::OperationFailed(format!("sign: {e:?}")))?;
        Ok(Ed25519Signature(signature))
    }
}

impl SerializableKey for Ed25519PrivateKey {
    fn to_bytes(&self) -> Vec<u8> {
        // Export just the 32-byte seed; dcrypt derives the rest on load.
        self.0.seed().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                got: bytes.len(),
            });
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(bytes);
        eddsa::Ed25519SecretKey::from_seed(&seed)
            .map(Ed25519PrivateKey)
            .map_err(|e| CryptoError::OperationFailed(format!("load seed: {e:?}")))
    }
}

impl SerializableKey for Ed25519Signature {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 64 {
            return Err(CryptoError::InvalidSignatureLength {
                expected: 64,
                got: bytes.len(),
            });
        }
        eddsa::Ed25519Signature::from_bytes(bytes)
            .map(Ed25519Signature)
            .map_err(|e| CryptoError::OperationFailed(format!("parse signature: {e:?}")))
    }
}

impl Signature for Ed25519Signature {}

impl Ed25519PrivateKey {
    /// Derives the public key corresponding to this private key.
    pub fn public_key(&self) -> Result<Ed25519PublicKey, CryptoError> {
        self.0
            .public_key()
            .map(Ed25519PublicKey)
            .map_err(|e| CryptoError::OperationFailed(format!("derive pubkey: {e:?}")))
    }
}

#[cfg(test)]
mod tests;
