//! Unified traits for cryptographic primitives: signing keys, verification,
//! and batch signature verification (§4.1).

use libreseed_types::error::CryptoError;

/// A trait for any key that can be serialized to and from bytes.
pub trait SerializableKey {
    /// Converts the key to a byte vector.
    fn to_bytes(&self) -> Vec<u8>;

    /// Creates a key from a byte slice.
    fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError>
    where
        Self: Sized;
}

/// A trait for a key pair used in a signature algorithm.
pub trait SigningKeyPair {
    /// The public key type used for verification.
    type PublicKey: VerifyingKey<Signature = Self::Signature>;
    /// The private key type used for signing.
    type PrivateKey: SigningKey<Signature = Self::Signature>;
    /// The signature type produced.
    type Signature: Signature;

    /// Gets the public key.
    fn public_key(&self) -> Self::PublicKey;
    /// Gets the private key.
    fn private_key(&self) -> Self::PrivateKey;
    /// Signs a message with the private key.
    fn sign(&self, message: &[u8]) -> Result<Self::Signature, CryptoError>;
}

/// A trait for a public key used for signature verification.
pub trait VerifyingKey: SerializableKey {
    /// The signature type that this key can verify.
    type Signature: Signature;
    /// Verifies a signature against a message.
    fn verify(&self, message: &[u8], signature: &Self::Signature) -> Result<(), CryptoError>;
}

/// A trait for a private key used for signing operations.
pub trait SigningKey: SerializableKey {
    /// The signature type that this key produces.
    type Signature: Signature;
    /// Signs a message.
    fn sign(&self, message: &[u8]) -> Result<Self::Signature, CryptoError>;
}

/// A marker trait for a cryptographic signature.
pub trait Signature: SerializableKey {}

/// A trait for parallelized batch signature verification, used by the Name
/// Index aggregator when checking many publisher entries at once (§4.5).
pub trait BatchVerifier: Send + Sync {
    /// Verifies a batch of Ed25519 signatures.
    ///
    /// # Arguments
    /// * `items`: A slice of tuples containing `(public_key, message, signature)`.
    ///
    /// # Returns
    /// A vector of booleans indicating the validity of each item in the batch.
    /// The order corresponds to the input slice.
    fn verify_batch(&self, items: &[(&[u8], &[u8], &[u8])]) -> Result<Vec<bool>, CryptoError>;
}
