//! Cryptographic hash functions over `dcrypt`, used for content-hash (§4.3)
//! and manifest-reference digests.

use crate::error::CryptoError;
use dcrypt::algorithms::hash::sha2::Sha256 as DcryptSha256;
use dcrypt::algorithms::hash::HashFunction as DcryptHashFunction;
use dcrypt::algorithms::ByteSerializable;

/// A hash function that produces a variable-length digest from a message.
pub trait HashFunction {
    /// Hash a message and return the digest.
    fn hash(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Get the digest size in bytes.
    fn digest_size(&self) -> usize;

    /// Get the name of the hash function.
    fn name(&self) -> &str;
}

/// SHA-256 hash function implementation using `dcrypt`.
#[derive(Default, Clone)]
pub struct Sha256Hash;

impl HashFunction for Sha256Hash {
    fn hash(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let digest = DcryptSha256::digest(message)
            .map_err(|e| CryptoError::OperationFailed(format!("sha256: {e:?}")))?;
        Ok(digest.to_bytes())
    }

    fn digest_size(&self) -> usize {
        32
    }

    fn name(&self) -> &str {
        "SHA-256"
    }
}

/// A generic hasher wrapping any [`HashFunction`] implementation.
pub struct GenericHasher<H: HashFunction> {
    hash_function: H,
}

impl<H: HashFunction> GenericHasher<H> {
    /// Creates a new hasher with the given hash function.
    pub fn new(hash_function: H) -> Self {
        Self { hash_function }
    }

    /// Hashes a message.
    pub fn hash(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.hash_function.hash(message)
    }

    /// Gets the digest size in bytes.
    pub fn digest_size(&self) -> usize {
        self.hash_function.digest_size()
    }

    /// Gets the name of the hash function.
    pub fn name(&self) -> &str {
        self.hash_function.name()
    }
}

/// Computes the SHA-256 digest of any byte-referenceable value.
pub fn sha256<T: AsRef<[u8]>>(data: T) -> Result<[u8; 32], CryptoError> {
    let hasher = Sha256Hash;
    hasher
        .hash(data.as_ref())?
        .try_into()
        .map_err(|bytes: Vec<u8>| CryptoError::InvalidKeyLength {
            expected: 32,
            got: bytes.len(),
        })
}

#[cfg(test)]
mod tests;
