//! At-rest, passphrase-encrypted storage for the Identity Keypair (§3, §9).
//!
//! The protocol has no key-revocation mechanism: a stolen private key is an
//! unrecoverable compromise, mitigated only by the publisher migrating to a
//! fresh identity. That makes "never leave the packager host" (§3) a much
//! harder requirement than usual — the seed must not sit on disk as
//! plaintext. `encrypt_identity_key`/`decrypt_identity_key` wrap the 32-byte
//! Ed25519 seed in an Argon2id + ChaCha20-Poly1305 on-disk format.
//!
//! Format V1:
//! ```text
//! [ Magic: "LSD-GKEY" (8) ]
//! [ Version: u16 (2) ]
//! [ KDF Algo: u8 (1) ]
//! [ KDF Mem KiB: u32 (4) ]
//! [ KDF Iters: u32 (4) ]
//! [ KDF Lanes: u8 (1) ]
//! [ Salt: 16B ]
//! [ AEAD Algo: u8 (1) ]
//! [ Nonce: 12B ]
//! [ Ciphertext + Tag: N + 16 ]
//! ```

use crate::error::CryptoError;
use dcrypt::algorithms::aead::chacha20poly1305::ChaCha20Poly1305;
use dcrypt::algorithms::kdf::{Argon2, KdfOperation, KeyDerivationFunction};
use dcrypt::algorithms::types::Nonce;
use dcrypt::api::traits::symmetric::{DecryptOperation, EncryptOperation, SymmetricCipher};
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

const HEADER_MAGIC: &[u8; 8] = b"LSD-GKEY";
const HEADER_VERSION: u16 = 1;
const HEADER_LEN: usize = 8 + 2 + 1 + 4 + 4 + 1 + 16 + 1 + 12; // 49 bytes

const KDF_ALGO_ARGON2ID: u8 = 1;
const KDF_MEM_KIB: u32 = 64 * 1024; // 64 MiB
const KDF_ITERS: u32 = 3;
const KDF_LANES: u8 = 4;
const SALT_LEN: usize = 16;
const AEAD_ALGO_CHACHA20POLY1305: u8 = 1;
const NONCE_LEN: usize = 12;
const KEK_LEN: usize = 32;
const KDF_INFO: &[u8] = b"libreseed-identity-key-wrapping";

/// A byte buffer that zeroizes its contents on drop, used for the decrypted
/// Identity Keypair seed in memory.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SensitiveBytes(pub Vec<u8>);

fn read_array<const N: usize>(
    data: &[u8],
    offset: usize,
    field: &'static str,
) -> Result<[u8; N], CryptoError> {
    data.get(offset..offset + N)
        .ok_or_else(|| CryptoError::OperationFailed(format!("keystore: truncated {field}")))?
        .try_into()
        .map_err(|_| CryptoError::OperationFailed(format!("keystore: malformed {field}")))
}

fn read_u32(data: &[u8], offset: usize, field: &'static str) -> Result<u32, CryptoError> {
    Ok(u32::from_be_bytes(read_array::<4>(data, offset, field)?))
}

fn read_u16(data: &[u8], offset: usize, field: &'static str) -> Result<u16, CryptoError> {
    Ok(u16::from_be_bytes(read_array::<2>(data, offset, field)?))
}

fn read_byte(data: &[u8], offset: usize, field: &'static str) -> Result<u8, CryptoError> {
    data.get(offset)
        .copied()
        .ok_or_else(|| CryptoError::OperationFailed(format!("keystore: truncated {field}")))
}

/// Encrypts a 32-byte Ed25519 seed (or any secret byte string) under
/// `passphrase`, producing the versioned on-disk blob.
pub fn encrypt_identity_key(secret: &[u8], passphrase: &str) -> Result<Vec<u8>, CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut nonce_bytes);

    let mut header = Vec::with_capacity(HEADER_LEN);
    header.extend_from_slice(HEADER_MAGIC);
    header.extend_from_slice(&HEADER_VERSION.to_be_bytes());
    header.push(KDF_ALGO_ARGON2ID);
    header.extend_from_slice(&KDF_MEM_KIB.to_be_bytes());
    header.extend_from_slice(&KDF_ITERS.to_be_bytes());
    header.push(KDF_LANES);
    header.extend_from_slice(&salt);
    header.push(AEAD_ALGO_CHACHA20POLY1305);
    header.extend_from_slice(&nonce_bytes);

    if header.len() != HEADER_LEN {
        return Err(CryptoError::EncodeError(
            "keystore header size mismatch".into(),
        ));
    }

    let kdf = Argon2::<SALT_LEN>::new();
    let kek: [u8; KEK_LEN] = kdf
        .builder()
        .with_ikm(passphrase.as_bytes())
        .with_salt(&salt)
        .with_info(KDF_INFO)
        .with_output_length(KEK_LEN)
        .derive_array()
        .map_err(|e| CryptoError::OperationFailed(format!("argon2 derivation failed: {e}")))?;

    let cipher = ChaCha20Poly1305::new(&kek);
    let nonce = Nonce::new(nonce_bytes);
    let ciphertext = SymmetricCipher::encrypt(&cipher)
        .with_nonce(&nonce)
        .encrypt(secret)
        .map_err(|e| CryptoError::OperationFailed(format!("encryption failed: {e}")))?;

    let mut output = header;
    output.extend_from_slice(ciphertext.as_ref());
    Ok(output)
}

/// Decrypts a blob produced by [`encrypt_identity_key`]. The KDF parameters
/// (memory, iterations, lanes) recorded in the header are currently
/// informational only; a future format-agility pass would feed them into the
/// Argon2 builder instead of the compiled-in defaults.
pub fn decrypt_identity_key(data: &[u8], passphrase: &str) -> Result<SensitiveBytes, CryptoError> {
    if data.len() < HEADER_LEN {
        return Err(CryptoError::OperationFailed(
            "keystore blob too short".into(),
        ));
    }
    if &data[0..8] != HEADER_MAGIC {
        return Err(CryptoError::OperationFailed("bad keystore magic".into()));
    }
    let version = read_u16(data, 8, "version")?;
    if version != HEADER_VERSION {
        return Err(CryptoError::OperationFailed(format!(
            "unsupported keystore format version {version}"
        )));
    }
    let _kdf_algo = read_byte(data, 10, "kdf algo")?;
    let _mem_kib = read_u32(data, 11, "kdf mem")?;
    let _iters = read_u32(data, 15, "kdf iters")?;
    let _lanes = read_byte(data, 19, "kdf lanes")?;
    let salt: [u8; SALT_LEN] = read_array(data, 20, "salt")?;
    let _aead_algo = read_byte(data, 36, "aead algo")?;
    let nonce_bytes: [u8; NONCE_LEN] = read_array(data, 37, "nonce")?;
    let ciphertext_bytes = data
        .get(HEADER_LEN..)
        .ok_or_else(|| CryptoError::OperationFailed("keystore blob missing ciphertext".into()))?;

    let kdf = Argon2::<SALT_LEN>::new();
    let kek: [u8; KEK_LEN] = kdf
        .builder()
        .with_ikm(passphrase.as_bytes())
        .with_salt(&salt)
        .with_info(KDF_INFO)
        .with_output_length(KEK_LEN)
        .derive_array()
        .map_err(|e| CryptoError::OperationFailed(format!("argon2 derivation failed: {e}")))?;

    let cipher = ChaCha20Poly1305::new(&kek);
    let nonce = Nonce::new(nonce_bytes);
    let ciphertext_obj = dcrypt::api::types::Ciphertext::new(ciphertext_bytes.to_vec());

    let plaintext = SymmetricCipher::decrypt(&cipher)
        .with_nonce(&nonce)
        .decrypt(&ciphertext_obj)
        .map_err(|_| {
            CryptoError::OperationFailed(
                "decryption failed (wrong passphrase or corrupted keystore)".into(),
            )
        })?;

    Ok(SensitiveBytes(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_v1() {
        let secret = b"0123456789abcdef0123456789abcdef";
        let pass = "correct horse battery staple";

        let encrypted = encrypt_identity_key(secret, pass).unwrap();
        assert_eq!(&encrypted[0..8], HEADER_MAGIC);
        assert_eq!(encrypted.len(), HEADER_LEN + secret.len() + 16);

        let decrypted = decrypt_identity_key(&encrypted, pass).unwrap();
        assert_eq!(decrypted.0, secret);
    }

    #[test]
    fn wrong_passphrase_fails() {
        let secret = b"seed-bytes";
        let encrypted = encrypt_identity_key(secret, "pass").unwrap();
        assert!(decrypt_identity_key(&encrypted, "wrong").is_err());
    }

    #[test]
    fn tampered_salt_fails() {
        let secret = b"seed-bytes";
        let mut encrypted = encrypt_identity_key(secret, "pass").unwrap();
        encrypted[25] ^= 0xFF; // inside the salt range 20..36
        assert!(decrypt_identity_key(&encrypted, "pass").is_err());
    }

    #[test]
    fn truncated_blob_is_rejected_not_panicking() {
        let short = vec![0u8; 10];
        assert!(decrypt_identity_key(&short, "pass").is_err());
    }
}
