//! Shared structural-validation helpers used by every record type's
//! `validate()` (§4.2): presence, size ceilings, and format checks (semver,
//! tagged hex/base64). Each helper returns the first violation it finds, in
//! the same spirit as the record-level `validate()` contract.

use libreseed_crypto::canonical;
use libreseed_types::error::ValidationError;
use libreseed_types::{MAX_NAME_LEN, MAX_VERSION_LEN, PUBKEY_LEN, SHA256_LEN, SIGNATURE_LEN};

/// Validates a package `name` field: non-empty, at most [`MAX_NAME_LEN`] bytes.
pub fn check_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::FieldMissing("name"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::FieldTooLong {
            field: "name",
            got: name.len(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

/// Validates a `version` field: non-empty, at most [`MAX_VERSION_LEN`] bytes,
/// and a parseable semantic version (pre-release/build metadata permitted).
/// Returns the parsed [`semver::Version`] for ordering use by callers.
pub fn check_version(version: &str) -> Result<semver::Version, ValidationError> {
    if version.is_empty() {
        return Err(ValidationError::FieldMissing("version"));
    }
    if version.len() > MAX_VERSION_LEN {
        return Err(ValidationError::FieldTooLong {
            field: "version",
            got: version.len(),
            max: MAX_VERSION_LEN,
        });
    }
    semver::Version::parse(version).map_err(|e| ValidationError::FieldFormat {
        field: "version",
        reason: e.to_string(),
    })
}

/// Validates a non-zero timestamp field (§4.2: "non-zero timestamps").
pub fn check_timestamp(ts: u64, field: &'static str) -> Result<(), ValidationError> {
    if ts == 0 {
        return Err(ValidationError::InvalidTimestamp(field));
    }
    Ok(())
}

/// Validates a non-empty generic string field.
pub fn check_non_empty(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::FieldMissing(field));
    }
    Ok(())
}

/// Decodes and validates a `"ed25519:<base64>"`-tagged public key field,
/// confirming it decodes to exactly [`PUBKEY_LEN`] bytes.
pub fn check_tagged_pubkey(value: &str, field: &'static str) -> Result<Vec<u8>, ValidationError> {
    let bytes = canonical::untag_ed25519(value).map_err(|e| ValidationError::FieldFormat {
        field,
        reason: e.to_string(),
    })?;
    if bytes.len() != PUBKEY_LEN {
        return Err(ValidationError::FieldFormat {
            field,
            reason: format!("expected {PUBKEY_LEN} bytes, got {}", bytes.len()),
        });
    }
    Ok(bytes)
}

/// Decodes and validates a `"ed25519:<base64>"`-tagged signature field,
/// confirming it decodes to exactly [`SIGNATURE_LEN`] bytes.
pub fn check_tagged_signature(
    value: &str,
    field: &'static str,
) -> Result<Vec<u8>, ValidationError> {
    let bytes = canonical::untag_ed25519(value).map_err(|e| ValidationError::FieldFormat {
        field,
        reason: e.to_string(),
    })?;
    if bytes.len() != SIGNATURE_LEN {
        return Err(ValidationError::FieldFormat {
            field,
            reason: format!("expected {SIGNATURE_LEN} bytes, got {}", bytes.len()),
        });
    }
    Ok(bytes)
}

/// Decodes and validates a `"sha256:<hex>"`-tagged hash field, confirming it
/// decodes to exactly [`SHA256_LEN`] bytes (64 lowercase hex characters).
pub fn check_tagged_sha256(value: &str, field: &'static str) -> Result<Vec<u8>, ValidationError> {
    let bytes = canonical::untag_sha256(value).map_err(|e| ValidationError::FieldFormat {
        field,
        reason: e.to_string(),
    })?;
    if bytes.len() != SHA256_LEN {
        return Err(ValidationError::FieldFormat {
            field,
            reason: format!("expected {SHA256_LEN} bytes, got {}", bytes.len()),
        });
    }
    Ok(bytes)
}

/// Decodes and validates a bare (untagged) base64 field of exactly
/// [`SHA256_LEN`] bytes, used for the `seederID` field (§3).
pub fn check_bare_seeder_id(value: &str, field: &'static str) -> Result<Vec<u8>, ValidationError> {
    let bytes =
        canonical::base64_codec::decode(value).map_err(|e| ValidationError::FieldFormat {
            field,
            reason: e.to_string(),
        })?;
    if bytes.len() != SHA256_LEN {
        return Err(ValidationError::FieldFormat {
            field,
            reason: format!("expected {SHA256_LEN} bytes, got {}", bytes.len()),
        });
    }
    Ok(bytes)
}
