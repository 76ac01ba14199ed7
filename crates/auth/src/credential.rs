//! Password hashing and verification.
//!
//! Records are self-contained: the salt is stored next to the derived key
//! (`salt:derivedKey`, both lowercase hex), so verification needs only the
//! stored string and the presented password.

use rand::RngCore;
use rand::rngs::OsRng;
use scrypt::Params;
use subtle::ConstantTimeEq;
use thiserror::Error;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 64;

// scrypt cost parameters (N = 2^14, r = 8, p = 1). Verification re-derives
// with the same parameters, so these must not change for existing records
// without a migration.
const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

/// Failure of the underlying RNG or KDF.
///
/// These indicate environment misconfiguration and are not retried; a wrong
/// password is never an error, it is `verify_password(..) == false`.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("random salt generation failed: {0}")]
    Rng(String),

    #[error("key derivation failed: {0}")]
    Kdf(String),
}

/// A stored password record: `<hex salt>:<hex derived key>`.
///
/// Immutable once created; a password change replaces the whole record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordRecord(String);

impl PasswordRecord {
    /// Wrap a record string loaded from storage. Not validated here;
    /// malformed records simply fail verification.
    pub fn from_storage(record: impl Into<String>) -> Self {
        Self(record.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl core::fmt::Display for PasswordRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash a password with a fresh random salt.
///
/// The cost parameters are intentionally slow (memory-hard KDF) to resist
/// offline brute force.
pub fn hash_password(password: &str) -> Result<PasswordRecord, CredentialError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| CredentialError::Rng(e.to_string()))?;

    let key = derive_key(password.as_bytes(), &salt)?;

    Ok(PasswordRecord(format!(
        "{}:{}",
        hex::encode(salt),
        hex::encode(key)
    )))
}

/// Verify a password against a stored record.
///
/// Total: malformed records (missing separator, bad hex, truncated key) are
/// indistinguishable from a wrong password, so the caller only ever sees
/// `false`. The key comparison is constant-time once lengths match; the
/// length itself is not secret.
pub fn verify_password(password: &str, record: &str) -> bool {
    let Some((salt_hex, key_hex)) = record.split_once(':') else {
        return false;
    };
    if salt_hex.is_empty() || key_hex.is_empty() {
        return false;
    }

    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(key_hex) else {
        return false;
    };
    if expected.len() != KEY_LEN {
        return false;
    }

    let Ok(derived) = derive_key(password.as_bytes(), &salt) else {
        return false;
    };

    derived.as_slice().ct_eq(expected.as_slice()).into()
}

fn derive_key(password: &[u8], salt: &[u8]) -> Result<[u8; KEY_LEN], CredentialError> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN)
        .map_err(|e| CredentialError::Kdf(e.to_string()))?;

    let mut key = [0u8; KEY_LEN];
    scrypt::scrypt(password, salt, &params, &mut key)
        .map_err(|e| CredentialError::Kdf(e.to_string()))?;
    Ok(key)
}
