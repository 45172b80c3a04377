//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! The iteration count is a stored property of every container so that
//! old vaults keep opening with the cost they were created with while
//! new vaults can raise it.  Derivation is deterministic, which is what
//! lets a password be verified by attempting decryption.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

use super::keys::{MasterKey, KEY_LEN};
use crate::errors::{LpVaultError, Result};

/// Length of the per-container salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Lowest iteration count this build will derive with.
pub const MIN_ITERATIONS: u32 = 100_000;

/// Highest iteration count this build will derive with.  Anything above
/// is treated as a damaged header rather than a real cost setting.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// Iteration count used for newly created vaults.
pub const DEFAULT_ITERATIONS: u32 = 600_000;

/// Derive a 32-byte master key from a password and salt.
///
/// Blocks the calling thread; at the default cost this takes a few
/// hundred milliseconds, so interactive hosts should call it off their
/// UI thread.
pub fn derive_master_key(password: &[u8], salt: &[u8], iterations: u32) -> Result<MasterKey> {
    if iterations < MIN_ITERATIONS {
        return Err(LpVaultError::KeyDerivationFailed(format!(
            "PBKDF2 iterations must be at least {MIN_ITERATIONS} (got {iterations})"
        )));
    }
    if iterations > MAX_ITERATIONS {
        return Err(LpVaultError::KeyDerivationFailed(format!(
            "PBKDF2 iterations must be at most {MAX_ITERATIONS} (got {iterations})"
        )));
    }
    if salt.is_empty() {
        return Err(LpVaultError::KeyDerivationFailed(
            "salt must not be empty".into(),
        ));
    }

    let mut bytes = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut bytes);

    let key = MasterKey::new(bytes);
    bytes.zeroize();
    Ok(key)
}

/// Generate a cryptographically random salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
