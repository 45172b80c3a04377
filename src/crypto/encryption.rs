//! AES-256-GCM authenticated encryption.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext.  `decrypt` splits the nonce back out
//! before decrypting.
//!
//! Layout of the returned byte buffer:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::keys::MasterKey;
use crate::errors::{LpVaultError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under `key`.
///
/// Returns the nonce prepended to the ciphertext (nonce || ciphertext).
pub fn encrypt(key: &MasterKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    encrypt_with_aad(key, plaintext, &[])
}

/// Decrypt data that was produced by `encrypt`.
pub fn decrypt(key: &MasterKey, ciphertext_with_nonce: &[u8]) -> Result<Vec<u8>> {
    decrypt_with_aad(key, ciphertext_with_nonce, &[])
}

/// Encrypt `plaintext`, binding `aad` into the authentication tag.
///
/// `aad` is not stored in the output; the exact same bytes must be
/// supplied again to decrypt.
pub fn encrypt_with_aad(key: &MasterKey, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| LpVaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, Payload { msg: plaintext, aad })
        .map_err(|e| LpVaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt and authenticate data produced by `encrypt_with_aad`.
///
/// Every failure (short input, wrong key, altered bytes, wrong `aad`)
/// is reported as `InvalidCredentials`.
pub fn decrypt_with_aad(key: &MasterKey, ciphertext_with_nonce: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    if ciphertext_with_nonce.len() < NONCE_LEN + TAG_LEN {
        return Err(LpVaultError::InvalidCredentials);
    }

    let (nonce_bytes, ciphertext) = ciphertext_with_nonce.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| LpVaultError::InvalidCredentials)?;

    cipher
        .decrypt(nonce, Payload { msg: ciphertext, aad })
        .map_err(|_| LpVaultError::InvalidCredentials)
}

/// Encode encrypted bytes as standard base64 for text documents.
pub fn encode_ciphertext(ciphertext: &[u8]) -> String {
    BASE64.encode(ciphertext)
}

/// Decode base64 produced by `encode_ciphertext`.
///
/// Garbage text is treated like any other tampering.
pub fn decode_ciphertext(encoded: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(encoded.trim())
        .map_err(|_| LpVaultError::InvalidCredentials)
}
