//! Integration tests for the LpVault crypto module.

use lpvault::crypto::encryption::{decrypt_with_aad, encrypt_with_aad, NONCE_LEN, TAG_LEN};
use lpvault::crypto::{
    decode_ciphertext, decrypt, derive_master_key, encode_ciphertext, encrypt, generate_salt,
    MasterKey, MIN_ITERATIONS,
};
use lpvault::errors::LpVaultError;

// ---------------------------------------------------------------------------
// Encryption round-trip
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = MasterKey::new([0xAB; 32]);
    let plaintext = b"{\"schema_version\":2,\"entries\":[]}";

    let ciphertext = encrypt(&key, plaintext).expect("encrypt should succeed");

    // 12-byte nonce + ciphertext + 16-byte tag.
    assert_eq!(ciphertext.len(), NONCE_LEN + plaintext.len() + TAG_LEN);

    let recovered = decrypt(&key, &ciphertext).expect("decrypt should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn encrypt_produces_different_ciphertext_each_time() {
    let key = MasterKey::new([0xCD; 32]);
    let plaintext = b"same vault, saved twice";

    let ct1 = encrypt(&key, plaintext).expect("encrypt 1");
    let ct2 = encrypt(&key, plaintext).expect("encrypt 2");

    assert_ne!(ct1, ct2);
    assert_ne!(ct1[..NONCE_LEN], ct2[..NONCE_LEN]);
}

#[test]
fn decrypt_with_wrong_key_fails() {
    let ct = encrypt(&MasterKey::new([1; 32]), b"secret").unwrap();
    let result = decrypt(&MasterKey::new([2; 32]), &ct);
    assert!(matches!(result, Err(LpVaultError::InvalidCredentials)));
}

#[test]
fn every_flipped_byte_is_detected() {
    let key = MasterKey::new([7; 32]);
    let ct = encrypt(&key, b"attack at dawn").unwrap();

    for i in 0..ct.len() {
        let mut tampered = ct.clone();
        tampered[i] ^= 0x01;
        assert!(
            matches!(decrypt(&key, &tampered), Err(LpVaultError::InvalidCredentials)),
            "flip at byte {i} went unnoticed"
        );
    }
}

#[test]
fn truncated_ciphertext_fails() {
    let key = MasterKey::new([3; 32]);
    assert!(matches!(
        decrypt(&key, &[0u8; NONCE_LEN + TAG_LEN - 1]),
        Err(LpVaultError::InvalidCredentials)
    ));
}

#[test]
fn aad_must_match() {
    let key = MasterKey::new([4; 32]);
    let ct = encrypt_with_aad(&key, b"payload", b"header-v1").unwrap();
    assert_eq!(decrypt_with_aad(&key, &ct, b"header-v1").unwrap(), b"payload");
    assert!(matches!(
        decrypt_with_aad(&key, &ct, b"header-v2"),
        Err(LpVaultError::InvalidCredentials)
    ));
}

#[test]
fn text_encoding_roundtrip_and_garbage() {
    let key = MasterKey::new([5; 32]);
    let ct = encrypt(&key, b"note body").unwrap();
    let text = encode_ciphertext(&ct);
    assert_eq!(decrypt(&key, &decode_ciphertext(&text).unwrap()).unwrap(), b"note body");
    assert!(matches!(
        decode_ciphertext("%%% not base64 %%%"),
        Err(LpVaultError::InvalidCredentials)
    ));
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn derive_master_key_same_inputs_same_output() {
    let salt = generate_salt();
    let k1 = derive_master_key(b"correct horse", &salt, MIN_ITERATIONS).unwrap();
    let k2 = derive_master_key(b"correct horse", &salt, MIN_ITERATIONS).unwrap();
    assert_eq!(k1.as_bytes(), k2.as_bytes());
}

#[test]
fn derive_master_key_depends_on_every_input() {
    let salt = generate_salt();
    let base = derive_master_key(b"pw", &salt, MIN_ITERATIONS).unwrap();

    let other_salt = derive_master_key(b"pw", &generate_salt(), MIN_ITERATIONS).unwrap();
    let other_pw = derive_master_key(b"pw2", &salt, MIN_ITERATIONS).unwrap();
    let other_cost = derive_master_key(b"pw", &salt, MIN_ITERATIONS + 1).unwrap();

    assert_ne!(base.as_bytes(), other_salt.as_bytes());
    assert_ne!(base.as_bytes(), other_pw.as_bytes());
    assert_ne!(base.as_bytes(), other_cost.as_bytes());
}

#[test]
fn iteration_floor_is_enforced() {
    let result = derive_master_key(b"pw", &generate_salt(), MIN_ITERATIONS - 1);
    assert!(matches!(result, Err(LpVaultError::KeyDerivationFailed(_))));
}

#[test]
fn full_crypto_pipeline() {
    let salt = generate_salt();
    let key = derive_master_key(b"master", &salt, MIN_ITERATIONS).unwrap();
    let ct = encrypt(&key, b"hello").unwrap();

    let again = derive_master_key(b"master", &salt, MIN_ITERATIONS).unwrap();
    assert_eq!(decrypt(&again, &ct).unwrap(), b"hello");

    let wrong = derive_master_key(b"Master", &salt, MIN_ITERATIONS).unwrap();
    assert!(decrypt(&wrong, &ct).is_err());
}
