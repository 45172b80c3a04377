//! Binary container format shared by vault files and backups (`.lp`).
//!
//! ```text
//! [LPVT: 4 bytes][format_version: 1 byte][salt: 16 bytes][kdf_iterations: 4 bytes LE][sealed payload]
//! ```
//!
//! - **Magic** (`LPVT`): identifies the file as an LpVault container.
//! - **Format version**: layout version (currently `1`).  Anything else
//!   is rejected before the rest of the file is looked at.
//! - **Salt / iterations**: PBKDF2 inputs needed to re-derive the key.
//! - **Sealed payload**: Cipher Engine output (`nonce | ciphertext | tag`)
//!   wrapping the serialized vault document.  The 25 header bytes are
//!   bound in as associated data, so editing any header field makes
//!   authentication fail.

use zeroize::Zeroizing;

use crate::crypto::encryption::{decrypt_with_aad, encrypt_with_aad, NONCE_LEN, TAG_LEN};
use crate::crypto::kdf::{derive_master_key, MAX_ITERATIONS, MIN_ITERATIONS, SALT_LEN};
use crate::crypto::keys::MasterKey;
use crate::errors::{LpVaultError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every container.
const MAGIC: &[u8; 4] = b"LPVT";

/// Current binary format version.
pub const CURRENT_FORMAT_VERSION: u8 = 1;

/// Magic + version.
const PREFIX_LEN: usize = 5;

/// Full fixed-size header: prefix + salt + iterations.
pub const HEADER_LEN: usize = PREFIX_LEN + SALT_LEN + 4;

/// Conventional file extension for containers and backups.
pub const FILE_EXTENSION: &str = "lp";

// ---------------------------------------------------------------------------
// VaultContainer
// ---------------------------------------------------------------------------

/// A persisted, encrypted vault.  Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct VaultContainer {
    format_version: u8,
    salt: [u8; SALT_LEN],
    kdf_iterations: u32,
    ciphertext: Vec<u8>,
}

impl VaultContainer {
    /// Encrypt `plaintext` under `key` into a new container.
    ///
    /// `salt` and `kdf_iterations` must be the inputs `key` was derived
    /// from; they are stored in the clear so the key can be re-derived.
    pub fn seal(
        key: &MasterKey,
        salt: [u8; SALT_LEN],
        kdf_iterations: u32,
        plaintext: &[u8],
    ) -> Result<Self> {
        let header = encode_header(CURRENT_FORMAT_VERSION, &salt, kdf_iterations);
        let ciphertext = encrypt_with_aad(key, plaintext, &header)?;
        Ok(Self {
            format_version: CURRENT_FORMAT_VERSION,
            salt,
            kdf_iterations,
            ciphertext,
        })
    }

    /// Decrypt and authenticate the payload.
    pub fn open(&self, key: &MasterKey) -> Result<Zeroizing<Vec<u8>>> {
        self.ensure_supported()?;
        let header = encode_header(self.format_version, &self.salt, self.kdf_iterations);
        decrypt_with_aad(key, &self.ciphertext, &header).map(Zeroizing::new)
    }

    /// Re-derive the key for this container from a password.
    ///
    /// A stored cost outside the accepted range can only come from a
    /// damaged or edited header, so it is reported like any other
    /// authentication failure and never reaches the KDF.
    pub fn derive_key(&self, password: &[u8]) -> Result<MasterKey> {
        self.ensure_supported()?;
        if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&self.kdf_iterations) {
            return Err(LpVaultError::InvalidCredentials);
        }
        derive_master_key(password, &self.salt, self.kdf_iterations)
    }

    /// Serialize to the on-disk byte layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());
        buf.extend_from_slice(&encode_header(
            self.format_version,
            &self.salt,
            self.kdf_iterations,
        ));
        buf.extend_from_slice(&self.ciphertext);
        buf
    }

    /// Parse the on-disk byte layout.
    ///
    /// The version byte is checked right after the magic, so a file from
    /// a newer build fails with `UnsupportedFormatVersion` no matter what
    /// follows.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let format_version = read_prefix(data)?;

        if data.len() < HEADER_LEN + NONCE_LEN + TAG_LEN {
            return Err(LpVaultError::InvalidContainer(
                "file too small to hold a sealed vault".into(),
            ));
        }

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&data[PREFIX_LEN..PREFIX_LEN + SALT_LEN]);

        let iter_start = PREFIX_LEN + SALT_LEN;
        let kdf_iterations = u32::from_le_bytes(
            data[iter_start..HEADER_LEN]
                .try_into()
                .map_err(|_| LpVaultError::InvalidContainer("bad iteration field".into()))?,
        );

        Ok(Self {
            format_version,
            salt,
            kdf_iterations,
            ciphertext: data[HEADER_LEN..].to_vec(),
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn format_version(&self) -> u8 {
        self.format_version
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn kdf_iterations(&self) -> u32 {
        self.kdf_iterations
    }

    /// Sealed payload (`nonce | ciphertext | tag`).
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Non-secret header summary.
    pub fn info(&self) -> ContainerInfo {
        ContainerInfo {
            format_version: self.format_version,
            kdf_iterations: self.kdf_iterations,
            salt_len: self.salt.len(),
            payload_len: self.ciphertext.len(),
        }
    }

    fn ensure_supported(&self) -> Result<()> {
        if self.format_version != CURRENT_FORMAT_VERSION {
            return Err(LpVaultError::UnsupportedFormatVersion {
                found: self.format_version,
                supported: CURRENT_FORMAT_VERSION,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for VaultContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultContainer")
            .field("format_version", &self.format_version)
            .field("kdf_iterations", &self.kdf_iterations)
            .field("payload_len", &self.ciphertext.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Header inspection
// ---------------------------------------------------------------------------

/// What can be learned about a container without the password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerInfo {
    pub format_version: u8,
    pub kdf_iterations: u32,
    pub salt_len: usize,
    /// Length of the sealed payload, nonce and tag included.
    pub payload_len: usize,
}

/// Parse only the header of `data`.
pub fn inspect(data: &[u8]) -> Result<ContainerInfo> {
    VaultContainer::from_bytes(data).map(|c| c.info())
}

/// Cheap check for the magic bytes, e.g. to filter a file picker.
pub fn looks_like_container(data: &[u8]) -> bool {
    data.starts_with(MAGIC)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn encode_header(format_version: u8, salt: &[u8; SALT_LEN], kdf_iterations: u32) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[..4].copy_from_slice(MAGIC);
    header[4] = format_version;
    header[PREFIX_LEN..PREFIX_LEN + SALT_LEN].copy_from_slice(salt);
    header[PREFIX_LEN + SALT_LEN..].copy_from_slice(&kdf_iterations.to_le_bytes());
    header
}

/// Validate magic and version, returning the version.
fn read_prefix(data: &[u8]) -> Result<u8> {
    if data.len() < PREFIX_LEN {
        return Err(LpVaultError::InvalidContainer(
            "file too small to be a vault".into(),
        ));
    }
    if &data[..4] != MAGIC {
        return Err(LpVaultError::InvalidContainer(
            "missing LPVT magic bytes".into(),
        ));
    }
    let version = data[4];
    if version != CURRENT_FORMAT_VERSION {
        return Err(LpVaultError::UnsupportedFormatVersion {
            found: version,
            supported: CURRENT_FORMAT_VERSION,
        });
    }
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kdf::{generate_salt, MIN_ITERATIONS};

    fn sealed(plaintext: &[u8]) -> (VaultContainer, MasterKey) {
        let salt = generate_salt();
        let key = derive_master_key(b"container-pw", &salt, MIN_ITERATIONS).unwrap();
        let container = VaultContainer::seal(&key, salt, MIN_ITERATIONS, plaintext).unwrap();
        (container, key)
    }

    #[test]
    fn bytes_roundtrip_and_open() {
        let (container, key) = sealed(b"{\"schema_version\":2}");
        let bytes = container.to_bytes();
        assert!(bytes.starts_with(b"LPVT\x01"));
        assert_eq!(bytes.len(), HEADER_LEN + container.ciphertext().len());

        let parsed = VaultContainer::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, container);
        assert_eq!(&*parsed.open(&key).unwrap(), b"{\"schema_version\":2}");

        let rederived = parsed.derive_key(b"container-pw").unwrap();
        assert_eq!(&*parsed.open(&rederived).unwrap(), b"{\"schema_version\":2}");
    }

    #[test]
    fn plaintext_never_appears_in_bytes() {
        let (container, _) = sealed(b"super-secret-marker");
        let bytes = container.to_bytes();
        assert!(!bytes
            .windows(b"super-secret-marker".len())
            .any(|w| w == b"super-secret-marker"));
    }

    #[test]
    fn header_tampering_fails_authentication() {
        let (container, key) = sealed(b"payload");
        let mut bytes = container.to_bytes();
        // Flip a bit in the iteration count; the key stays the same but
        // the header no longer matches the tag.
        bytes[PREFIX_LEN + SALT_LEN + 3] ^= 0x01;
        let parsed = VaultContainer::from_bytes(&bytes).unwrap();
        assert!(matches!(
            parsed.open(&key),
            Err(LpVaultError::InvalidCredentials)
        ));
    }

    #[test]
    fn future_version_fails_fast() {
        let (container, _) = sealed(b"payload");
        let mut bytes = container.to_bytes();
        bytes[4] = CURRENT_FORMAT_VERSION + 1;
        assert!(matches!(
            VaultContainer::from_bytes(&bytes),
            Err(LpVaultError::UnsupportedFormatVersion { found: 2, supported: 1 })
        ));

        // Version is checked even when the rest is truncated away.
        assert!(matches!(
            VaultContainer::from_bytes(&bytes[..PREFIX_LEN]),
            Err(LpVaultError::UnsupportedFormatVersion { .. })
        ));
    }

    #[test]
    fn rejects_foreign_and_truncated_files() {
        assert!(matches!(
            VaultContainer::from_bytes(b"LUCKEEPASS_BACKUP_V1.0"),
            Err(LpVaultError::InvalidContainer(_))
        ));
        assert!(matches!(
            VaultContainer::from_bytes(b"LP"),
            Err(LpVaultError::InvalidContainer(_))
        ));
        let (container, _) = sealed(b"payload");
        let bytes = container.to_bytes();
        assert!(matches!(
            VaultContainer::from_bytes(&bytes[..HEADER_LEN + 4]),
            Err(LpVaultError::InvalidContainer(_))
        ));
    }

    #[test]
    fn inspect_reports_header() {
        let (container, _) = sealed(b"12345");
        let bytes = container.to_bytes();
        assert!(looks_like_container(&bytes));
        assert!(!looks_like_container(b"PK\x03\x04"));

        let info = inspect(&bytes).unwrap();
        assert_eq!(info.format_version, 1);
        assert_eq!(info.kdf_iterations, MIN_ITERATIONS);
        assert_eq!(info.salt_len, SALT_LEN);
        assert_eq!(info.payload_len, NONCE_LEN + 5 + TAG_LEN);
    }

    #[test]
    fn resealing_uses_fresh_nonce() {
        let salt = generate_salt();
        let key = derive_master_key(b"pw", &salt, MIN_ITERATIONS).unwrap();
        let a = VaultContainer::seal(&key, salt, MIN_ITERATIONS, b"same").unwrap();
        let b = VaultContainer::seal(&key, salt, MIN_ITERATIONS, b"same").unwrap();
        assert_ne!(a.ciphertext()[..NONCE_LEN], b.ciphertext()[..NONCE_LEN]);
        assert_ne!(a.to_bytes(), b.to_bytes());
    }
}
