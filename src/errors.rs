use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// All errors that can occur in LpVault.
#[derive(Debug, Error)]
pub enum LpVaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Authenticated decryption failed. Wrong password and corrupted
    /// ciphertext are deliberately indistinguishable.
    #[error("Invalid credentials: wrong master password or damaged vault data")]
    InvalidCredentials,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Container errors ---
    #[error("Not a vault container: {0}")]
    InvalidContainer(String),

    #[error("Unsupported container format version {found} (this build reads up to {supported})")]
    UnsupportedFormatVersion { found: u8, supported: u8 },

    // --- Document errors ---
    #[error("Vault document is damaged: {0}")]
    MalformedVault(String),

    #[error("Vault entry is damaged: {0}")]
    MalformedEntry(String),

    #[error("Unsupported vault schema version {found} (this build reads up to {supported})")]
    UnsupportedSchemaVersion { found: u32, supported: u32 },

    // --- Session errors ---
    #[error("Vault is not unlocked")]
    NotUnlocked,

    #[error("Vault is already initialized")]
    AlreadyInitialized,

    #[error("Vault is already unlocked; lock it first")]
    AlreadyUnlocked,

    #[error("No vault container is loaded")]
    NoContainer,

    #[error("Entry {0} not found")]
    EntryNotFound(Uuid),

    #[error("Entry {0} already exists")]
    DuplicateEntry(Uuid),

    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    // --- Utility errors ---
    #[error("Password generator: {0}")]
    Generator(String),

    #[error("Config file error: {0}")]
    Config(String),

    // --- Host errors ---
    #[error("Vault file not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault file already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl LpVaultError {
    /// `true` for errors that mean the vault decrypted but its contents
    /// are structurally unusable.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::MalformedVault(_) | Self::MalformedEntry(_) | Self::UnsupportedSchemaVersion { .. }
        )
    }
}

/// Convenience type alias for LpVault results.
pub type Result<T> = std::result::Result<T, LpVaultError>;
