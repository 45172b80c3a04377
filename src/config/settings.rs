use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::{DEFAULT_ITERATIONS, MAX_ITERATIONS, MIN_ITERATIONS};
use crate::errors::{LpVaultError, Result};

/// Per-directory configuration, loaded from `.lpvault.toml`.
///
/// Every field has a sensible default so LpVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Vault file name (relative to the vault directory).
    #[serde(default = "default_vault_file")]
    pub vault_file: String,

    /// Directory (relative to the vault directory) for timestamped backups.
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,

    /// PBKDF2 iteration count used for new vaults and password changes.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Whether `copy` may use the system clipboard.
    #[serde(default = "default_clipboard")]
    pub clipboard: bool,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_file() -> String {
    "vault.lp".to_string()
}

fn default_backup_dir() -> String {
    "backups".to_string()
}

fn default_kdf_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_clipboard() -> bool {
    true
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_file: default_vault_file(),
            backup_dir: default_backup_dir(),
            kdf_iterations: default_kdf_iterations(),
            clipboard: default_clipboard(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the vault directory.
    pub const FILE_NAME: &'static str = ".lpvault.toml";

    /// Load settings from `<dir>/.lpvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.  If it exists
    /// but cannot be parsed, or sets a KDF cost below the floor, an
    /// error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            LpVaultError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&self.kdf_iterations) {
            return Err(LpVaultError::Config(format!(
                "kdf_iterations = {} is outside {MIN_ITERATIONS}..={MAX_ITERATIONS}",
                self.kdf_iterations
            )));
        }
        if self.vault_file.trim().is_empty() {
            return Err(LpVaultError::Config("vault_file cannot be empty".into()));
        }
        Ok(())
    }

    /// Full path to the vault file.
    ///
    /// Example: `dir/vault.lp`
    pub fn vault_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.vault_file)
    }

    /// Full path to the backup directory.
    ///
    /// Example: `dir/backups`
    pub fn backup_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.backup_dir)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
