//! `lpvault init`: create a new, empty vault.

use std::fs;

use crate::cli::output;
use crate::cli::{prompt_new_password, vault_dir, Cli};
use crate::config::Settings;
use crate::errors::{LpVaultError, Result};
use crate::storage;
use crate::vault::VaultManager;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let dir = vault_dir(cli)?;
    let settings = Settings::load(&dir)?;
    let path = settings.vault_path(&dir);

    // 1. Create the vault directory if it doesn't exist.
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
        output::info(&format!("Created vault directory: {}", dir.display()));
    }

    // 2. Refuse to overwrite an existing vault.
    if path.exists() {
        output::tip("Use `lpvault add` to add entries to the existing vault.");
        return Err(LpVaultError::VaultAlreadyExists(path));
    }

    // 3. Prompt for a new password (with confirmation).
    let password = prompt_new_password()?;

    // 4. Derive the key, seal the empty vault, and write it.
    let mut manager = VaultManager::new();
    let container = manager.create(password.as_bytes(), settings.kdf_iterations)?;
    storage::write_container(&path, &container)?;

    output::success(&format!("Vault created at {}", path.display()));
    output::tip("Run `lpvault add login <title>` to add a login.");
    output::tip("Run `lpvault list` to see all entries.");

    Ok(())
}
