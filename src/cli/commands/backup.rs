//! `lpvault backup`: write an encrypted copy of the vault.

use std::path::Path;

use chrono::Utc;

use crate::cli::output;
use crate::cli::{prompt_new_backup_password, Cli, OpenVault};
use crate::errors::{LpVaultError, Result};
use crate::storage;

/// Execute the `backup` command.
///
/// The backup is sealed with the master password unless
/// `separate_password` is set.
pub fn execute(cli: &Cli, output_path: Option<&Path>, separate_password: bool) -> Result<()> {
    let open = OpenVault::open(cli)?;

    let password = if separate_password {
        prompt_new_backup_password()?
    } else {
        open.password.clone()
    };

    let dest = match output_path {
        Some(path) => path.to_path_buf(),
        None => storage::backup_path(&open.settings.backup_path(&open.dir), Utc::now()),
    };
    if dest == open.path {
        return Err(LpVaultError::CommandFailed(
            "refusing to write a backup over the vault itself".into(),
        ));
    }

    let container = open
        .manager
        .export_backup(password.as_bytes(), open.settings.kdf_iterations)?;
    storage::write_container(&dest, &container)?;

    output::success(&format!(
        "Backed up {} entries to {}",
        open.vault()?.len(),
        dest.display()
    ));
    output::tip("Run `lpvault restore <file> --policy <policy>` to merge it back.");
    Ok(())
}
