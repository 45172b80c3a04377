//! `lpvault passwd`: change the master password.
//!
//! A fresh salt is generated and the whole vault is re-sealed under the
//! new key, then written atomically.

use crate::cli::output;
use crate::cli::{prompt_new_password, Cli, OpenVault};
use crate::errors::Result;

/// Execute the `passwd` command.
pub fn execute(cli: &Cli) -> Result<()> {
    // 1. Open the vault with the current password.
    output::info("Enter your current vault password.");
    let mut open = OpenVault::open(cli)?;

    // 2. Prompt for the new password.
    output::info("Choose your new vault password.");
    let new_password = prompt_new_password()?;

    // 3. Re-key with the configured KDF cost and save.
    let iterations = open.settings.kdf_iterations;
    open.manager
        .change_password(new_password.as_bytes(), Some(iterations))?;
    open.save()?;

    output::success(&format!(
        "Password changed ({} entries re-encrypted)",
        open.vault()?.len()
    ));
    Ok(())
}
