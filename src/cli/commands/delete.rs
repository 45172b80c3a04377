//! `lpvault delete`: remove an entry from the vault.

use crate::cli::output;
use crate::cli::{confirm, Cli, OpenVault};
use crate::errors::Result;

/// Execute the `delete` command.
pub fn execute(cli: &Cli, id: &str, force: bool) -> Result<()> {
    let mut open = OpenVault::open(cli)?;
    let id = open.resolve(id)?;
    let title = open.manager.entry(id)?.title().to_string();

    // Unless --force is set, ask for confirmation before deleting.
    if !force && !confirm(&format!("Delete '{title}'?"))? {
        output::info("Cancelled.");
        return Ok(());
    }

    open.manager.delete_entry(id)?;
    open.save()?;

    output::success(&format!("Deleted '{title}'"));
    Ok(())
}
