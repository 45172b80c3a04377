//! `lpvault show`: print one entry.

use crate::cli::output;
use crate::cli::{Cli, OpenVault};
use crate::errors::Result;

/// Execute the `show` command.
pub fn execute(cli: &Cli, id: &str, reveal: bool) -> Result<()> {
    let open = OpenVault::open(cli)?;
    let id = open.resolve(id)?;
    let entry = open.manager.entry(id)?;

    output::print_entry(entry, reveal);
    if !reveal {
        output::tip("Pass --reveal to show secret fields.");
    }

    Ok(())
}
