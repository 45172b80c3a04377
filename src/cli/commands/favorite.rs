//! `lpvault favorite`: toggle an entry's favorite flag.

use crate::cli::output;
use crate::cli::{Cli, OpenVault};
use crate::errors::Result;

/// Execute the `favorite` command.
pub fn execute(cli: &Cli, id: &str) -> Result<()> {
    let mut open = OpenVault::open(cli)?;
    let id = open.resolve(id)?;

    let now_favorite = open.manager.toggle_favorite(id)?;
    open.save()?;

    let title = open.manager.entry(id)?.title();
    if now_favorite {
        output::success(&format!("'{title}' added to favorites"));
    } else {
        output::success(&format!("'{title}' removed from favorites"));
    }
    Ok(())
}
