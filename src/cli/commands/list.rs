//! `lpvault list`: display entries in a table.

use crate::cli::output;
use crate::cli::{Cli, OpenVault};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(
    cli: &Cli,
    category: Option<&str>,
    favorites: bool,
    search: Option<&str>,
) -> Result<()> {
    let open = OpenVault::open(cli)?;
    let vault = open.vault()?;

    let mut entries = match search {
        Some(query) => vault.search(query),
        None => vault.sorted(),
    };
    if let Some(category) = category {
        entries.retain(|e| e.category().eq_ignore_ascii_case(category));
    }
    if favorites {
        entries.retain(|e| e.is_favorite());
    }

    output::info(&format!(
        "{} of {} entr{}",
        entries.len(),
        vault.len(),
        if vault.len() == 1 { "y" } else { "ies" }
    ));
    output::print_entries_table(&entries);

    if category.is_none() && search.is_none() && !favorites {
        let categories = vault.categories();
        if !categories.is_empty() {
            output::tip(&format!("Categories: {}", categories.join(", ")));
        }
    }

    Ok(())
}
