//! `lpvault restore`: merge a backup into the vault.
//!
//! The master password is tried first; if the backup was sealed with a
//! different password, that password is prompted for.

use std::path::Path;

use crate::cli::output;
use crate::cli::{confirm, prompt_backup_password, Cli, OpenVault};
use crate::errors::{LpVaultError, Result};
use crate::storage;
use crate::vault::{ImportReport, MergePolicy};

/// Execute the `restore` command.
pub fn execute(cli: &Cli, file: &Path, policy: &str, force: bool) -> Result<()> {
    let policy: MergePolicy = policy.parse()?;
    let backup = storage::read_container(file)?;

    let mut open = OpenVault::open(cli)?;

    if policy == MergePolicy::Replace && !force {
        let count = open.vault()?.len();
        if !confirm(&format!("Replace all {count} entries with the backup?"))? {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let master = open.password.clone();
    let report = match open
        .manager
        .import_backup(&backup, master.as_bytes(), policy)
    {
        Err(LpVaultError::InvalidCredentials) => {
            output::info("Backup uses a different password.");
            let backup_password = prompt_backup_password()?;
            open.manager
                .import_backup(&backup, backup_password.as_bytes(), policy)?
        }
        other => other?,
    };

    if report.changed() {
        open.save()?;
    }

    output::success(&describe(&report, policy));
    Ok(())
}

fn describe(report: &ImportReport, policy: MergePolicy) -> String {
    let mut parts = vec![format!("{} added", report.added)];
    if report.replaced > 0 {
        parts.push(format!("{} replaced", report.replaced));
    }
    if report.renamed > 0 {
        parts.push(format!("{} kept alongside with new ids", report.renamed));
    }
    if report.removed > 0 {
        parts.push(format!("{} removed", report.removed));
    }
    format!("Restored backup ({policy}): {}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_lists_nonzero_counts() {
        let report = ImportReport {
            added: 2,
            replaced: 0,
            renamed: 1,
            removed: 0,
        };
        assert_eq!(
            describe(&report, MergePolicy::KeepBoth),
            "Restored backup (keep-both): 2 added, 1 kept alongside with new ids"
        );
    }
}
