//! `lpvault info`: describe a vault or backup file without decrypting it.

use std::fs;
use std::path::Path;

use crate::cli::output;
use crate::errors::{LpVaultError, Result};
use crate::vault::container;

/// Execute the `info` command.
pub fn execute(file: &Path) -> Result<()> {
    if !file.exists() {
        return Err(LpVaultError::VaultNotFound(file.to_path_buf()));
    }
    let data = fs::read(file)?;
    let info = container::inspect(&data)?;

    output::info(&format!("{}", file.display()));
    output::print_container_info(&info, data.len() as u64);
    Ok(())
}
