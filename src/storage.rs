//! Filesystem access for vault containers.
//!
//! The vault engine itself never does I/O; hosts read and write
//! containers through these helpers.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::errors::{LpVaultError, Result};
use crate::vault::container::{VaultContainer, FILE_EXTENSION};

/// Write `bytes` to `path` **atomically**.
///
/// 1. Write to a hidden temp file in the same directory.
/// 2. Flush it to disk.
/// 3. Rename the temp file over the target path.
///
/// Readers see either the old file or the complete new one.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| LpVaultError::CommandFailed(format!("not a file path: {}", path.display())))?;
    let tmp_path = parent.join(format!(".{}.tmp", file_name.to_string_lossy()));

    let result = (|| -> Result<()> {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result?;

    debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}

/// Atomically persist a container.
pub fn write_container(path: &Path, container: &VaultContainer) -> Result<()> {
    write_atomic(path, &container.to_bytes())
}

/// Read and parse a container file.
pub fn read_container(path: &Path) -> Result<VaultContainer> {
    if !path.exists() {
        return Err(LpVaultError::VaultNotFound(path.to_path_buf()));
    }
    let data = fs::read(path)?;
    VaultContainer::from_bytes(&data)
}

/// Timestamped file name for a backup, e.g. `lpvault-backup-20240131-235959.lp`.
pub fn backup_file_name(now: DateTime<Utc>) -> String {
    format!(
        "lpvault-backup-{}.{FILE_EXTENSION}",
        now.format("%Y%m%d-%H%M%S")
    )
}

/// Full path of a new backup inside `backup_dir`.
pub fn backup_path(backup_dir: &Path, now: DateTime<Utc>) -> PathBuf {
    backup_dir.join(backup_file_name(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn write_atomic_replaces_and_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vault.lp");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        let names: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["vault.lp"]);
    }

    #[test]
    fn write_atomic_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("backups").join("nested").join("b.lp");
        write_atomic(&path, b"x").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn read_container_reports_missing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing.lp");
        assert!(matches!(
            read_container(&path),
            Err(LpVaultError::VaultNotFound(p)) if p == path
        ));
    }

    #[test]
    fn read_container_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("junk.lp");
        fs::write(&path, b"definitely not a vault").unwrap();
        assert!(matches!(
            read_container(&path),
            Err(LpVaultError::InvalidContainer(_))
        ));
    }

    #[test]
    fn backup_names_are_timestamped() {
        let now = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 58).unwrap();
        assert_eq!(backup_file_name(now), "lpvault-backup-20240131-235958.lp");
        assert_eq!(
            backup_path(Path::new("backups"), now),
            PathBuf::from("backups/lpvault-backup-20240131-235958.lp")
        );
    }
}
