//! Backup export and import.
//!
//! A backup is an ordinary `VaultContainer` with its own salt and
//! password.  Importing merges the backup's entries into a live vault
//! under an explicit `MergePolicy`; nothing is ever merged implicitly.

use std::fmt;
use std::str::FromStr;

use zeroize::Zeroize;

use super::codec;
use super::collection::Vault;
use super::container::VaultContainer;
use super::manager::decode_plaintext;
use crate::crypto::kdf::{derive_master_key, generate_salt};
use crate::errors::{LpVaultError, Result};

/// How incoming backup entries combine with the live vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Drop every live entry, then take the backup as-is.
    Replace,
    /// Backup entries win on id collision; other live entries stay.
    OverwriteById,
    /// Keep both sides; colliding backup entries get fresh ids.
    KeepBoth,
}

impl MergePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::OverwriteById => "overwrite",
            Self::KeepBoth => "keep-both",
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergePolicy {
    type Err = LpVaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "overwrite" | "overwrite-by-id" => Ok(Self::OverwriteById),
            "keep-both" | "keep_both" => Ok(Self::KeepBoth),
            other => Err(LpVaultError::Config(format!(
                "unknown merge policy '{other}' (expected replace, overwrite, keep-both)"
            ))),
        }
    }
}

/// What an import did to the live vault.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Backup entries inserted under their own id.
    pub added: usize,
    /// Live entries overwritten by a backup entry with the same id.
    pub replaced: usize,
    /// Backup entries inserted under a fresh id to avoid a collision.
    pub renamed: usize,
    /// Live entries dropped by `MergePolicy::Replace`.
    pub removed: usize,
}

impl ImportReport {
    /// `true` if the live vault was modified at all.
    pub fn changed(&self) -> bool {
        self.added + self.replaced + self.renamed + self.removed > 0
    }
}

/// Seal `vault` into a new container under `password` with a fresh salt.
pub fn export(vault: &Vault, password: &[u8], kdf_iterations: u32) -> Result<VaultContainer> {
    let salt = generate_salt();
    let key = derive_master_key(password, &salt, kdf_iterations)?;
    let plaintext = codec::to_bytes(vault)?;
    VaultContainer::seal(&key, salt, kdf_iterations, &plaintext)
}

/// Open a backup container and load its vault, migrating old schemas.
pub fn import(container: &VaultContainer, password: &[u8]) -> Result<Vault> {
    let key = container.derive_key(password)?;
    let plaintext = container.open(&key)?;
    let (vault, _) = decode_plaintext(&plaintext)?;
    Ok(vault)
}

/// Merge `incoming` into `live` according to `policy`.
pub fn merge(live: &mut Vault, mut incoming: Vault, policy: MergePolicy) -> ImportReport {
    let mut report = ImportReport::default();

    if policy == MergePolicy::Replace {
        report.removed = live.clear();
    }

    for mut entry in incoming.drain() {
        let id = entry.id();
        if !live.contains(id) {
            live.upsert(entry);
            report.added += 1;
            continue;
        }

        match policy {
            // `live` was emptied above, so ids only repeat if the
            // backup itself had duplicates, which the codec rejects.
            MergePolicy::Replace | MergePolicy::OverwriteById => {
                if let Some(mut previous) = live.upsert(entry) {
                    previous.zeroize();
                }
                report.replaced += 1;
            }
            MergePolicy::KeepBoth => {
                while live.contains(entry.id()) {
                    entry.reassign_id();
                }
                live.upsert(entry);
                report.renamed += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kdf::MIN_ITERATIONS;
    use crate::vault::entry::{Entry, EntryKind, Note};

    fn note(title: &str, body: &str) -> Entry {
        Entry::new(title, EntryKind::Note(Note { body: body.into() }))
    }

    fn body_of(vault: &Vault, title: &str) -> Vec<String> {
        vault
            .iter()
            .filter(|e| e.title() == title)
            .map(|e| match e.kind() {
                EntryKind::Note(n) => n.body.clone(),
                _ => String::new(),
            })
            .collect()
    }

    /// A live vault with {shared, only_live} and an incoming one with
    /// {shared (edited), only_backup}.
    fn fixture() -> (Vault, Vault) {
        let shared = note("shared", "live");
        let mut edited = shared.clone();
        edited.set_kind(EntryKind::Note(Note {
            body: "backup".into(),
        }));

        let mut live = Vault::new();
        live.insert(shared).unwrap();
        live.insert(note("only_live", "x")).unwrap();

        let mut incoming = Vault::new();
        incoming.insert(edited).unwrap();
        incoming.insert(note("only_backup", "y")).unwrap();
        (live, incoming)
    }

    #[test]
    fn replace_discards_live_entries() {
        let (mut live, incoming) = fixture();
        let report = merge(&mut live, incoming, MergePolicy::Replace);

        assert_eq!(report.removed, 2);
        assert_eq!(report.added, 2);
        assert_eq!(live.len(), 2);
        assert!(body_of(&live, "only_live").is_empty());
        assert_eq!(body_of(&live, "shared"), vec!["backup"]);
    }

    #[test]
    fn overwrite_by_id_prefers_backup() {
        let (mut live, incoming) = fixture();
        let report = merge(&mut live, incoming, MergePolicy::OverwriteById);

        assert_eq!(
            report,
            ImportReport {
                added: 1,
                replaced: 1,
                renamed: 0,
                removed: 0
            }
        );
        assert_eq!(live.len(), 3);
        assert_eq!(body_of(&live, "shared"), vec!["backup"]);
    }

    #[test]
    fn keep_both_renames_collisions() {
        let (mut live, incoming) = fixture();
        let report = merge(&mut live, incoming, MergePolicy::KeepBoth);

        assert_eq!(report.renamed, 1);
        assert_eq!(report.added, 1);
        assert_eq!(live.len(), 4);
        let mut bodies = body_of(&live, "shared");
        bodies.sort();
        assert_eq!(bodies, vec!["backup", "live"]);
    }

    #[test]
    fn empty_backup_changes_nothing() {
        let (mut live, _) = fixture();
        let report = merge(&mut live, Vault::new(), MergePolicy::OverwriteById);
        assert!(!report.changed());
        assert_eq!(live.len(), 2);
    }

    #[test]
    fn export_uses_its_own_password() {
        let (live, _) = fixture();
        let container = export(&live, b"backup-pw", MIN_ITERATIONS).unwrap();

        assert!(matches!(
            import(&container, b"wrong"),
            Err(LpVaultError::InvalidCredentials)
        ));
        let restored = import(&container, b"backup-pw").unwrap();
        assert_eq!(restored.len(), 2);
    }

    #[test]
    fn policy_parsing() {
        assert_eq!("replace".parse::<MergePolicy>().unwrap(), MergePolicy::Replace);
        assert_eq!(
            "Overwrite".parse::<MergePolicy>().unwrap(),
            MergePolicy::OverwriteById
        );
        assert_eq!("keep-both".parse::<MergePolicy>().unwrap(), MergePolicy::KeepBoth);
        assert!("merge".parse::<MergePolicy>().is_err());
        assert_eq!(MergePolicy::KeepBoth.to_string(), "keep-both");
    }
}
