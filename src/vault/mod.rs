//! Vault module: records, the encrypted container, and the session owner.
//!
//! This module provides:
//! - The record model: `Entry`, `EntryKind` and its variants (`entry`)
//! - Display helpers for card and phone numbers (`formatting`)
//! - The in-memory record set `Vault` (`collection`)
//! - The versioned vault document codec (`codec`) and its upgrades (`migrate`)
//! - The binary `VaultContainer` format (`container`)
//! - The lifecycle owner `VaultManager` (`manager`)
//! - Backup export and merge-on-import (`backup`)

pub mod backup;
pub mod codec;
pub mod collection;
pub mod container;
pub mod entry;
pub mod formatting;
pub mod manager;
pub mod migrate;

// Re-export the most commonly used items.
pub use backup::{ImportReport, MergePolicy};
pub use collection::Vault;
pub use container::{ContainerInfo, VaultContainer};
pub use entry::{Card, Entry, EntryKind, FileAttachment, FileKind, Identity, Login, Note};
pub use manager::{VaultManager, VaultState};
