//! Vault lifecycle: create, unlock, mutate, save, lock.
//!
//! `VaultManager` is the only owner of the master key and of the
//! decrypted vault.  Both live inside a `Session` that exists only
//! while the manager is `Unlocked`; dropping the session (on `lock`, on
//! a failed unlock, or when the manager itself is dropped) wipes them.
//!
//! The manager never touches the filesystem.  `create` and `save` hand
//! back a `VaultContainer` for the host to persist atomically.

use tracing::{debug, info, warn};
use uuid::Uuid;
use zeroize::Zeroize;

use super::backup::{self, ImportReport, MergePolicy};
use super::codec;
use super::collection::Vault;
use super::container::VaultContainer;
use super::entry::Entry;
use super::migrate;
use crate::crypto::kdf::{derive_master_key, generate_salt, SALT_LEN};
use crate::crypto::keys::MasterKey;
use crate::errors::{LpVaultError, Result};

/// Externally visible lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    /// No container yet; only `create` or `unlock` make progress.
    Uninitialized,
    /// A container is known but no key is held.
    Locked,
    /// Key and decrypted vault are in memory.
    Unlocked,
    /// The container decrypted but its document could not be loaded.
    Corrupted,
}

/// Key material plus decrypted contents of an unlocked vault.
struct Session {
    key: MasterKey,
    salt: [u8; SALT_LEN],
    kdf_iterations: u32,
    vault: Vault,
    /// Set by every mutation, cleared by `save`.
    dirty: bool,
}

enum State {
    Uninitialized,
    Locked(VaultContainer),
    Unlocked {
        session: Session,
        /// Last container created, loaded, or saved.
        container: VaultContainer,
    },
    Corrupted(VaultContainer),
}

/// The single-writer vault session owner.
///
/// Not internally synchronized: callers serialize all calls on one
/// instance.  `create`, `unlock` and `import_backup` run the KDF and can
/// block for hundreds of milliseconds.
pub struct VaultManager {
    state: State,
}

impl Default for VaultManager {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultManager {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// A manager with no vault yet.
    pub fn new() -> Self {
        Self {
            state: State::Uninitialized,
        }
    }

    /// A manager holding an existing container, still locked.
    pub fn load(container: VaultContainer) -> Self {
        Self {
            state: State::Locked(container),
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Create an empty vault under `password` and unlock it.
    ///
    /// Returns the initial container; the host should persist it right
    /// away so that `lock` has something to fall back to.
    pub fn create(&mut self, password: &[u8], kdf_iterations: u32) -> Result<VaultContainer> {
        if !matches!(self.state, State::Uninitialized) {
            return Err(LpVaultError::AlreadyInitialized);
        }

        let salt = generate_salt();
        let key = derive_master_key(password, &salt, kdf_iterations)?;
        let vault = Vault::new();

        let plaintext = codec::to_bytes(&vault)?;
        let container = VaultContainer::seal(&key, salt, kdf_iterations, &plaintext)?;

        self.state = State::Unlocked {
            session: Session {
                key,
                salt,
                kdf_iterations,
                vault,
                dirty: false,
            },
            container: container.clone(),
        };
        info!(kdf_iterations, "created new vault");
        Ok(container)
    }

    /// Unlock `container` with `password`.
    ///
    /// On `InvalidCredentials` (wrong password or damaged ciphertext) the
    /// manager ends up `Locked` on `container`.  If decryption succeeds
    /// but the document cannot be loaded it ends up `Corrupted` and the
    /// structural error is returned.  Either way no key is retained.
    pub fn unlock(&mut self, container: VaultContainer, password: &[u8]) -> Result<()> {
        if matches!(self.state, State::Unlocked { .. }) {
            return Err(LpVaultError::AlreadyUnlocked);
        }

        let key = match container.derive_key(password) {
            Ok(key) => key,
            Err(e) => {
                warn!(error = %e, "vault unlock failed: cannot derive key");
                self.state = State::Locked(container);
                return Err(e);
            }
        };

        let plaintext = match container.open(&key) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                warn!("vault unlock failed: authentication mismatch");
                self.state = State::Locked(container);
                return Err(e);
            }
        };

        let (vault, migrated) = match decode_plaintext(&plaintext) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, "vault decrypted but its document is unusable");
                self.state = State::Corrupted(container);
                return Err(e);
            }
        };

        info!(entries = vault.len(), migrated, "vault unlocked");
        self.state = State::Unlocked {
            session: Session {
                key,
                salt: *container.salt(),
                kdf_iterations: container.kdf_iterations(),
                vault,
                dirty: migrated,
            },
            container,
        };
        Ok(())
    }

    /// Unlock the container this manager already holds.
    pub fn unlock_current(&mut self, password: &[u8]) -> Result<()> {
        let container = match std::mem::replace(&mut self.state, State::Uninitialized) {
            State::Locked(container) | State::Corrupted(container) => container,
            other => {
                let err = match other {
                    State::Unlocked { .. } => LpVaultError::AlreadyUnlocked,
                    _ => LpVaultError::NoContainer,
                };
                self.state = other;
                return Err(err);
            }
        };
        self.unlock(container, password)
    }

    /// Serialize and encrypt the current vault under a fresh nonce.
    ///
    /// On error the in-memory vault is left untouched and still dirty.
    pub fn save(&mut self) -> Result<VaultContainer> {
        let State::Unlocked { session, container } = &mut self.state else {
            return Err(LpVaultError::NotUnlocked);
        };

        let plaintext = codec::to_bytes(&session.vault)?;
        let sealed = VaultContainer::seal(
            &session.key,
            session.salt,
            session.kdf_iterations,
            &plaintext,
        )?;

        *container = sealed.clone();
        session.dirty = false;
        debug!(entries = session.vault.len(), "vault sealed");
        Ok(sealed)
    }

    /// Discard the key and decrypted vault.
    ///
    /// Unsaved changes are lost; check `is_dirty` first.  Locking a
    /// manager that is not unlocked is a no-op.
    pub fn lock(&mut self) {
        self.state = match std::mem::replace(&mut self.state, State::Uninitialized) {
            State::Unlocked { session, container } => {
                if session.dirty {
                    warn!("locking vault with unsaved changes");
                }
                drop(session);
                info!("vault locked");
                State::Locked(container)
            }
            other => other,
        };
    }

    /// Switch to a new master password (and optionally a new cost).
    ///
    /// A new salt is generated.  The change takes effect on disk with
    /// the next `save`; until then `lock` returns to the old container.
    pub fn change_password(&mut self, new_password: &[u8], kdf_iterations: Option<u32>) -> Result<()> {
        let session = self.session_mut()?;
        let iterations = kdf_iterations.unwrap_or(session.kdf_iterations);

        let salt = generate_salt();
        let key = derive_master_key(new_password, &salt, iterations)?;

        session.key = key;
        session.salt = salt;
        session.kdf_iterations = iterations;
        session.dirty = true;
        info!(kdf_iterations = iterations, "master password changed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    pub fn state(&self) -> VaultState {
        match self.state {
            State::Uninitialized => VaultState::Uninitialized,
            State::Locked(_) => VaultState::Locked,
            State::Unlocked { .. } => VaultState::Unlocked,
            State::Corrupted(_) => VaultState::Corrupted,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.state() == VaultState::Unlocked
    }

    /// `true` when the unlocked vault has changes not yet sealed by `save`.
    pub fn is_dirty(&self) -> bool {
        matches!(&self.state, State::Unlocked { session, .. } if session.dirty)
    }

    /// The container the manager currently falls back to on `lock`.
    pub fn container(&self) -> Option<&VaultContainer> {
        match &self.state {
            State::Uninitialized => None,
            State::Locked(c) | State::Corrupted(c) => Some(c),
            State::Unlocked { container, .. } => Some(container),
        }
    }

    /// KDF cost the unlocked session will save with.
    pub fn kdf_iterations(&self) -> Result<u32> {
        Ok(self.session()?.kdf_iterations)
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn vault(&self) -> Result<&Vault> {
        Ok(&self.session()?.vault)
    }

    pub fn entry(&self, id: Uuid) -> Result<&Entry> {
        self.vault()?
            .get(id)
            .ok_or(LpVaultError::EntryNotFound(id))
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Add a new entry, returning its id.
    pub fn add_entry(&mut self, entry: Entry) -> Result<Uuid> {
        let session = self.session_mut()?;
        entry.validate()?;
        let id = session.vault.insert(entry)?;
        session.dirty = true;
        debug!(%id, "entry added");
        Ok(id)
    }

    /// Apply `f` to an entry and bump its `modified` timestamp.
    ///
    /// `f` works on a copy; if the edited entry fails validation the
    /// stored entry is left exactly as it was.
    pub fn update_entry<F>(&mut self, id: Uuid, f: F) -> Result<()>
    where
        F: FnOnce(&mut Entry),
    {
        let session = self.session_mut()?;
        let slot = session
            .vault
            .get_mut(id)
            .ok_or(LpVaultError::EntryNotFound(id))?;

        let mut edited = slot.clone();
        f(&mut edited);
        edited.touch();
        if let Err(e) = edited.validate() {
            edited.zeroize();
            return Err(e);
        }

        let mut previous = std::mem::replace(slot, edited);
        previous.zeroize();
        session.dirty = true;
        debug!(%id, "entry updated");
        Ok(())
    }

    /// Remove an entry and hand it back to the caller.
    pub fn delete_entry(&mut self, id: Uuid) -> Result<Entry> {
        let session = self.session_mut()?;
        let removed = session
            .vault
            .remove(id)
            .ok_or(LpVaultError::EntryNotFound(id))?;
        session.dirty = true;
        debug!(%id, "entry deleted");
        Ok(removed)
    }

    /// Flip the favorite flag, returning the new value.
    pub fn toggle_favorite(&mut self, id: Uuid) -> Result<bool> {
        let current = self.entry(id)?.is_favorite();
        self.update_entry(id, |entry| entry.set_favorite(!current))?;
        Ok(!current)
    }

    // ------------------------------------------------------------------
    // Backup / restore
    // ------------------------------------------------------------------

    /// Seal the current vault into an independent container under
    /// `password` (which may differ from the master password).
    pub fn export_backup(&self, password: &[u8], kdf_iterations: u32) -> Result<VaultContainer> {
        let session = self.session()?;
        let container = backup::export(&session.vault, password, kdf_iterations)?;
        info!(entries = session.vault.len(), "vault exported");
        Ok(container)
    }

    /// Open a backup and merge it into the unlocked vault.
    pub fn import_backup(
        &mut self,
        container: &VaultContainer,
        password: &[u8],
        policy: MergePolicy,
    ) -> Result<ImportReport> {
        // Refuse before spending time in the KDF.
        self.session()?;
        let incoming = backup::import(container, password)?;

        let session = self.session_mut()?;
        let report = backup::merge(&mut session.vault, incoming, policy);
        if report.changed() {
            session.dirty = true;
        }
        info!(
            added = report.added,
            replaced = report.replaced,
            renamed = report.renamed,
            removed = report.removed,
            ?policy,
            "backup imported"
        );
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn session(&self) -> Result<&Session> {
        match &self.state {
            State::Unlocked { session, .. } => Ok(session),
            _ => Err(LpVaultError::NotUnlocked),
        }
    }

    fn session_mut(&mut self) -> Result<&mut Session> {
        match &mut self.state {
            State::Unlocked { session, .. } => Ok(session),
            _ => Err(LpVaultError::NotUnlocked),
        }
    }
}

/// Parse, migrate and load decrypted document bytes.
///
/// Returns the vault and whether a schema migration ran.
pub(crate) fn decode_plaintext(plaintext: &[u8]) -> Result<(Vault, bool)> {
    let document = codec::parse_bytes(plaintext)?;
    let upgraded = migrate::upgrade(document)?;
    let migrated = upgraded.was_migrated();
    let vault = codec::deserialize(upgraded.document)?;
    Ok((vault, migrated))
}
