//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{LpVaultError, Result};
use crate::storage;
use crate::vault::{Vault, VaultManager};

/// Minimum password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable consulted before prompting for the master password.
pub const PASSWORD_ENV: &str = "LPVAULT_PASSWORD";

/// Environment variable consulted before prompting for a backup password.
pub const BACKUP_PASSWORD_ENV: &str = "LPVAULT_BACKUP_PASSWORD";

/// LpVault CLI: offline encrypted vault for logins, notes, cards,
/// identities and files.
#[derive(Parser)]
#[command(
    name = "lpvault",
    about = "Offline encrypted vault for logins, notes, cards, identities and files",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the vault and `.lpvault.toml` (default: current dir)
    #[arg(long, default_value = ".", global = true)]
    pub dir: PathBuf,
}

/// All available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new, empty vault
    Init,

    /// List entries
    List {
        /// Only entries in this category
        #[arg(short, long)]
        category: Option<String>,
        /// Only favorites
        #[arg(short, long)]
        favorites: bool,
        /// Case-insensitive search over titles, categories, usernames, URLs
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one entry
    Show {
        /// Entry id or unique id prefix
        id: String,
        /// Print secret fields in clear text
        #[arg(long)]
        reveal: bool,
    },

    /// Copy an entry's main secret to the clipboard
    Copy {
        /// Entry id or unique id prefix
        id: String,
    },

    /// Add an entry
    Add {
        #[command(subcommand)]
        kind: AddKind,
    },

    /// Delete an entry
    Delete {
        /// Entry id or unique id prefix
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Toggle an entry's favorite flag
    Favorite {
        /// Entry id or unique id prefix
        id: String,
    },

    /// Change the master password
    Passwd,

    /// Write an encrypted backup of the vault
    Backup {
        /// Output file (default: <backup_dir>/lpvault-backup-<timestamp>.lp)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Protect the backup with its own password
        #[arg(long)]
        password: bool,
    },

    /// Merge a backup into the vault
    Restore {
        /// Backup file
        file: PathBuf,
        /// How backup entries combine with existing ones
        #[arg(long, value_parser = ["replace", "overwrite", "keep-both"])]
        policy: String,
        /// Skip confirmation prompt for `--policy replace`
        #[arg(short, long)]
        force: bool,
    },

    /// Show a vault or backup file's header without decrypting it
    Info {
        /// Vault or backup file
        file: PathBuf,
    },

    /// Generate a random password
    Generate {
        /// Password length
        #[arg(short, long, default_value_t = 16)]
        length: usize,
        /// Leave out uppercase letters
        #[arg(long)]
        no_uppercase: bool,
        /// Leave out digits
        #[arg(long)]
        no_digits: bool,
        /// Leave out symbols
        #[arg(long)]
        no_symbols: bool,
        /// Allow look-alike characters (l 1 I O 0 S 5)
        #[arg(long)]
        allow_similar: bool,
    },
}

/// Entry kinds accepted by `add`.
///
/// Secret fields are never taken from the command line; they are
/// prompted for, or read line by line from stdin when it is piped.
#[derive(Subcommand)]
pub enum AddKind {
    /// A website or app login (password is prompted)
    Login {
        title: String,
        #[arg(short, long, default_value = "")]
        username: String,
        #[arg(long, default_value = "")]
        url: String,
        /// Generate a random password instead of prompting
        #[arg(short, long)]
        generate: bool,
        #[command(flatten)]
        options: EntryOptions,
    },

    /// A secure note (body is prompted)
    Note {
        title: String,
        #[command(flatten)]
        options: EntryOptions,
    },

    /// A payment card (number and security code are prompted)
    Card {
        title: String,
        #[arg(long, default_value = "")]
        card_type: String,
        #[arg(long, default_value = "")]
        holder: String,
        /// Expiry month, e.g. 07
        #[arg(long, default_value = "")]
        expiry_month: String,
        /// Expiry year, e.g. 2029
        #[arg(long, default_value = "")]
        expiry_year: String,
        #[command(flatten)]
        options: EntryOptions,
    },

    /// A personal identity (document numbers are prompted)
    Identity {
        title: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long, default_value = "")]
        state: String,
        #[arg(long, default_value = "")]
        zip_code: String,
        #[arg(long, default_value = "")]
        country: String,
        #[arg(long, default_value = "")]
        date_of_birth: String,
        #[command(flatten)]
        options: EntryOptions,
    },

    /// A stored file
    File {
        /// File to store
        path: PathBuf,
        /// Title (default: the file name)
        #[arg(short, long)]
        title: Option<String>,
        #[command(flatten)]
        options: EntryOptions,
    },
}

/// Fields shared by every entry kind.
#[derive(Args)]
pub struct EntryOptions {
    /// Category (default depends on the entry kind)
    #[arg(short, long)]
    pub category: Option<String>,
    /// Free-form notes
    #[arg(short, long)]
    pub notes: Option<String>,
    /// Mark as favorite
    #[arg(long)]
    pub favorite: bool,
    /// Attach a file (repeatable)
    #[arg(long = "attach")]
    pub attachments: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the master password, trying in order:
/// 1. `LPVAULT_PASSWORD` env var (scripts)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env(PASSWORD_ENV) {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter vault password")
        .interact()
        .map_err(|e| LpVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation (used by `init` and `passwd`).
///
/// Also respects `LPVAULT_PASSWORD` for scripted usage.
/// Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    new_password(PASSWORD_ENV, "vault")
}

/// Like `prompt_new_password` but for a backup-only password.
pub fn prompt_new_backup_password() -> Result<Zeroizing<String>> {
    new_password(BACKUP_PASSWORD_ENV, "backup")
}

/// Password for opening a backup that was not sealed with the master password.
pub fn prompt_backup_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env(BACKUP_PASSWORD_ENV) {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter backup password")
        .interact()
        .map_err(|e| LpVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

fn password_from_env(var: &str) -> Option<Zeroizing<String>> {
    match std::env::var(var) {
        Ok(pw) if !pw.is_empty() => Some(Zeroizing::new(pw)),
        _ => None,
    }
}

fn new_password(env_var: &str, what: &str) -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env(env_var) {
        if pw.len() < MIN_PASSWORD_LEN {
            return Err(LpVaultError::CommandFailed(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        return Ok(pw);
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt(format!("Choose {what} password"))
            .with_confirmation(
                format!("Confirm {what} password"),
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| LpVaultError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Read one secret value.
///
/// When stdin is piped, the next line of stdin is used; otherwise the
/// user is prompted without echo.  Empty values are allowed.
pub fn read_secret(label: &str) -> Result<Zeroizing<String>> {
    if !io::stdin().is_terminal() {
        let mut line = Zeroizing::new(String::new());
        io::stdin().read_line(&mut line)?;
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        return Ok(line);
    }

    let value = dialoguer::Password::new()
        .with_prompt(label)
        .allow_empty_password(true)
        .interact()
        .map_err(|e| LpVaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(value))
}

/// Ask a yes/no question, defaulting to "no".
pub fn confirm(prompt: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| LpVaultError::CommandFailed(format!("confirm prompt: {e}")))
}

/// Absolute vault directory from `--dir`.
pub fn vault_dir(cli: &Cli) -> Result<PathBuf> {
    if cli.dir.is_absolute() {
        Ok(cli.dir.clone())
    } else {
        Ok(std::env::current_dir()?.join(&cli.dir))
    }
}

/// Resolve an id argument: a full UUID, or a prefix matching one entry.
pub fn resolve_id(vault: &Vault, arg: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(arg) {
        return if vault.contains(id) {
            Ok(id)
        } else {
            Err(LpVaultError::EntryNotFound(id))
        };
    }
    vault
        .find_by_id_prefix(arg)
        .map(|entry| entry.id())
        .ok_or_else(|| {
            LpVaultError::CommandFailed(format!("no single entry matches id prefix '{arg}'"))
        })
}

/// An unlocked vault together with where it lives on disk.
pub struct OpenVault {
    pub dir: PathBuf,
    pub path: PathBuf,
    pub settings: Settings,
    pub manager: VaultManager,
    /// Master password used to unlock, kept for backup and restore.
    pub password: Zeroizing<String>,
}

impl OpenVault {
    /// Load settings, read the vault file, and unlock it with the
    /// master password.
    pub fn open(cli: &Cli) -> Result<Self> {
        let dir = vault_dir(cli)?;
        let settings = Settings::load(&dir)?;
        let path = settings.vault_path(&dir);

        let container = storage::read_container(&path)?;
        let password = prompt_password()?;

        let mut manager = VaultManager::load(container);
        manager.unlock_current(password.as_bytes())?;

        if manager.is_dirty() {
            output::info("Vault was upgraded to the current format; it will be rewritten on save.");
        }

        Ok(Self {
            dir,
            path,
            settings,
            manager,
            password,
        })
    }

    pub fn vault(&self) -> Result<&Vault> {
        self.manager.vault()
    }

    /// Resolve an id argument against this vault.
    pub fn resolve(&self, arg: &str) -> Result<Uuid> {
        resolve_id(self.manager.vault()?, arg)
    }

    /// Seal the current state and write it atomically.
    pub fn save(&mut self) -> Result<()> {
        let container = self.manager.save()?;
        storage::write_container(&self.path, &container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::entry::{Entry, EntryKind, Note};

    fn vault_with(titles: &[&str]) -> (Vault, Vec<Uuid>) {
        let mut vault = Vault::new();
        let ids = titles
            .iter()
            .map(|t| {
                vault
                    .insert(Entry::new(*t, EntryKind::Note(Note::default())))
                    .unwrap()
            })
            .collect();
        (vault, ids)
    }

    #[test]
    fn resolve_full_id() {
        let (vault, ids) = vault_with(&["a"]);
        assert_eq!(resolve_id(&vault, &ids[0].to_string()).unwrap(), ids[0]);
    }

    #[test]
    fn resolve_unknown_full_id() {
        let (vault, _) = vault_with(&["a"]);
        let other = Uuid::new_v4();
        assert!(matches!(
            resolve_id(&vault, &other.to_string()),
            Err(LpVaultError::EntryNotFound(id)) if id == other
        ));
    }

    #[test]
    fn resolve_prefix() {
        let (vault, ids) = vault_with(&["a"]);
        let prefix = &ids[0].to_string()[..6];
        assert_eq!(resolve_id(&vault, prefix).unwrap(), ids[0]);
        assert!(resolve_id(&vault, "zzzz").is_err());
        // A single entry is not picked by an empty argument.
        assert!(resolve_id(&vault, "").is_err());
    }

    #[test]
    fn cli_parses_restore_policy() {
        let cli = Cli::try_parse_from(["lpvault", "restore", "b.lp", "--policy", "keep-both"]).unwrap();
        match cli.command {
            Commands::Restore { policy, .. } => assert_eq!(policy, "keep-both"),
            _ => panic!("expected restore"),
        }
        assert!(Cli::try_parse_from(["lpvault", "restore", "b.lp", "--policy", "merge"]).is_err());
    }

    #[test]
    fn cli_parses_add_login() {
        let cli = Cli::try_parse_from([
            "lpvault", "--dir", "/tmp/v", "add", "login", "Mail", "-u", "ada", "--attach", "a.txt",
            "--attach", "b.txt",
        ])
        .unwrap();
        assert_eq!(cli.dir, PathBuf::from("/tmp/v"));
        match cli.command {
            Commands::Add {
                kind: AddKind::Login {
                    title,
                    username,
                    options,
                    ..
                },
            } => {
                assert_eq!(title, "Mail");
                assert_eq!(username, "ada");
                assert_eq!(options.attachments.len(), 2);
            }
            _ => panic!("expected add login"),
        }
    }
}
