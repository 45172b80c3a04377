//! `lpvault copy`: put an entry's main secret on the clipboard.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{Cli, OpenVault};
use crate::errors::{LpVaultError, Result};
use crate::vault::entry::{Entry, EntryKind};

/// Execute the `copy` command.
pub fn execute(cli: &Cli, id: &str) -> Result<()> {
    let open = OpenVault::open(cli)?;
    if !open.settings.clipboard {
        return Err(LpVaultError::Config(
            "clipboard access is disabled in .lpvault.toml".into(),
        ));
    }

    let id = open.resolve(id)?;
    let entry = open.manager.entry(id)?;
    let (label, value) = main_secret(entry)?;

    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| LpVaultError::CommandFailed(format!("clipboard unavailable: {e}")))?;
    clipboard
        .set_text(value.as_str())
        .map_err(|e| LpVaultError::CommandFailed(format!("clipboard write failed: {e}")))?;

    output::success(&format!("Copied {label} of '{}' to the clipboard", entry.title()));
    output::tip("Clear your clipboard when you are done.");
    Ok(())
}

/// The field `copy` puts on the clipboard for each kind of entry.
fn main_secret(entry: &Entry) -> Result<(&'static str, Zeroizing<String>)> {
    match entry.kind() {
        EntryKind::Login(login) => Ok(("password", Zeroizing::new(login.password.clone()))),
        EntryKind::Note(note) => Ok(("note", Zeroizing::new(note.body.clone()))),
        EntryKind::Card(card) => Ok(("card number", Zeroizing::new(card.number.clone()))),
        EntryKind::Identity(_) | EntryKind::File(_) => Err(LpVaultError::CommandFailed(format!(
            "{} entries have no single secret to copy; use `lpvault show --reveal`",
            entry.kind().label()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::entry::{Card, Identity, Login};

    #[test]
    fn copies_login_password() {
        let entry = Entry::new(
            "Mail",
            EntryKind::Login(Login {
                username: "ada".into(),
                password: "s3cret".into(),
                url: String::new(),
            }),
        );
        let (label, value) = main_secret(&entry).unwrap();
        assert_eq!(label, "password");
        assert_eq!(value.as_str(), "s3cret");
    }

    #[test]
    fn copies_card_number() {
        let entry = Entry::new(
            "Visa",
            EntryKind::Card(Card {
                number: "4111111111111111".into(),
                ..Card::default()
            }),
        );
        assert_eq!(main_secret(&entry).unwrap().1.as_str(), "4111111111111111");
    }

    #[test]
    fn identity_has_nothing_to_copy() {
        let entry = Entry::new("Me", EntryKind::Identity(Identity::default()));
        assert!(main_secret(&entry).is_err());
    }
}
