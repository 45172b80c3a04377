//! `lpvault add`: create a new entry.
//!
//! Non-secret fields come from flags.  Secret fields (passwords, card
//! numbers, note bodies, document numbers) are prompted for, or read
//! one line each from stdin when it is piped.

use std::fs;
use std::path::Path;

use crate::cli::output;
use crate::cli::{read_secret, AddKind, Cli, EntryOptions, OpenVault};
use crate::errors::{LpVaultError, Result};
use crate::generator::{generate_password, GeneratorOptions};
use crate::vault::entry::{Card, Entry, EntryKind, FileAttachment, Identity, Login, Note};

/// Execute the `add` command.
pub fn execute(cli: &Cli, kind: &AddKind) -> Result<()> {
    let mut open = OpenVault::open(cli)?;

    let (entry, options) = build_entry(kind)?;
    let entry = apply_options(entry, options)?;
    let title = entry.title().to_string();
    let label = entry.kind().label();

    let id = open.manager.add_entry(entry)?;
    open.save()?;

    output::success(&format!(
        "Added {label} '{title}' ({})",
        &id.to_string()[..8]
    ));
    Ok(())
}

fn build_entry(kind: &AddKind) -> Result<(Entry, &EntryOptions)> {
    let built = match kind {
        AddKind::Login {
            title,
            username,
            url,
            generate,
            options,
        } => {
            let password = if *generate {
                let pw = generate_password(&GeneratorOptions::default())?;
                output::info("Generated a random password.");
                pw
            } else {
                read_secret("Password")?
            };
            let login = Login {
                username: username.clone(),
                password: password.to_string(),
                url: url.clone(),
            };
            (Entry::new(title.as_str(), EntryKind::Login(login)), options)
        }

        AddKind::Note { title, options } => {
            let body = read_secret("Note")?;
            let note = Note {
                body: body.to_string(),
            };
            (Entry::new(title.as_str(), EntryKind::Note(note)), options)
        }

        AddKind::Card {
            title,
            card_type,
            holder,
            expiry_month,
            expiry_year,
            options,
        } => {
            let number = read_secret("Card number")?;
            let security_code = read_secret("Security code")?;
            let card = Card {
                card_type: card_type.clone(),
                cardholder_name: holder.clone(),
                number: number.chars().filter(|c| !c.is_whitespace()).collect(),
                expiry_month: expiry_month.clone(),
                expiry_year: expiry_year.clone(),
                security_code: security_code.to_string(),
            };
            (Entry::new(title.as_str(), EntryKind::Card(card)), options)
        }

        AddKind::Identity {
            title,
            first_name,
            last_name,
            email,
            phone,
            address,
            city,
            state,
            zip_code,
            country,
            date_of_birth,
            options,
        } => {
            let identity = Identity {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                email: email.clone(),
                phone: phone.clone(),
                address: address.clone(),
                city: city.clone(),
                state: state.clone(),
                zip_code: zip_code.clone(),
                country: country.clone(),
                date_of_birth: date_of_birth.clone(),
                social_security_number: read_secret("Social security number (optional)")?
                    .to_string(),
                driver_license: read_secret("Driver license (optional)")?.to_string(),
                passport_number: read_secret("Passport number (optional)")?.to_string(),
            };
            (Entry::new(title.as_str(), EntryKind::Identity(identity)), options)
        }

        AddKind::File {
            path,
            title,
            options,
        } => {
            let file = load_file(path)?;
            let title = title
                .clone()
                .unwrap_or_else(|| file.file_name().to_string());
            (Entry::new(title, EntryKind::File(file)), options)
        }
    };
    Ok(built)
}

fn apply_options(mut entry: Entry, options: &EntryOptions) -> Result<Entry> {
    if let Some(category) = &options.category {
        entry = entry.with_category(category.as_str());
    }
    if let Some(notes) = &options.notes {
        entry = entry.with_notes(notes.as_str());
    }
    if options.favorite {
        entry = entry.with_favorite(true);
    }
    for path in &options.attachments {
        entry.attach(load_file(path)?);
    }
    Ok(entry)
}

/// Read a file from disk into an attachment.
///
/// The stored type is the lowercased extension.
pub fn load_file(path: &Path) -> Result<FileAttachment> {
    if !path.is_file() {
        return Err(LpVaultError::CommandFailed(format!(
            "not a readable file: {}",
            path.display()
        )));
    }
    let data = fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_type = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    Ok(FileAttachment::new(file_name, file_type, data))
}
