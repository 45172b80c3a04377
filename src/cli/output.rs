//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::entry::{Entry, EntryKind, FileAttachment};
use crate::vault::formatting::{format_card_number, format_phone_number, mask_card_number};
use crate::vault::ContainerInfo;

/// Shown instead of a secret value unless `--reveal` is given.
const HIDDEN: &str = "••••••••";

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// First eight characters of an id, enough to address an entry.
pub fn short_id(entry: &Entry) -> String {
    entry.id().to_string()[..8].to_string()
}

/// Print a table of entries (Id, Title, Type, Category, Summary, Modified).
pub fn print_entries_table(entries: &[&Entry]) {
    if entries.is_empty() {
        info("No matching entries.");
        tip("Run `lpvault add <kind> <title>` to add one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "", "Title", "Type", "Category", "Summary", "Modified"]);

    for e in entries {
        table.add_row(vec![
            short_id(e),
            if e.is_favorite() { "\u{2605}".to_string() } else { String::new() },
            e.title().to_string(),
            e.kind().label().to_string(),
            e.category().to_string(),
            e.summary(),
            e.modified().format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }

    println!("{table}");
}

/// Print every field of one entry.  Secret fields are masked unless
/// `reveal` is set.
pub fn print_entry(entry: &Entry, reveal: bool) {
    let secret = |value: &str| -> String {
        if reveal || value.is_empty() {
            value.to_string()
        } else {
            HIDDEN.to_string()
        }
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut row = |name: &str, value: String| {
        if !value.is_empty() {
            table.add_row(vec![name.to_string(), value]);
        }
    };

    row("Id", entry.id().to_string());
    row("Title", entry.title().to_string());
    row("Type", entry.kind().label().to_string());
    row("Category", entry.category().to_string());
    if entry.is_favorite() {
        row("Favorite", "yes".to_string());
    }

    match entry.kind() {
        EntryKind::Login(login) => {
            row("Username", login.username.clone());
            row("Password", secret(&login.password));
            row("URL", login.url.clone());
        }
        EntryKind::Note(note) => {
            row("Body", secret(&note.body));
        }
        EntryKind::Card(card) => {
            row("Card type", card.card_type.clone());
            row("Cardholder", card.cardholder_name.clone());
            let number = if reveal {
                format_card_number(&card.number)
            } else {
                mask_card_number(&card.number)
            };
            row("Number", number);
            row("Expiry", card.expiry());
            row("Security code", secret(&card.security_code));
        }
        EntryKind::Identity(id) => {
            row("Name", id.full_name());
            row("Email", id.email.clone());
            row("Phone", format_phone_number(&id.phone));
            row("Address", id.address.clone());
            row("City", id.city.clone());
            row("State", id.state.clone());
            row("ZIP", id.zip_code.clone());
            row("Country", id.country.clone());
            row("Date of birth", id.date_of_birth.clone());
            row("SSN", secret(&id.social_security_number));
            row("Driver license", secret(&id.driver_license));
            row("Passport", secret(&id.passport_number));
        }
        EntryKind::File(file) => {
            row("File", describe_file(file));
        }
    }

    if let Some(notes) = entry.notes() {
        row("Notes", notes.to_string());
    }
    for (i, file) in entry.attachments().iter().enumerate() {
        row(&format!("Attachment {}", i + 1), describe_file(file));
    }
    row("Created", entry.created().format("%Y-%m-%d %H:%M:%S UTC").to_string());
    row("Modified", entry.modified().format("%Y-%m-%d %H:%M:%S UTC").to_string());

    println!("{table}");
}

fn describe_file(file: &FileAttachment) -> String {
    format!(
        "{} ({}, {:?})",
        file.file_name(),
        file.formatted_size(),
        file.file_kind()
    )
}

/// Print a container header summary.
pub fn print_container_info(info: &ContainerInfo, file_size: u64) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec!["Format version".to_string(), info.format_version.to_string()]);
    table.add_row(vec!["KDF".to_string(), "PBKDF2-HMAC-SHA256".to_string()]);
    table.add_row(vec!["KDF iterations".to_string(), info.kdf_iterations.to_string()]);
    table.add_row(vec!["Salt".to_string(), format!("{} bytes", info.salt_len)]);
    table.add_row(vec!["Cipher".to_string(), "AES-256-GCM".to_string()]);
    table.add_row(vec!["Payload".to_string(), format!("{} bytes", info.payload_len)]);
    table.add_row(vec!["File size".to_string(), format!("{file_size} bytes")]);
    println!("{table}");
}
