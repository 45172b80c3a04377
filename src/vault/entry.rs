//! Entry types stored inside a vault.
//!
//! An `Entry` carries the fields every record shares (id, title,
//! category, timestamps, ...) plus an `EntryKind`, the closed set of
//! record variants.  Both serialize into one flat JSON object with a
//! `"type"` tag, which is the shape the codec writes into the
//! encrypted document.
//!
//! `id`, `created` and `modified` are not writable from outside this
//! module.  Every mutator bumps `modified`, never moving it backwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use zeroize::Zeroize;

use super::formatting::mask_card_number;
use crate::errors::{LpVaultError, Result};

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// A single record in the vault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Zeroize)]
pub struct Entry {
    #[zeroize(skip)]
    id: Uuid,

    title: String,

    category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,

    #[serde(default)]
    is_favorite: bool,

    #[zeroize(skip)]
    created: DateTime<Utc>,

    #[zeroize(skip)]
    modified: DateTime<Utc>,

    /// Files attached to a non-file entry (e.g. a scanned card).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<FileAttachment>,

    #[serde(flatten)]
    kind: EntryKind,
}

impl Entry {
    /// Create a new entry with a fresh id and the variant's default category.
    pub fn new(title: impl Into<String>, kind: EntryKind) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            category: kind.default_category().to_string(),
            notes: None,
            is_favorite: false,
            created: now,
            modified: now,
            attachments: Vec::new(),
            kind,
        }
    }

    /// Builder-style category override, for use before insertion.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Builder-style notes, for use before insertion.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Builder-style favorite flag, for use before insertion.
    pub fn with_favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    pub fn attachments(&self) -> &[FileAttachment] {
        &self.attachments
    }

    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    // ------------------------------------------------------------------
    // Mutators (each one bumps `modified`)
    // ------------------------------------------------------------------

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
        self.touch();
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes;
        self.touch();
    }

    pub fn set_favorite(&mut self, is_favorite: bool) {
        self.is_favorite = is_favorite;
        self.touch();
    }

    /// Replace the variant payload wholesale (the variant may change).
    pub fn set_kind(&mut self, kind: EntryKind) {
        self.kind = kind;
        self.touch();
    }

    /// Edit the variant payload in place.
    pub fn edit_kind<F>(&mut self, f: F)
    where
        F: FnOnce(&mut EntryKind),
    {
        f(&mut self.kind);
        self.touch();
    }

    pub fn attach(&mut self, file: FileAttachment) {
        self.attachments.push(file);
        self.touch();
    }

    /// Remove the attachment at `index`, if there is one.
    pub fn detach(&mut self, index: usize) -> Option<FileAttachment> {
        if index >= self.attachments.len() {
            return None;
        }
        let removed = self.attachments.remove(index);
        self.touch();
        Some(removed)
    }

    /// Advance `modified` to now, but never backwards (clocks can step).
    pub(crate) fn touch(&mut self) {
        let now = Utc::now();
        if now > self.modified {
            self.modified = now;
        }
    }

    /// Give this entry a fresh id (used when importing with keep-both).
    pub(crate) fn reassign_id(&mut self) {
        self.id = Uuid::new_v4();
    }

    // ------------------------------------------------------------------
    // Validation and documents
    // ------------------------------------------------------------------

    /// Check the invariants a caller-built entry must satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(LpVaultError::InvalidEntry("title cannot be empty".into()));
        }
        if self.modified < self.created {
            return Err(LpVaultError::InvalidEntry(
                "modified timestamp precedes created timestamp".into(),
            ));
        }
        Ok(())
    }

    /// Convert to a self-describing JSON object (lossless).
    pub fn to_document(&self) -> Result<Value> {
        serde_json::to_value(self)
            .map_err(|e| LpVaultError::MalformedEntry(format!("entry {}: {e}", self.id)))
    }

    /// Build an entry from a JSON object produced by `to_document`.
    pub fn from_document(value: Value) -> Result<Self> {
        let entry: Entry =
            serde_json::from_value(value).map_err(|e| LpVaultError::MalformedEntry(e.to_string()))?;
        if entry.modified < entry.created {
            return Err(LpVaultError::MalformedEntry(format!(
                "entry {} was modified before it was created",
                entry.id
            )));
        }
        Ok(entry)
    }

    /// A one-line, non-secret description for list views.
    pub fn summary(&self) -> String {
        match &self.kind {
            EntryKind::Login(login) => {
                if login.url.is_empty() {
                    login.username.clone()
                } else {
                    format!("{} @ {}", login.username, login.url)
                }
            }
            EntryKind::Note(note) => note.body.lines().next().unwrap_or_default().to_string(),
            EntryKind::Card(card) => {
                format!("{} {}", card.card_type, mask_card_number(&card.number))
                    .trim()
                    .to_string()
            }
            EntryKind::Identity(identity) => identity.full_name(),
            EntryKind::File(file) => format!("{} ({})", file.file_name(), file.formatted_size()),
        }
    }
}

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

/// The closed set of record variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Zeroize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    Login(Login),
    Note(Note),
    Card(Card),
    Identity(Identity),
    File(FileAttachment),
}

impl EntryKind {
    /// Human-readable variant name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Login(_) => "Login",
            Self::Note(_) => "Note",
            Self::Card(_) => "Card",
            Self::Identity(_) => "Identity",
            Self::File(_) => "File",
        }
    }

    /// Category given to new entries of this variant.
    pub fn default_category(&self) -> &'static str {
        match self {
            Self::Login(_) | Self::Note(_) => "General",
            Self::Card(_) => "Cards",
            Self::Identity(_) => "Identity",
            Self::File(_) => "Files",
        }
    }
}

/// Website or application credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct Login {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub url: String,
}

/// Free-form secure note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct Note {
    pub body: String,
}

/// Payment card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct Card {
    /// Network or brand (Visa, Mastercard, ...).
    #[serde(default)]
    pub card_type: String,
    pub cardholder_name: String,
    pub number: String,
    pub expiry_month: String,
    pub expiry_year: String,
    #[serde(default)]
    pub security_code: String,
}

impl Card {
    /// `MM/YY`-style expiry string.
    pub fn expiry(&self) -> String {
        let year = self.expiry_year.trim();
        let short = match year.get(2..) {
            Some(tail) if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) => tail,
            _ => year,
        };
        format!("{}/{}", self.expiry_month.trim(), short)
    }
}

/// Personal identity record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct Identity {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub social_security_number: String,
    #[serde(default)]
    pub driver_license: String,
    #[serde(default)]
    pub passport_number: String,
}

impl Identity {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// File attachments
// ---------------------------------------------------------------------------

const IMAGE_EXTENSIONS: &[&str] = &["bmp", "gif", "jpg", "jpeg", "png", "svg", "tiff", "webp"];
const DOCUMENT_EXTENSIONS: &[&str] = &["doc", "docx", "odt", "pdf", "pages", "rtf", "txt"];
const ARCHIVE_EXTENSIONS: &[&str] = &["7z", "bz2", "gz", "rar", "tar", "zip"];

/// Broad classification of a file by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Document,
    Archive,
    Other,
}

/// An owned copy of a file's bytes plus its metadata.
///
/// The size is always the payload length; the serialized `file_size`
/// is checked against the decoded payload when loading.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
#[serde(try_from = "FileAttachmentRepr", into = "FileAttachmentRepr")]
pub struct FileAttachment {
    file_name: String,
    file_type: String,
    data: Vec<u8>,
}

impl FileAttachment {
    pub fn new(file_name: impl Into<String>, file_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            file_type: file_type.into(),
            data,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Declared content type (as given when the file was added).
    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Size of the payload in bytes.
    pub fn file_size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Lowercased text after the last `.` in the file name, or `""`.
    pub fn extension(&self) -> String {
        match self.file_name.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => String::new(),
        }
    }

    /// Human-readable size using 1024-based units.
    pub fn formatted_size(&self) -> String {
        format_size(self.file_size())
    }

    pub fn file_kind(&self) -> FileKind {
        let ext = self.extension();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            FileKind::Image
        } else if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
            FileKind::Document
        } else if ARCHIVE_EXTENSIONS.contains(&ext.as_str()) {
            FileKind::Archive
        } else {
            FileKind::Other
        }
    }

    pub fn is_image(&self) -> bool {
        self.file_kind() == FileKind::Image
    }

    pub fn is_document(&self) -> bool {
        self.file_kind() == FileKind::Document
    }

    pub fn is_archive(&self) -> bool {
        self.file_kind() == FileKind::Archive
    }
}

impl std::fmt::Debug for FileAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileAttachment")
            .field("file_name", &self.file_name)
            .field("file_type", &self.file_type)
            .field("file_size", &self.data.len())
            .finish()
    }
}

/// Format a byte count: `"<n> B"` below 1 KiB, else one decimal place.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    }
}

/// Wire shape of a file attachment inside the vault document.
#[derive(Serialize, Deserialize)]
struct FileAttachmentRepr {
    file_name: String,
    #[serde(default)]
    file_type: String,
    file_size: u64,
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    file_data: Vec<u8>,
}

impl TryFrom<FileAttachmentRepr> for FileAttachment {
    type Error = String;

    fn try_from(repr: FileAttachmentRepr) -> std::result::Result<Self, Self::Error> {
        if repr.file_size != repr.file_data.len() as u64 {
            return Err(format!(
                "file '{}' declares {} bytes but carries {}",
                repr.file_name,
                repr.file_size,
                repr.file_data.len()
            ));
        }
        Ok(Self {
            file_name: repr.file_name,
            file_type: repr.file_type,
            data: repr.file_data,
        })
    }
}

impl From<FileAttachment> for FileAttachmentRepr {
    fn from(file: FileAttachment) -> Self {
        Self {
            file_size: file.file_size(),
            file_name: file.file_name,
            file_type: file.file_type,
            file_data: file.data,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
