//! Upgrades of older vault document shapes.
//!
//! Schema 1 grouped records by kind under `passwords`, `notes`, `cards`,
//! `identities` and `files`, had no ids, used naive ISO timestamps and a
//! few different field names.  Schema 2 is the flat, tagged `entries`
//! list the codec reads.
//!
//! The version is always read from an explicit field: `schema_version`,
//! or the legacy `"version": "1.0"` string those grouped documents were
//! written with.  A document's shape is never guessed from which fields
//! happen to be present.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{json, Map, Value};
use tracing::info;
use uuid::Uuid;

use super::codec::{self, CURRENT_SCHEMA_VERSION};
use crate::errors::{LpVaultError, Result};

/// Outcome of `upgrade`.
pub struct Upgraded {
    pub document: Value,
    /// Schema version the document had before upgrading.
    pub from_version: u32,
}

impl Upgraded {
    pub fn was_migrated(&self) -> bool {
        self.from_version != CURRENT_SCHEMA_VERSION
    }
}

/// Bring `document` up to the current schema version.
pub fn upgrade(document: Value) -> Result<Upgraded> {
    let from_version = codec::schema_version(&document)?;
    let document = match from_version {
        CURRENT_SCHEMA_VERSION => document,
        1 => {
            let upgraded = v1_to_v2(document)?;
            info!(from = 1, to = 2, "migrated vault document");
            upgraded
        }
        v if v > CURRENT_SCHEMA_VERSION => {
            return Err(LpVaultError::UnsupportedSchemaVersion {
                found: v,
                supported: CURRENT_SCHEMA_VERSION,
            })
        }
        v => {
            return Err(LpVaultError::MalformedVault(format!(
                "unknown schema version {v}"
            )))
        }
    };
    Ok(Upgraded {
        document,
        from_version,
    })
}

// ---------------------------------------------------------------------------
// Schema 1 -> 2
// ---------------------------------------------------------------------------

/// (legacy group, type tag, default category, legacy -> current field renames)
const V1_GROUPS: &[(&str, &str, &str, &[(&str, &str)])] = &[
    ("passwords", "login", "General", &[]),
    ("notes", "note", "General", &[("content", "body")]),
    (
        "cards",
        "card",
        "Cards",
        &[("card_number", "number"), ("cvv", "security_code")],
    ),
    ("identities", "identity", "Identity", &[]),
    ("files", "file", "Files", &[]),
];

fn v1_to_v2(document: Value) -> Result<Value> {
    let Value::Object(mut root) = document else {
        return Err(LpVaultError::MalformedVault("document is not an object".into()));
    };
    let now = Utc::now();
    let mut entries = Vec::new();

    for (group, tag, default_category, renames) in V1_GROUPS {
        let records = match root.remove(*group) {
            None | Some(Value::Null) => continue,
            Some(Value::Array(records)) => records,
            Some(_) => {
                return Err(LpVaultError::MalformedVault(format!(
                    "`{group}` is not an array"
                )))
            }
        };
        for record in records {
            let Value::Object(record) = record else {
                return Err(LpVaultError::MalformedEntry(format!(
                    "`{group}` contains a non-object record"
                )));
            };
            entries.push(v1_entry(record, tag, default_category, renames, now)?);
        }
    }

    Ok(json!({
        "schema_version": 2,
        "entries": entries,
    }))
}

fn v1_entry(
    mut record: Map<String, Value>,
    tag: &str,
    default_category: &str,
    renames: &[(&str, &str)],
    now: DateTime<Utc>,
) -> Result<Value> {
    for (old, new) in renames {
        if let Some(value) = record.remove(*old) {
            record.insert((*new).to_string(), value);
        }
    }

    if tag == "file" {
        fix_file_size(&mut record)?;
    }

    let attachments = match record.remove("attached_files") {
        Some(Value::Array(files)) => files
            .into_iter()
            .map(|file| match file {
                Value::Object(mut file) => {
                    fix_file_size(&mut file)?;
                    Ok(Value::Object(file))
                }
                _ => Err(LpVaultError::MalformedEntry(
                    "attached file is not an object".into(),
                )),
            })
            .collect::<Result<Vec<_>>>()?,
        _ => Vec::new(),
    };
    if !attachments.is_empty() {
        record.insert("attachments".into(), Value::Array(attachments));
    }

    // Legacy notes were always present, possibly empty.
    match record.get("notes") {
        Some(Value::String(s)) if s.is_empty() => {
            record.remove("notes");
        }
        Some(Value::Null) => {
            record.remove("notes");
        }
        _ => {}
    }

    let category_missing = record
        .get("category")
        .and_then(Value::as_str)
        .map_or(true, str::is_empty);
    if category_missing {
        record.insert("category".into(), json!(default_category));
    }

    let created = legacy_timestamp(record.get("created")).unwrap_or(now);
    let modified = legacy_timestamp(record.get("modified"))
        .unwrap_or(created)
        .max(created);
    record.insert("created".into(), json!(created));
    record.insert("modified".into(), json!(modified));

    record.insert("id".into(), json!(Uuid::new_v4()));
    record.insert("type".into(), json!(tag));

    Ok(Value::Object(record))
}

/// Legacy files stored a caller-supplied size; recompute it from the payload.
fn fix_file_size(file: &mut Map<String, Value>) -> Result<()> {
    let encoded = file
        .get("file_data")
        .and_then(Value::as_str)
        .ok_or_else(|| LpVaultError::MalformedEntry("file has no `file_data`".into()))?;
    let len = BASE64
        .decode(encoded)
        .map_err(|e| LpVaultError::MalformedEntry(format!("file payload is not base64: {e}")))?
        .len();
    file.insert("file_size".into(), json!(len));
    Ok(())
}

/// Parse an RFC 3339 or naive ISO-8601 timestamp (naive means UTC).
fn legacy_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let s = value?.as_str()?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
