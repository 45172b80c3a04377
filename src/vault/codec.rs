//! Vault document codec.
//!
//! Turns a `Vault` into a self-describing JSON document and back,
//! independent of encryption.  The document shape is:
//!
//! ```text
//! { "schema_version": 2, "entries": [ { "id": ..., "type": "login", ... }, ... ] }
//! ```
//!
//! The schema version evolves separately from the container format
//! version.  This module only reads the current schema; older shapes
//! are upgraded by `migrate` before they get here.

use serde_json::{json, Value};
use zeroize::Zeroizing;

use super::collection::Vault;
use super::entry::Entry;
use crate::errors::{LpVaultError, Result};

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Serialize every entry into a document, sorted by id for stable output.
pub fn serialize(vault: &Vault) -> Result<Value> {
    let mut entries: Vec<&Entry> = vault.iter().collect();
    entries.sort_by_key(|e| e.id());

    let docs = entries
        .into_iter()
        .map(Entry::to_document)
        .collect::<Result<Vec<_>>>()?;

    Ok(json!({
        "schema_version": CURRENT_SCHEMA_VERSION,
        "entries": docs,
    }))
}

/// Rebuild a vault from a current-schema document.
pub fn deserialize(document: Value) -> Result<Vault> {
    let version = schema_version(&document)?;
    if version > CURRENT_SCHEMA_VERSION {
        return Err(LpVaultError::UnsupportedSchemaVersion {
            found: version,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }
    if version < CURRENT_SCHEMA_VERSION {
        return Err(LpVaultError::MalformedVault(format!(
            "schema version {version} must be migrated before loading"
        )));
    }

    let Value::Object(mut map) = document else {
        return Err(LpVaultError::MalformedVault("document is not an object".into()));
    };
    let entries = match map.remove("entries") {
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(LpVaultError::MalformedVault(
                "`entries` is not an array".into(),
            ))
        }
        None => return Err(LpVaultError::MalformedVault("missing `entries`".into())),
    };

    let mut vault = Vault::new();
    for doc in entries {
        let entry = Entry::from_document(doc)?;
        vault.insert(entry).map_err(|e| match e {
            LpVaultError::DuplicateEntry(id) => {
                LpVaultError::MalformedVault(format!("duplicate entry id {id}"))
            }
            other => other,
        })?;
    }
    Ok(vault)
}

/// Read the schema version of a document.
///
/// Current documents carry a numeric `schema_version`.  Grouped legacy
/// documents carry `"version": "1.0"` instead, which maps to schema 1.
pub fn schema_version(document: &Value) -> Result<u32> {
    let Some(map) = document.as_object() else {
        return Err(LpVaultError::MalformedVault("document is not an object".into()));
    };
    if let Some(raw) = map.get("schema_version") {
        return raw
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| LpVaultError::MalformedVault(format!("bad `schema_version`: {raw}")));
    }
    match map.get("version").and_then(Value::as_str) {
        Some(legacy) if legacy.split('.').next() == Some("1") => Ok(1),
        Some(legacy) => Err(LpVaultError::MalformedVault(format!(
            "unknown legacy version {legacy:?}"
        ))),
        None => Err(LpVaultError::MalformedVault("missing `schema_version`".into())),
    }
}

/// Serialize a vault straight to JSON bytes (wiped on drop).
pub fn to_bytes(vault: &Vault) -> Result<Zeroizing<Vec<u8>>> {
    let document = serialize(vault)?;
    serde_json::to_vec(&document)
        .map(Zeroizing::new)
        .map_err(|e| LpVaultError::MalformedVault(format!("cannot encode document: {e}")))
}

/// Parse decrypted bytes into a document without interpreting it.
pub fn parse_bytes(bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes)
        .map_err(|e| LpVaultError::MalformedVault(format!("document is not valid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::entry::{EntryKind, FileAttachment, Note};

    fn sample() -> Vault {
        let mut vault = Vault::new();
        vault
            .insert(Entry::new("Groceries", EntryKind::Note(Note { body: "eggs".into() })))
            .unwrap();
        vault
            .insert(Entry::new(
                "Passport scan",
                EntryKind::File(FileAttachment::new("passport.png", "image/png", vec![1, 2, 3])),
            ))
            .unwrap();
        vault
    }

    #[test]
    fn roundtrip_preserves_entries() {
        let vault = sample();
        let back = deserialize(serialize(&vault).unwrap()).unwrap();
        assert_eq!(back.len(), 2);
        for entry in vault.iter() {
            assert_eq!(back.get(entry.id()), Some(entry));
        }
    }

    #[test]
    fn bytes_roundtrip() {
        let vault = sample();
        let bytes = to_bytes(&vault).unwrap();
        let back = deserialize(parse_bytes(&bytes).unwrap()).unwrap();
        assert_eq!(back.len(), vault.len());
    }

    #[test]
    fn document_declares_schema_version() {
        let doc = serialize(&Vault::new()).unwrap();
        assert_eq!(schema_version(&doc).unwrap(), CURRENT_SCHEMA_VERSION);
        assert_eq!(doc["entries"], json!([]));
    }

    #[test]
    fn rejects_future_schema() {
        let doc = json!({ "schema_version": 99, "entries": [] });
        assert!(matches!(
            deserialize(doc),
            Err(LpVaultError::UnsupportedSchemaVersion { found: 99, .. })
        ));
    }

    #[test]
    fn rejects_structural_errors() {
        for doc in [
            json!([]),
            json!({ "entries": [] }),
            json!({ "schema_version": "two", "entries": [] }),
            json!({ "schema_version": 2 }),
            json!({ "schema_version": 2, "entries": {} }),
        ] {
            assert!(matches!(
                deserialize(doc),
                Err(LpVaultError::MalformedVault(_))
            ));
        }
    }

    #[test]
    fn rejects_duplicate_ids() {
        let vault = sample();
        let mut doc = serialize(&vault).unwrap();
        let first = doc["entries"][0].clone();
        doc["entries"].as_array_mut().unwrap().push(first);
        assert!(matches!(
            deserialize(doc),
            Err(LpVaultError::MalformedVault(_))
        ));
    }

    #[test]
    fn bad_entry_is_malformed_entry() {
        let doc = json!({ "schema_version": 2, "entries": [ { "type": "note" } ] });
        assert!(matches!(
            deserialize(doc),
            Err(LpVaultError::MalformedEntry(_))
        ));
    }

    #[test]
    fn invalid_json_bytes() {
        assert!(matches!(
            parse_bytes(b"{not json"),
            Err(LpVaultError::MalformedVault(_))
        ));
    }
}
