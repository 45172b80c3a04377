//! The in-memory record set.

use std::collections::{BTreeSet, HashMap};

use uuid::Uuid;
use zeroize::Zeroize;

use super::entry::{Entry, EntryKind};
use crate::errors::{LpVaultError, Result};

/// All entries of one vault, keyed by id.
///
/// Entry contents are wiped from memory when the vault is dropped.
#[derive(Default)]
pub struct Vault {
    entries: HashMap<Uuid, Entry>,
}

impl Vault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.  Ids are unique within a vault.
    pub fn insert(&mut self, entry: Entry) -> Result<Uuid> {
        let id = entry.id();
        if self.entries.contains_key(&id) {
            return Err(LpVaultError::DuplicateEntry(id));
        }
        self.entries.insert(id, entry);
        Ok(id)
    }

    /// Insert, replacing any entry with the same id.  Returns the old one.
    pub(crate) fn upsert(&mut self, entry: Entry) -> Option<Entry> {
        self.entries.insert(entry.id(), entry)
    }

    pub fn get(&self, id: Uuid) -> Option<&Entry> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: Uuid) -> Option<&mut Entry> {
        self.entries.get_mut(&id)
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Entry> {
        self.entries.remove(&id)
    }

    /// Move every entry out, leaving the vault empty.
    pub(crate) fn drain(&mut self) -> Vec<Entry> {
        self.entries.drain().map(|(_, entry)| entry).collect()
    }

    /// Remove every entry, wiping their contents.  Returns how many there were.
    pub(crate) fn clear(&mut self) -> usize {
        let count = self.entries.len();
        for mut entry in self.drain() {
            entry.zeroize();
        }
        count
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.entries.keys().copied()
    }

    /// Iterate in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    /// All entries sorted by title (case-insensitive), then id.
    pub fn sorted(&self) -> Vec<&Entry> {
        let mut list: Vec<&Entry> = self.entries.values().collect();
        list.sort_by(|a, b| {
            a.title()
                .to_lowercase()
                .cmp(&b.title().to_lowercase())
                .then_with(|| a.id().cmp(&b.id()))
        });
        list
    }

    pub fn favorites(&self) -> Vec<&Entry> {
        self.sorted().into_iter().filter(|e| e.is_favorite()).collect()
    }

    /// Distinct category names, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.entries
            .values()
            .map(|e| e.category().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&Entry> {
        self.sorted()
            .into_iter()
            .filter(|e| e.category().eq_ignore_ascii_case(category))
            .collect()
    }

    /// Case-insensitive search over titles, categories, and login
    /// usernames and URLs.  Secret fields are never searched.
    pub fn search(&self, query: &str) -> Vec<&Entry> {
        let needle = query.to_lowercase();
        self.sorted()
            .into_iter()
            .filter(|e| {
                let field_hit = match e.kind() {
                    EntryKind::Login(login) => {
                        login.username.to_lowercase().contains(&needle)
                            || login.url.to_lowercase().contains(&needle)
                    }
                    EntryKind::File(file) => file.file_name().to_lowercase().contains(&needle),
                    EntryKind::Note(_) | EntryKind::Card(_) | EntryKind::Identity(_) => false,
                };
                field_hit
                    || e.title().to_lowercase().contains(&needle)
                    || e.category().to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Find the single entry whose id starts with `prefix`.
    ///
    /// Hosts use this to accept shortened ids.  Returns `None` when the
    /// prefix is empty, or matches nothing or more than one entry.
    pub fn find_by_id_prefix(&self, prefix: &str) -> Option<&Entry> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return None;
        }
        let mut matches = self
            .entries
            .values()
            .filter(|e| e.id().to_string().starts_with(&prefix));
        let first = matches.next()?;
        match matches.next() {
            Some(_) => None,
            None => Some(first),
        }
    }
}

impl Drop for Vault {
    fn drop(&mut self) {
        for entry in self.entries.values_mut() {
            entry.zeroize();
        }
    }
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::entry::{Login, Note};

    fn login(title: &str, user: &str) -> Entry {
        Entry::new(
            title,
            EntryKind::Login(Login {
                username: user.into(),
                password: "pw".into(),
                url: "https://example.org".into(),
            }),
        )
    }

    #[test]
    fn insert_rejects_duplicate_id() {
        let mut vault = Vault::new();
        let entry = login("A", "a");
        let copy = entry.clone();
        vault.insert(entry).unwrap();
        assert!(matches!(
            vault.insert(copy),
            Err(LpVaultError::DuplicateEntry(_))
        ));
        assert_eq!(vault.len(), 1);
    }

    #[test]
    fn sorted_is_case_insensitive() {
        let mut vault = Vault::new();
        vault.insert(login("zeta", "z")).unwrap();
        vault.insert(login("Alpha", "a")).unwrap();
        vault.insert(login("beta", "b")).unwrap();
        let titles: Vec<&str> = vault.sorted().into_iter().map(Entry::title).collect();
        assert_eq!(titles, vec!["Alpha", "beta", "zeta"]);
    }

    #[test]
    fn categories_and_favorites() {
        let mut vault = Vault::new();
        vault.insert(login("A", "a").with_category("Work")).unwrap();
        vault.insert(login("B", "b").with_favorite(true)).unwrap();
        vault
            .insert(Entry::new("N", EntryKind::Note(Note { body: "x".into() })).with_category("Work"))
            .unwrap();

        assert_eq!(vault.categories(), vec!["General", "Work"]);
        assert_eq!(vault.by_category("work").len(), 2);
        let favs = vault.favorites();
        assert_eq!(favs.len(), 1);
        assert_eq!(favs[0].title(), "B");
    }

    #[test]
    fn search_skips_secret_fields() {
        let mut vault = Vault::new();
        vault.insert(login("Bank", "ada@example.org")).unwrap();
        assert_eq!(vault.search("ADA@").len(), 1);
        assert_eq!(vault.search("bank").len(), 1);
        // "pw" is the password of every entry.
        assert!(vault.search("pw").is_empty());
    }

    #[test]
    fn id_prefix_lookup_requires_unique_match() {
        let mut vault = Vault::new();
        let id = vault.insert(login("A", "a")).unwrap();
        let full = id.to_string();
        assert_eq!(vault.find_by_id_prefix(&full[..8]).map(Entry::id), Some(id));
        assert!(vault.find_by_id_prefix("not-an-id").is_none());
        vault.insert(login("B", "b")).unwrap();
        assert_eq!(vault.find_by_id_prefix(&full).map(Entry::id), Some(id));
    }

    #[test]
    fn empty_id_prefix_never_matches() {
        let mut vault = Vault::new();
        vault.insert(login("Only", "a")).unwrap();
        assert!(vault.find_by_id_prefix("").is_none());
        assert!(vault.find_by_id_prefix("   ").is_none());
    }
}
