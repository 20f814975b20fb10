use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use kyoshi_storage::KeyValueStore;
use kyoshi_types::{CollectionKind, GrammarEntry, VocabularyEntry, now_millis};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LibraryError;

/// Legacy anonymous-mode record keys, one per collection.
pub const GRAMMAR_LIBRARY_KEY: &str = "grammarLibrary";
pub const VOCABULARY_LIBRARY_KEY: &str = "vocabularyLibrary";

/// Per-user snapshots live under this prefix plus the username.
pub const USER_DATA_PREFIX: &str = "userData_";

/// A saved record with a stable id and a dedup key. At most one entry per
/// dedup-key value is kept in a collection.
pub trait LibraryEntry {
    fn id(&self) -> &str;
    fn dedup_key(&self) -> &str;
}

impl LibraryEntry for GrammarEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn dedup_key(&self) -> &str {
        &self.source
    }
}

impl LibraryEntry for VocabularyEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn dedup_key(&self) -> &str {
        &self.word
    }
}

/// Which persisted records back the active library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageScope {
    /// Legacy layout: two separate collection records, no identity.
    Anonymous,
    /// Single snapshot record keyed by username.
    User(String),
}

impl StorageScope {
    pub fn snapshot_key(&self) -> Option<String> {
        match self {
            StorageScope::Anonymous => None,
            StorageScope::User(username) => Some(format!("{USER_DATA_PREFIX}{username}")),
        }
    }
}

/// Persisted per-user shape. Field names match the original JSON layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LibrarySnapshot {
    pub grammar_entries: Vec<GrammarEntry>,
    pub vocabulary_entries: Vec<VocabularyEntry>,
}

impl LibrarySnapshot {
    pub fn is_empty(&self) -> bool {
        self.grammar_entries.is_empty() && self.vocabulary_entries.is_empty()
    }
}

/// The two entry collections for the active identity, plus the persistence
/// side of every mutation. Mutations are synchronous and in-memory first;
/// the snapshot write afterwards is best-effort (a storage failure is
/// logged, never surfaced, never rolled back).
pub struct LibraryStore {
    store: Arc<dyn KeyValueStore>,
    scope: Option<StorageScope>,
    snapshot: LibrarySnapshot,
}

impl LibraryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            scope: None,
            snapshot: LibrarySnapshot::default(),
        }
    }

    /// Load completed for some scope; until then mutations stay in memory
    /// only, so stored data is never clobbered with pre-load defaults.
    pub fn is_loaded(&self) -> bool {
        self.scope.is_some()
    }

    pub fn grammar(&self) -> &[GrammarEntry] {
        &self.snapshot.grammar_entries
    }

    pub fn vocabulary(&self) -> &[VocabularyEntry] {
        &self.snapshot.vocabulary_entries
    }

    /// Read the persisted collections for `scope` and make them active.
    ///
    /// A missing record means empty collections. Corrupt JSON is treated the
    /// same way, with a warning. A user whose snapshot does not exist yet
    /// adopts the legacy anonymous collections as a starting point.
    pub fn load(&mut self, scope: StorageScope) {
        self.snapshot = match scope.snapshot_key() {
            Some(key) => match self.read_record::<LibrarySnapshot>(&key) {
                Some(snapshot) => snapshot,
                None => {
                    let adopted = self.read_legacy();
                    if !adopted.is_empty() {
                        tracing::info!(key = %key, "adopting anonymous library for first login");
                    }
                    adopted
                }
            },
            None => self.read_legacy(),
        };
        self.scope = Some(scope);
    }

    /// Drop the in-memory collections without touching persisted data.
    pub fn clear(&mut self) {
        self.scope = None;
        self.snapshot = LibrarySnapshot::default();
    }

    /// Insert a new grammar entry at the front, evicting any existing entry
    /// with the same `source`.
    pub fn add_grammar(&mut self, source: &str, explanation: &str) {
        let entry = GrammarEntry {
            id: Uuid::new_v4().to_string(),
            source: source.to_string(),
            explanation: explanation.to_string(),
            timestamp: now_millis(),
        };
        insert_front(&mut self.snapshot.grammar_entries, entry);
        self.persist();
    }

    /// Insert a new vocabulary entry at the front, evicting any existing
    /// entry with the same `word`.
    pub fn add_vocabulary(&mut self, word: &str, explanation: &str) {
        let entry = VocabularyEntry {
            id: Uuid::new_v4().to_string(),
            word: word.to_string(),
            explanation: explanation.to_string(),
            timestamp: now_millis(),
        };
        insert_front(&mut self.snapshot.vocabulary_entries, entry);
        self.persist();
    }

    /// Remove the entry with `id` if present. Returns whether anything
    /// changed; an unknown id is a no-op, not an error.
    pub fn delete(&mut self, kind: CollectionKind, id: &str) -> bool {
        let removed = match kind {
            CollectionKind::Grammar => remove_by_id(&mut self.snapshot.grammar_entries, id),
            CollectionKind::Vocabulary => remove_by_id(&mut self.snapshot.vocabulary_entries, id),
        };
        if removed {
            self.persist();
        }
        removed
    }

    /// Replace a collection's order with `order`, which must be a
    /// permutation of the current id set.
    pub fn reorder(&mut self, kind: CollectionKind, order: &[String]) -> Result<(), LibraryError> {
        match kind {
            CollectionKind::Grammar => apply_order(&mut self.snapshot.grammar_entries, order)?,
            CollectionKind::Vocabulary => apply_order(&mut self.snapshot.vocabulary_entries, order)?,
        }
        self.persist();
        Ok(())
    }

    fn persist(&self) {
        let Some(scope) = &self.scope else {
            tracing::warn!("library mutated before load; skipping persist");
            return;
        };

        let result = match scope.snapshot_key() {
            Some(key) => self.write_record(&key, &self.snapshot),
            None => self.write_legacy(),
        };

        if let Err(e) = result {
            tracing::warn!("library persist failed, continuing in memory: {e}");
        }
    }

    fn read_legacy(&self) -> LibrarySnapshot {
        LibrarySnapshot {
            grammar_entries: self.read_record(GRAMMAR_LIBRARY_KEY).unwrap_or_default(),
            vocabulary_entries: self.read_record(VOCABULARY_LIBRARY_KEY).unwrap_or_default(),
        }
    }

    fn write_legacy(&self) -> Result<(), String> {
        self.write_record(GRAMMAR_LIBRARY_KEY, &self.snapshot.grammar_entries)?;
        self.write_record(VOCABULARY_LIBRARY_KEY, &self.snapshot.vocabulary_entries)
    }

    /// A failed serialization or write leaves the stored value untouched;
    /// the caller logs and carries on with in-memory state.
    fn write_record<T: Serialize>(&self, key: &str, value: &T) -> Result<(), String> {
        let json = serde_json::to_string(value).map_err(|e| e.to_string())?;
        self.store.set(key, &json).map_err(|e| e.to_string())
    }

    fn read_record<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, "storage read failed: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, "corrupt persisted record, treating as absent: {e}");
                None
            }
        }
    }
}

fn insert_front<T: LibraryEntry>(entries: &mut Vec<T>, entry: T) {
    entries.retain(|existing| existing.dedup_key() != entry.dedup_key());
    entries.insert(0, entry);
}

fn remove_by_id<T: LibraryEntry>(entries: &mut Vec<T>, id: &str) -> bool {
    let before = entries.len();
    entries.retain(|entry| entry.id() != id);
    entries.len() != before
}

fn apply_order<T: LibraryEntry>(entries: &mut Vec<T>, order: &[String]) -> Result<(), LibraryError> {
    if order.len() != entries.len() {
        return Err(LibraryError::OrderMismatch);
    }

    let mut seen = HashSet::new();
    for id in order {
        if !seen.insert(id.as_str()) || !entries.iter().any(|e| e.id() == id) {
            return Err(LibraryError::OrderMismatch);
        }
    }

    let mut by_id: HashMap<String, T> = entries
        .drain(..)
        .map(|entry| (entry.id().to_string(), entry))
        .collect();
    for id in order {
        if let Some(entry) = by_id.remove(id) {
            entries.push(entry);
        }
    }
    Ok(())
}
