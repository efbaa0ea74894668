use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use super::{Persistence, SnippetStore};
use crate::auth::Identity;
use crate::error::StoreError;
use crate::models::{NewSnippet, Snippet, SnippetId, SnippetLanguage};

/// Key of the slot holding the serialized collection.
pub const STORAGE_KEY: &str = "codeSnippets";

/// Whole-collection store backed by a single JSON file.
#[derive(Debug)]
pub struct LocalStore {
    data_dir: PathBuf,
    slot_file: PathBuf,
    last_id: AtomicI64,
}

impl LocalStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let slot_file = data_dir.join(format!("{}.json", STORAGE_KEY));

        Self {
            data_dir,
            slot_file,
            last_id: AtomicI64::new(0),
        }
    }

    /// `<platform data dir>/snipvault`
    pub fn default_data_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::data_dir()
            .context("Failed to get data directory")?
            .join("snipvault"))
    }

    pub fn slot_path(&self) -> &Path {
        &self.slot_file
    }

    /// Reads the slot. A missing or unreadable slot is an empty collection.
    ///
    /// Entries are decoded one at a time: an unknown language becomes `other`
    /// and entries that still do not fit are skipped. Whenever anything is
    /// dropped the original file is copied to `codeSnippets.json.bak` first,
    /// since the next save rewrites the slot from what was kept.
    pub fn read_slot(&self) -> Vec<Snippet> {
        if !self.slot_file.exists() {
            debug!("No saved snippets at {}", self.slot_file.display());
            return Vec::new();
        }

        let content = match fs::read_to_string(&self.slot_file) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {}: {}", self.slot_file.display(), e);
                return Vec::new();
            }
        };

        let entries = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                warn!(
                    "Ignoring snippet file {}: expected a JSON array",
                    self.slot_file.display()
                );
                self.back_up_slot();
                return Vec::new();
            }
            Err(e) => {
                warn!(
                    "Ignoring malformed snippet file {}: {}",
                    self.slot_file.display(),
                    e
                );
                self.back_up_slot();
                return Vec::new();
            }
        };

        let total = entries.len();
        let snippets: Vec<Snippet> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match decode_entry(entry) {
                Ok(snippet) => Some(snippet),
                Err(e) => {
                    warn!("Skipping saved snippet {}: {}", index, e);
                    None
                }
            })
            .collect();

        if snippets.len() < total {
            self.back_up_slot();
        }
        self.observe_ids(&snippets);
        debug!("Loaded {} snippet(s)", snippets.len());
        snippets
    }

    pub fn backup_path(&self) -> PathBuf {
        self.slot_file.with_extension("json.bak")
    }

    fn back_up_slot(&self) {
        let backup = self.backup_path();
        match fs::copy(&self.slot_file, &backup) {
            Ok(_) => warn!("Kept a copy of the unreadable slot at {}", backup.display()),
            Err(e) => warn!("Failed to back up {}: {}", self.slot_file.display(), e),
        }
    }

    pub fn write_slot(&self, snippets: &[Snippet]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir)?;
        let content = serde_json::to_string_pretty(snippets)?;
        fs::write(&self.slot_file, content)?;
        debug!(
            "Saved {} snippet(s) to {}",
            snippets.len(),
            self.slot_file.display()
        );
        Ok(())
    }

    /// Millisecond timestamp, bumped past the last id handed out so ids stay
    /// unique within a burst of adds.
    fn next_id(&self) -> SnippetId {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last_id.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self.last_id.compare_exchange_weak(
                last,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return SnippetId::Timestamp(next),
                Err(actual) => last = actual,
            }
        }
    }

    fn observe_ids(&self, snippets: &[Snippet]) {
        let newest = snippets
            .iter()
            .filter_map(|s| match s.id {
                SnippetId::Timestamp(ts) => Some(ts),
                SnippetId::Key(_) => None,
            })
            .max();
        if let Some(newest) = newest {
            self.last_id.fetch_max(newest, Ordering::Relaxed);
        }
    }
}

fn decode_entry(mut entry: Value) -> Result<Snippet, serde_json::Error> {
    if let Some(Value::String(language)) = entry.get("language") {
        let language = SnippetLanguage::lenient(language);
        entry["language"] = serde_json::to_value(language)?;
    }
    serde_json::from_value(entry)
}

#[async_trait]
impl SnippetStore for LocalStore {
    fn persistence(&self) -> Persistence {
        Persistence::Snapshot
    }

    async fn load(&self, _identity: Option<&Identity>) -> Result<Vec<Snippet>, StoreError> {
        Ok(self.read_slot())
    }

    async fn create(
        &self,
        _identity: Option<&Identity>,
        _record: &NewSnippet,
    ) -> Result<SnippetId, StoreError> {
        Ok(self.next_id())
    }

    async fn delete(&self, _identity: Option<&Identity>, _id: &SnippetId) -> Result<(), StoreError> {
        Ok(())
    }

    async fn save_all(&self, snippets: &[Snippet]) -> Result<(), StoreError> {
        self.write_slot(snippets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample(id: SnippetId) -> Snippet {
        Snippet {
            id,
            title: "Hello".to_string(),
            description: "greets".to_string(),
            code: "console.log('hi')".to_string(),
            language: SnippetLanguage::JavaScript,
            tags: vec!["js".to_string()],
            created: Utc::now(),
            user_id: None,
        }
    }

    #[test]
    fn test_missing_slot_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = LocalStore::new(temp.path().join("nested"));
        assert!(store.read_slot().is_empty());
    }

    #[test]
    fn test_malformed_slot_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = LocalStore::new(temp.path());
        fs::write(store.slot_path(), "{ not json").unwrap();
        assert!(store.read_slot().is_empty());

        fs::write(store.slot_path(), r#"{"title": "object, not array"}"#).unwrap();
        assert!(store.read_slot().is_empty());
        assert_eq!(
            fs::read_to_string(store.backup_path()).unwrap(),
            r#"{"title": "object, not array"}"#
        );
    }

    #[test]
    fn test_one_bad_entry_keeps_the_rest() {
        let temp = TempDir::new().unwrap();
        let store = LocalStore::new(temp.path());
        let content = r#"[
            {"id": 1, "title": "kept", "code": "a", "created": "2024-01-01T00:00:00Z"},
            {"id": 2, "title": "ts", "code": "b", "language": "TypeScript",
             "created": "2024-01-02T00:00:00Z"},
            {"id": 3, "title": "no date", "code": "c"}
        ]"#;
        fs::write(store.slot_path(), content).unwrap();

        let loaded = store.read_slot();
        let titles: Vec<&str> = loaded.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["kept", "ts"]);
        assert_eq!(loaded[1].language, SnippetLanguage::Other);
        assert_eq!(fs::read_to_string(store.backup_path()).unwrap(), content);
    }

    #[test]
    fn test_clean_slot_makes_no_backup() {
        let temp = TempDir::new().unwrap();
        let store = LocalStore::new(temp.path());
        store.write_slot(&[sample(SnippetId::Timestamp(5))]).unwrap();
        assert_eq!(store.read_slot().len(), 1);
        assert!(!store.backup_path().exists());
    }

    #[test]
    fn test_slot_file_is_named_after_key() {
        let temp = TempDir::new().unwrap();
        let store = LocalStore::new(temp.path());
        assert_eq!(store.slot_path(), temp.path().join("codeSnippets.json"));
    }

    #[test]
    fn test_write_then_read_slot() {
        let temp = TempDir::new().unwrap();
        let store = LocalStore::new(temp.path().join("data"));
        let saved = vec![sample(SnippetId::Timestamp(10)), sample(SnippetId::Timestamp(20))];
        store.write_slot(&saved).unwrap();

        let reopened = LocalStore::new(temp.path().join("data"));
        assert_eq!(reopened.read_slot(), saved);
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let temp = TempDir::new().unwrap();
        let store = LocalStore::new(temp.path());
        let ids: Vec<i64> = (0..50)
            .map(|_| match store.next_id() {
                SnippetId::Timestamp(ts) => ts,
                SnippetId::Key(_) => panic!("local ids are timestamps"),
            })
            .collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_ids_skip_past_loaded_ones() {
        let temp = TempDir::new().unwrap();
        let store = LocalStore::new(temp.path());
        let future = Utc::now().timestamp_millis() + 1_000_000;
        store
            .write_slot(&[sample(SnippetId::Timestamp(future))])
            .unwrap();
        store.read_slot();
        assert_eq!(store.next_id(), SnippetId::Timestamp(future + 1));
    }
}
