//! String key/value persistence behind the key cache.
//!
//! `FileStore` keeps the entries in a small JSON document on disk, rewritten on every mutation
//! through a temp file and a rename. An unreadable document is treated as empty.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

fn poisoned<T>(_: T) -> Error {
    Error::Storage("key store lock poisoned".to_string())
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().map_err(poisoned)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().map_err(poisoned)?.remove(key);
        Ok(())
    }
}

/// On-disk document layout.
#[derive(Serialize, Deserialize, Debug, Default)]
struct StoredEntries {
    entries: BTreeMap<String, String>,
}

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoredEntries> {
        if !self.path.exists() {
            return Ok(StoredEntries::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(StoredEntries::default());
        }
        match serde_json::from_str(&contents) {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "key store is corrupt, starting empty");
                Ok(StoredEntries::default())
            }
        }
    }

    fn save(&self, state: &StoredEntries) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(state)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "key store saved");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _g = self.guard.lock().map_err(poisoned)?;
        Ok(self.load()?.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _g = self.guard.lock().map_err(poisoned)?;
        let mut state = self.load()?;
        state.entries.insert(key.to_string(), value.to_string());
        self.save(&state)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _g = self.guard.lock().map_err(poisoned)?;
        let mut state = self.load()?;
        state.entries.remove(key);
        // Always rewrite, so a corrupt document is replaced by a valid one.
        self.save(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("keys.json");

        let store = FileStore::new(&path);
        assert_eq!(store.get("fhe_public_key").unwrap(), None);
        store.set("fhe_public_key", "pk_1_abc").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get("fhe_public_key").unwrap().as_deref(),
            Some("pk_1_abc")
        );

        reopened.remove("fhe_public_key").unwrap();
        assert_eq!(store.get("fhe_public_key").unwrap(), None);
        // Removing a missing key is a no-op.
        reopened.remove("fhe_public_key").unwrap();
    }

    #[test]
    fn truncated_file_is_recovered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");
        fs::write(&path, r#"{"entries": {"fhe_pub"#).unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.get("fhe_public_key").unwrap(), None);
        store.remove("fhe_public_key").unwrap();
        let repaired: StoredEntries =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(repaired.entries.is_empty());

        store.set("fhe_public_key", "pk_2_def").unwrap();
        assert_eq!(
            FileStore::new(&path).get("fhe_public_key").unwrap().as_deref(),
            Some("pk_2_def")
        );
        assert!(!dir.path().join("keys.json.tmp").exists());
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }
}
