//! File-based Key-Value Store Adapter
//!
//! Keeps every entry in one JSON object on disk. Writes go through to the
//! file immediately so a new process opening the same path sees them, which
//! is how the client survives a full-page redirect.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::ports::{KeyValueStore, StorageError};

#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileKeyValueStore {
    /// Opens (or lazily creates) the store at `path`.
    ///
    /// # Errors
    ///
    /// `Io` if the file exists but cannot be read, `Corrupt` if it is not a
    /// JSON object of strings.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|e| StorageError::Io(e.to_string()))?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
                    key: path.display().to_string(),
                    reason: e.to_string(),
                })?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
            }
        }
        let raw = serde_json::to_string_pretty(entries).map_err(|e| StorageError::Serialization {
            key: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        fs::write(&self.path, raw).map_err(|e| StorageError::Io(e.to_string()))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.lock()?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.lock()?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn entries_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileKeyValueStore::open(&path).unwrap();
        store.set("chatbot-session", "session_abc_12345").unwrap();
        store.set("oauth_state", "xyz").unwrap();
        store.remove("oauth_state").unwrap();
        drop(store);

        let reopened = FileKeyValueStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("chatbot-session").unwrap().as_deref(),
            Some("session_abc_12345")
        );
        assert_eq!(reopened.get("oauth_state").unwrap(), None);
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::open(dir.path().join("absent.json")).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(matches!(
            FileKeyValueStore::open(&path),
            Err(StorageError::Corrupt { .. })
        ));
    }
}
