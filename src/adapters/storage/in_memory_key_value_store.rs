//! In-Memory Key-Value Store Adapter
//!
//! Clones share the same map, so a clone handed to a second component (or a
//! "reloaded" controller in tests) sees the same data.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::ports::{KeyValueStore, StorageError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    fail_writes: Arc<RwLock<bool>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `set`/`remove` fail, simulating a full or
    /// disabled storage substrate.
    pub fn fail_writes(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_writes.write() {
            *flag = fail;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        let failing = self.fail_writes.read().map(|f| *f).unwrap_or(false);
        if failing {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        Ok(())
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Unavailable("lock poisoned".to_string())
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{read_json, write_json};
    use serde_json::json;

    #[test]
    fn set_get_remove() {
        let store = InMemoryKeyValueStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn clones_share_entries() {
        let store = InMemoryKeyValueStore::new();
        let other = store.clone();
        store.set("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn failing_writes_leave_reads_working() {
        let store = InMemoryKeyValueStore::new();
        store.set("k", "v").unwrap();
        store.fail_writes(true);

        assert!(matches!(store.set("k", "w"), Err(StorageError::Unavailable(_))));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn json_helpers_round_trip_and_flag_corruption() {
        let store = InMemoryKeyValueStore::new();
        write_json(&store, "user", &json!({"id": "1"})).unwrap();
        let value: Option<serde_json::Value> = read_json(&store, "user").unwrap();
        assert_eq!(value.unwrap()["id"], "1");

        store.set("user", "{not json").unwrap();
        let result: Result<Option<serde_json::Value>, _> = read_json(&store, "user");
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
    }
}
