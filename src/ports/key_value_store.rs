//! Key-Value Store Port - durable string storage that survives reloads.
//!
//! Models browser-style local storage: string keys, string values, shared by
//! every component of the client.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Errors from the storage substrate.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("stored value for '{key}' is not valid JSON: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("failed to serialize value for '{key}': {reason}")]
    Serialization { key: String, reason: String },
}

/// Port for persisted key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Reads and deserializes a JSON value.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key)? {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            }),
    }
}

/// Serializes and writes a JSON value.
pub fn write_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|e| StorageError::Serialization {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    store.set(key, &raw)
}
