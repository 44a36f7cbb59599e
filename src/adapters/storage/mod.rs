//! Storage Adapters
//!
//! Implementations of the KeyValueStore port.
//!
//! ## Available Adapters
//!
//! - **FileKeyValueStore** - One JSON document on disk, rewritten on every change
//! - **InMemoryKeyValueStore** - Process-local map (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileKeyValueStore, InMemoryKeyValueStore};
//!
//! // Durable across restarts
//! let store = FileKeyValueStore::open("./data/local-storage.json")?;
//!
//! // Testing
//! let store = InMemoryKeyValueStore::new();
//! ```

mod file_key_value_store;
mod in_memory_key_value_store;

pub use file_key_value_store::FileKeyValueStore;
pub use in_memory_key_value_store::InMemoryKeyValueStore;
