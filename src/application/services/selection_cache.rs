//! Cache of the reader's last text selection.
//!
//! The widget on one page hands the highlighted passage to the chat opened on
//! the next; entries older than the TTL are discarded on read.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::foundation::Timestamp;
use crate::domain::selection::{SelectionSnapshot, DEFAULT_SELECTION_TTL};
use crate::ports::{read_json, write_json, KeyValueStore};

pub const DEFAULT_SELECTION_KEY: &str = "chatbot_selected_text";

pub struct SelectionCache {
    store: Arc<dyn KeyValueStore>,
    key: String,
    ttl: Duration,
}

impl SelectionCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            key: DEFAULT_SELECTION_KEY.to_string(),
            ttl: DEFAULT_SELECTION_TTL,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stores a selection. Blank text clears the cache instead.
    pub fn store(&self, text: &str, context: Value, url: Option<String>) {
        if text.trim().is_empty() {
            self.clear();
            return;
        }
        let snapshot = SelectionSnapshot::new(text, context, url);
        if let Err(e) = write_json(self.store.as_ref(), &self.key, &snapshot) {
            warn!(error = %e, "Failed to cache selection");
        }
    }

    pub fn retrieve(&self) -> Option<SelectionSnapshot> {
        self.retrieve_at(Timestamp::now())
    }

    /// Returns the cached selection if it is still fresh at `now`.
    pub fn retrieve_at(&self, now: Timestamp) -> Option<SelectionSnapshot> {
        match read_json::<SelectionSnapshot>(self.store.as_ref(), &self.key) {
            Ok(Some(snapshot)) if snapshot.is_fresh(now, self.ttl) => Some(snapshot),
            Ok(Some(_)) => {
                debug!("Cached selection expired");
                self.clear();
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable cached selection");
                self.clear();
                None
            }
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.remove(&self.key) {
            warn!(error = %e, "Failed to clear cached selection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryKeyValueStore;
    use serde_json::json;

    fn cache() -> (SelectionCache, InMemoryKeyValueStore) {
        let store = InMemoryKeyValueStore::new();
        (SelectionCache::new(Arc::new(store.clone())), store)
    }

    #[test]
    fn stores_and_retrieves_fresh_selection() {
        let (cache, _) = cache();
        cache.store(
            "A digital twin mirrors a physical asset.",
            json!({"chapter": 4}),
            Some("https://book.example/ch4".into()),
        );

        let snapshot = cache.retrieve().unwrap();
        assert_eq!(snapshot.text, "A digital twin mirrors a physical asset.");
        assert_eq!(snapshot.context["chapter"], 4);
    }

    #[test]
    fn stale_selection_is_discarded_on_read() {
        let (cache, store) = cache();
        cache.store("old", json!({}), None);

        let later = Timestamp::now().plus_secs(3601);
        assert!(cache.retrieve_at(later).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn custom_ttl_applies() {
        let (cache, _) = cache();
        let cache = cache.with_ttl(Duration::from_secs(10));
        cache.store("short", json!({}), None);

        assert!(cache.retrieve_at(Timestamp::now().plus_secs(5)).is_some());
        assert!(cache.retrieve_at(Timestamp::now().plus_secs(11)).is_none());
    }

    #[test]
    fn blank_text_clears() {
        let (cache, store) = cache();
        cache.store("something", json!({}), None);
        cache.store("  ", json!({}), None);
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_entry_reads_as_empty() {
        let (cache, store) = cache();
        store.set(DEFAULT_SELECTION_KEY, "garbage").unwrap();
        assert!(cache.retrieve().is_none());
        assert!(store.is_empty());
    }
}
