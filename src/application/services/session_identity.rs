//! Session identity manager - the one active conversation session id.
//!
//! The id is persisted under the session key so it survives reloads.
//! Storage failures are logged and never surfaced: the in-memory id stays
//! authoritative for the lifetime of the manager.

use serde_json::{Map, Value};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use crate::domain::foundation::Timestamp;
use crate::domain::session::{Session, SessionId};
use crate::ports::{read_json, write_json, KeyValueStore};

/// Default storage key for the session id.
pub const DEFAULT_SESSION_KEY: &str = "chatbot-session";

pub struct SessionIdentityManager {
    store: Arc<dyn KeyValueStore>,
    key: String,
    current: RwLock<Session>,
}

impl SessionIdentityManager {
    /// Loads the persisted id, or generates and persists a fresh one.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, DEFAULT_SESSION_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let session = match store.get(&key) {
            Ok(Some(raw)) if !raw.trim().is_empty() => match SessionId::parse(raw) {
                Ok(id) => {
                    debug!(session_id = %id, "Restored session");
                    Session::new(id, Timestamp::now())
                }
                Err(_) => Self::start_and_persist(store.as_ref(), &key),
            },
            Ok(_) => Self::start_and_persist(store.as_ref(), &key),
            Err(e) => {
                warn!(error = %e, "Session storage unreadable, using ephemeral session");
                Session::start()
            }
        };

        Self {
            store,
            key,
            current: RwLock::new(session),
        }
    }

    fn start_and_persist(store: &dyn KeyValueStore, key: &str) -> Session {
        let session = Session::start();
        if let Err(e) = store.set(key, session.id.as_str()) {
            warn!(error = %e, "Failed to persist new session id");
        }
        info!(session_id = %session.id, "Started new session");
        session
    }

    fn data_key(&self) -> String {
        format!("{}_data", self.key)
    }

    pub fn current(&self) -> Session {
        match self.current.read() {
            Ok(session) => session.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn current_id(&self) -> SessionId {
        self.current().id
    }

    /// Adopts `new_id` (typically the id echoed by the backend).
    ///
    /// Blank ids are ignored and `false` is returned.
    pub fn update(&self, new_id: &str) -> bool {
        let Ok(id) = SessionId::parse(new_id) else {
            return false;
        };

        if let Err(e) = self.store.set(&self.key, id.as_str()) {
            warn!(error = %e, "Failed to persist session id");
        }
        self.replace(Session::new(id, Timestamp::now()));
        true
    }

    /// Replaces the session with a freshly generated one and returns its id.
    pub fn clear(&self) -> SessionId {
        if let Err(e) = self.store.remove(&self.key) {
            warn!(error = %e, "Failed to remove session id");
        }
        let session = Self::start_and_persist(self.store.as_ref(), &self.key);
        let id = session.id.clone();
        self.replace(session);
        id
    }

    /// Auxiliary data stored next to the session id. Empty if absent or
    /// unreadable.
    pub fn session_data(&self) -> Map<String, Value> {
        match read_json::<Map<String, Value>>(self.store.as_ref(), &self.data_key()) {
            Ok(data) => data.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session data");
                Map::new()
            }
        }
    }

    /// Shallow-merges `data` into the stored session data.
    pub fn set_session_data(&self, data: Map<String, Value>) {
        let mut merged = self.session_data();
        merged.extend(data);
        if let Err(e) = write_json(self.store.as_ref(), &self.data_key(), &merged) {
            warn!(error = %e, "Failed to persist session data");
        }
    }

    fn replace(&self, session: Session) {
        match self.current.write() {
            Ok(mut current) => *current = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }
}
