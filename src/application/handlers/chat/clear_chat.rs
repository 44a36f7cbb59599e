//! ClearChatHandler - starts the conversation over.

use std::sync::Arc;
use tracing::info;

use crate::application::services::SessionIdentityManager;
use crate::domain::chat::{ChatContextStore, Message};
use crate::domain::session::SessionId;

pub const WELCOME_MESSAGE: &str = "Hello! I'm your AI assistant for the Physical AI & Humanoid \
     Robotics textbook. How can I help you today?";

pub struct ClearChatHandler {
    sessions: Arc<SessionIdentityManager>,
}

impl ClearChatHandler {
    pub fn new(sessions: Arc<SessionIdentityManager>) -> Self {
        Self { sessions }
    }

    /// Empties the transcript, greets the reader again and rotates the
    /// session id so the backend starts a fresh conversation.
    pub fn handle(&self, store: &mut ChatContextStore) -> SessionId {
        store.clear();
        store.add_message(Message::assistant(WELCOME_MESSAGE));

        let session_id = self.sessions.clear();
        store.set_session_id(session_id.as_str());
        info!(session_id = %session_id, "Chat cleared");
        session_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryKeyValueStore;
    use crate::domain::chat::Sender;

    #[test]
    fn clear_leaves_only_the_welcome_message() {
        let sessions = Arc::new(SessionIdentityManager::new(Arc::new(InMemoryKeyValueStore::new())));
        let before = sessions.current_id();
        let mut store = ChatContextStore::new();
        store.add_message(Message::user("one"));
        store.add_message(Message::assistant("two"));

        let fresh = ClearChatHandler::new(sessions.clone()).handle(&mut store);

        assert_eq!(store.message_count(), 1);
        assert_eq!(store.messages()[0].sender, Sender::Assistant);
        assert_eq!(store.messages()[0].content, WELCOME_MESSAGE);
        assert_ne!(fresh, before);
        assert_eq!(store.session_id(), Some(fresh.as_str()));
    }
}
