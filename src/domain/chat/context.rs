//! In-memory chat context: transcript, loading flags and page context.

use serde::Serialize;
use std::collections::BTreeMap;

use super::loading::LoadingState;
use super::message::{Message, MessagePatch, Sender};
use crate::domain::foundation::MessageId;

/// Snapshot of the chat context for the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSummary {
    pub is_initialized: bool,
    pub message_count: usize,
    pub loading_states: BTreeMap<String, LoadingState>,
    pub has_selected_text: bool,
    pub current_page: Option<String>,
}

/// Owns the transcript and the per-key loading table.
///
/// All operations are synchronous and total. Mutation goes through `&mut self`
/// so a single task owns the store.
#[derive(Debug, Clone, Default)]
pub struct ChatContextStore {
    messages: Vec<Message>,
    loading: BTreeMap<String, LoadingState>,
    session_id: Option<String>,
    selected_text: Option<String>,
    current_page: Option<String>,
    user_input: String,
    initialized: bool,
}

impl ChatContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&mut self) {
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // ---- messages ----

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Applies `patch` to the message with `id`. Returns false (and changes
    /// nothing) if no such message exists.
    pub fn update_message(&mut self, id: &MessageId, patch: MessagePatch) -> bool {
        match self.messages.iter_mut().find(|m| &m.id == id) {
            Some(message) => {
                message.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Removes the message with `id`, returning it if present.
    pub fn remove_message(&mut self, id: &MessageId) -> Option<Message> {
        let index = self.messages.iter().position(|m| &m.id == id)?;
        Some(self.messages.remove(index))
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn messages_by_sender(&self, sender: Sender) -> Vec<&Message> {
        self.messages.iter().filter(|m| m.sender == sender).collect()
    }

    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    // ---- loading ----

    /// Replaces the loading entry for `key`. Other keys are unaffected.
    pub fn set_loading(&mut self, key: impl Into<String>, is_loading: bool, message: Option<String>) {
        self.loading
            .insert(key.into(), LoadingState::new(is_loading, message));
    }

    pub fn loading(&self, key: &str) -> Option<&LoadingState> {
        self.loading.get(key)
    }

    pub fn is_loading(&self, key: &str) -> bool {
        self.loading.get(key).is_some_and(|s| s.is_loading)
    }

    pub fn is_any_loading(&self) -> bool {
        self.loading.values().any(|s| s.is_loading)
    }

    pub fn clear_loading(&mut self, key: &str) {
        self.loading.remove(key);
    }

    // ---- page context ----

    pub fn set_session_id(&mut self, session_id: impl Into<String>) {
        self.session_id = Some(session_id.into());
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn set_selected_text(&mut self, text: Option<String>) {
        self.selected_text = text;
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.selected_text.as_deref()
    }

    pub fn set_current_page(&mut self, page: Option<String>) {
        self.current_page = page;
    }

    pub fn current_page(&self) -> Option<&str> {
        self.current_page.as_deref()
    }

    pub fn set_user_input(&mut self, input: impl Into<String>) {
        self.user_input = input.into();
    }

    pub fn user_input(&self) -> &str {
        &self.user_input
    }

    /// Drops messages, loading flags and page context in one step.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn summary(&self) -> ContextSummary {
        ContextSummary {
            is_initialized: self.initialized,
            message_count: self.messages.len(),
            loading_states: self.loading.clone(),
            has_selected_text: self.selected_text.as_deref().is_some_and(|t| !t.is_empty()),
            current_page: self.current_page.clone(),
        }
    }
}
