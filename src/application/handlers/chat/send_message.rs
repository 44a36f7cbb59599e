//! SendChatMessageHandler - one question/answer round trip.

use std::sync::Arc;
use tracing::{info, warn};

use crate::application::services::{ApiError, ChatRequest, SessionIdentityManager, TextbookApiClient};
use crate::domain::chat::{ChatContextStore, Message, MessagePatch, MessageStatus};
use crate::domain::contract::ApiEndpoint;

/// Loading-flag key for an in-flight chat request.
pub const CHAT_LOADING_KEY: &str = "chat";

/// Command to ask the assistant a question.
#[derive(Debug, Clone)]
pub struct SendChatMessageCommand {
    pub message: String,
    /// Highlighted passage to ask about. Falls back to the store's selection.
    pub selected_text: Option<String>,
}

impl SendChatMessageCommand {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            selected_text: None,
        }
    }

    pub fn with_selected_text(mut self, text: impl Into<String>) -> Self {
        self.selected_text = Some(text.into());
        self
    }
}

/// Handler for sending chat messages.
pub struct SendChatMessageHandler {
    api: TextbookApiClient,
    sessions: Arc<SessionIdentityManager>,
}

impl SendChatMessageHandler {
    pub fn new(api: TextbookApiClient, sessions: Arc<SessionIdentityManager>) -> Self {
        Self { api, sessions }
    }

    /// Sends the question and records both sides in the transcript.
    ///
    /// On failure the user message is marked as errored and an assistant
    /// message carrying the user-facing error text is appended. The loading
    /// flag is cleared either way.
    pub async fn handle(
        &self,
        store: &mut ChatContextStore,
        cmd: SendChatMessageCommand,
    ) -> Result<Message, ApiError> {
        let selected_text = cmd
            .selected_text
            .or_else(|| store.selected_text().map(str::to_string))
            .filter(|t| !t.trim().is_empty());

        let mut request =
            ChatRequest::new(cmd.message.trim()).with_session_id(self.sessions.current_id().as_str());
        if let Some(text) = &selected_text {
            request = request.with_selected_text(text.clone());
        }

        // Rejected input never reaches the transcript.
        let payload =
            serde_json::to_value(&request).map_err(|e| ApiError::UnexpectedShape(e.to_string()))?;
        let check = ApiEndpoint::Chat.validate_request(&payload);
        if !check.is_valid() {
            return Err(ApiError::InvalidRequest(check));
        }

        let user_message = Message::user(request.message.clone());
        let user_id = user_message.id.clone();
        store.add_message(user_message);
        if let Some(text) = &selected_text {
            store.add_message(Message::system(format!("Asking about the selected text: \"{}\"", text)));
        }
        store.set_user_input("");
        store.set_loading(CHAT_LOADING_KEY, true, Some("Thinking...".to_string()));

        let outcome = self.api.chat(&request).await;
        store.set_loading(CHAT_LOADING_KEY, false, None);

        match outcome {
            Ok(response) => {
                if self.sessions.update(&response.session_id) {
                    info!(session_id = %response.session_id, "Adopted server session id");
                }
                store.set_session_id(response.session_id.clone());
                store.update_message(&user_id, MessagePatch::status(MessageStatus::Delivered));
                if selected_text.is_some() {
                    store.set_selected_text(None);
                }

                let mut reply = Message::assistant(response.response).with_sources(response.sources);
                if let Some(mode) = response.mode {
                    reply = reply.with_mode(mode);
                }
                if let Some(count) = response.retrieved_chunks_count {
                    reply = reply.with_retrieved_chunks(count);
                }
                store.add_message(reply.clone());
                Ok(reply)
            }
            Err(e) => {
                let classification = e.classification();
                warn!(kind = %classification.kind(), error = %e, "Chat request failed");
                store.update_message(&user_id, MessagePatch::status(MessageStatus::Error));
                store.add_message(
                    Message::assistant(classification.message()).with_status(MessageStatus::Error),
                );
                Err(e)
            }
        }
    }
}
