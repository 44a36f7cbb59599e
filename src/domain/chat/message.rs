//! Message entity shown in the chat transcript.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, Timestamp};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
    /// Notes generated by the client itself (errors, selection context).
    System,
}

/// Delivery status of a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    #[default]
    Sent,
    Delivered,
    Read,
    Error,
}

/// A chat message.
///
/// # Invariants
///
/// - `id` is unique within a transcript
/// - `timestamp` is set at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub content: String,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub status: MessageStatus,
    /// Retrieval mode reported by the backend for assistant replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieved_chunks_count: Option<u64>,
}

impl Message {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            content: content.into(),
            timestamp: Timestamp::now(),
            sources: Vec::new(),
            status: MessageStatus::Sent,
            mode: None,
            retrieved_chunks_count: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Sender::System, content)
    }

    pub fn with_id(mut self, id: MessageId) -> Self {
        self.id = id;
        self
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn with_retrieved_chunks(mut self, count: u64) -> Self {
        self.retrieved_chunks_count = Some(count);
        self
    }

    /// Applies every field set in `patch`, leaving the id untouched.
    pub fn apply(&mut self, patch: MessagePatch) {
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(sources) = patch.sources {
            self.sources = sources;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(mode) = patch.mode {
            self.mode = Some(mode);
        }
        if let Some(count) = patch.retrieved_chunks_count {
            self.retrieved_chunks_count = Some(count);
        }
    }
}

/// Partial update for an existing message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagePatch {
    pub content: Option<String>,
    pub sources: Option<Vec<String>>,
    pub status: Option<MessageStatus>,
    pub mode: Option<String>,
    pub retrieved_chunks_count: Option<u64>,
}

impl MessagePatch {
    pub fn status(status: MessageStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }
}
