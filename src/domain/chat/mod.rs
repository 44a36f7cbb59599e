//! Chat module - messages, loading flags and the in-memory chat context.

mod context;
mod loading;
mod message;

pub use context::{ChatContextStore, ContextSummary};
pub use loading::LoadingState;
pub use message::{Message, MessagePatch, MessageStatus, Sender};
