//! Chat handlers - the send and clear actions of the chat widget.

mod clear_chat;
mod send_message;

pub use clear_chat::{ClearChatHandler, WELCOME_MESSAGE};
pub use send_message::{SendChatMessageCommand, SendChatMessageHandler, CHAT_LOADING_KEY};
