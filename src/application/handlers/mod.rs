//! Command handlers driven by the chat widget.

pub mod chat;

pub use chat::{
    ClearChatHandler, SendChatMessageCommand, SendChatMessageHandler, CHAT_LOADING_KEY,
    WELCOME_MESSAGE,
};
