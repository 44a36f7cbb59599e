//! Application layer - services and handlers.
//!
//! Services own a single concern each (retrying requests, the session id,
//! auth state, the OAuth handshake, the selection cache). Handlers compose
//! them into the actions the chat widget performs.

pub mod handlers;
pub mod services;
mod state;

pub use state::{ChatClientPorts, ChatClientState, PageLoad};
pub use handlers::{ClearChatHandler, SendChatMessageCommand, SendChatMessageHandler};
pub use services::{
    ApiError, AuthSessionManager, OAuthFlowController, RequestExecutor, SelectionCache,
    SessionIdentityManager, TextbookApiClient,
};
