//! Application services wiring domain logic to the ports.

mod api_client;
mod auth_session;
mod oauth_flow;
mod request_executor;
mod selection_cache;
mod session_identity;

pub use api_client::{
    ApiError, ChatRequest, ChatResponse, HealthResponse, IngestionResponse, TextbookApiClient,
};
pub use auth_session::{AuthSessionError, AuthSessionManager, DEFAULT_TOKEN_KEY, DEFAULT_USER_KEY};
pub use oauth_flow::{OAuthError, OAuthFlowController, DEFAULT_OAUTH_STATE_KEY};
pub use request_executor::{RequestError, RequestExecutor, ResponseBody};
pub use selection_cache::{SelectionCache, DEFAULT_SELECTION_KEY};
pub use session_identity::{SessionIdentityManager, DEFAULT_SESSION_KEY};
