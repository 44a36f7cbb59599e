//! OAuth handshake domain types: providers, the flow state machine and
//! callback detection.

mod callback;
mod provider;
mod status;

pub use callback::{parse_callback, CallbackDescriptor};
pub use provider::OAuthProvider;
pub use status::OAuthFlowStatus;
