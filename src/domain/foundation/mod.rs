//! Foundation module - Shared domain primitives.
//!
//! Contains the identifiers, timestamps, error types and the state machine
//! trait used by every other domain module.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{to_base36, MessageId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
