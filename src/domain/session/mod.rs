//! Conversational session identity.
//!
//! A session id ties chat turns together on the backend. Exactly one is
//! active at a time; clearing the conversation replaces it wholesale.

mod identity;

pub use identity::{Session, SessionId};
