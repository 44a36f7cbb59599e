//! Domain layer containing the client's core types and pure logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, errors, state machine)
//! - `classification` - Failure taxonomy and the pure classifier
//! - `retry` - Exponential backoff policy
//! - `contract` - Request/response schemas and the validation engine
//! - `session` - Conversational session identity
//! - `chat` - Messages, loading flags and the chat context store
//! - `oauth` - Provider login handshake states and callback detection
//! - `auth` - Signed-in user, credentials and preferences
//! - `selection` - Cached selected-text snapshot

pub mod auth;
pub mod chat;
pub mod classification;
pub mod contract;
pub mod foundation;
pub mod oauth;
pub mod retry;
pub mod selection;
pub mod session;
