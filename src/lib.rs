//! Textbook Chat Client - resilience layer behind the textbook assistant widget.
//!
//! Turns unreliable, rate-limited, schema-sensitive HTTP calls into a
//! dependable request/response contract for the chat UI, keeps the
//! conversational session identity stable across reloads, and drives the
//! social-login handshake.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
