//! Adapters - Implementations of port interfaces.
//!
//! - `transport` - HTTP transports (reqwest, scripted mock)
//! - `storage` - key-value stores (JSON file, in-memory)
//! - `navigation` - location/history (in-memory)
//! - `timer` - backoff timers (tokio, recording)

pub mod navigation;
pub mod storage;
pub mod timer;
pub mod transport;

pub use navigation::InMemoryNavigator;
pub use storage::{FileKeyValueStore, InMemoryKeyValueStore};
pub use timer::{RecordingBackoffTimer, TokioBackoffTimer};
pub use transport::{MockReply, MockTransport, ReqwestTransport};
