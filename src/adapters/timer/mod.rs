//! Backoff timer adapters.
//!
//! - **TokioBackoffTimer** - real sleeps
//! - **RecordingBackoffTimer** - returns immediately, remembers each delay

mod recording_timer;
mod tokio_timer;

pub use recording_timer::RecordingBackoffTimer;
pub use tokio_timer::TokioBackoffTimer;
