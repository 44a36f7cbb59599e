use serde::Serialize;

use crate::domain::foundation::Timestamp;

/// Loading flag for one UI task, keyed by name in the chat context.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingState {
    pub is_loading: bool,
    pub message: Option<String>,
    pub timestamp: Timestamp,
}

impl LoadingState {
    pub fn new(is_loading: bool, message: Option<String>) -> Self {
        Self {
            is_loading,
            message,
            timestamp: Timestamp::now(),
        }
    }

    /// The state reported for keys that were never set.
    pub fn idle() -> Self {
        Self::new(false, None)
    }
}
