use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::ports::BackoffTimer;

/// Test timer: does not sleep, records every requested delay.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackoffTimer {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingBackoffTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().map(|w| w.clone()).unwrap_or_default()
    }

    pub fn total_wait(&self) -> Duration {
        self.waits().into_iter().sum()
    }
}

#[async_trait]
impl BackoffTimer for RecordingBackoffTimer {
    async fn wait(&self, delay: Duration) {
        if let Ok(mut waits) = self.waits.lock() {
            waits.push(delay);
        }
    }
}
