//! Backoff Timer Port - the wait between retry attempts.

use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait BackoffTimer: Send + Sync {
    async fn wait(&self, delay: Duration);
}
