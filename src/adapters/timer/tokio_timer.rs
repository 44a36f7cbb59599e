use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::BackoffTimer;

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioBackoffTimer;

#[async_trait]
impl BackoffTimer for TokioBackoffTimer {
    async fn wait(&self, delay: Duration) {
        sleep(delay).await;
    }
}
