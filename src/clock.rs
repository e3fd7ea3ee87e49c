//! Time source and sleeper used by the probe loop.
//!
//! Injected so that pacing can be exercised without real-time waits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

#[async_trait]
pub trait Clock: Send + Sync {
    /// Current UTC wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Suspend for at least `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `chrono` and the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
