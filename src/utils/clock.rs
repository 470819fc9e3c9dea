//! Time source abstraction
//!
//! The orchestrator and usage tracker take time and sleeps through this
//! trait so retry timing is deterministic under a fake clock in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Injected time source
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;

    /// Suspend the current task
    async fn sleep(&self, duration: Duration);
}

/// Production clock backed by the system time and the tokio timer
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
