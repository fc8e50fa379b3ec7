//! Time source
//!
//! The completion waiter and the rebuild flow read time through [`Clock`] so that
//! tests can drive a manual clock instead of sleeping for real.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

#[async_trait]
pub trait Clock: Send + Sync {
    /// Monotonic instant used for deadlines
    fn now(&self) -> Instant;

    /// Wall-clock time used for names and annotations
    fn utc_now(&self) -> DateTime<Utc>;

    /// Suspends the caller for the given duration
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the system and tokio timers
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
