//! Clock and timer abstractions for determinism.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Abstraction over system time for deterministic behavior.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Abstraction over cooperative suspension.
///
/// Transitions suspend through this trait rather than an inline scheduled
/// callback, so tests can substitute a timer that resolves immediately and
/// records what was requested.
#[async_trait]
pub trait Timer: Send + Sync {
    /// Suspends the calling task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Production timer backed by the tokio time driver.
#[derive(Debug, Clone, Copy)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_timer_advances_paused_clock_by_requested_duration() {
        // Arrange
        let timer = TokioTimer;
        let started = tokio::time::Instant::now();

        // Act
        timer.sleep(Duration::from_millis(250)).await;

        // Assert
        assert!(started.elapsed() >= Duration::from_millis(250));
    }
}
