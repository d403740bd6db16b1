//! Test timer — records requested suspensions instead of sleeping.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use otherworlds_core::clock::Timer;

/// A timer that records every requested duration and yields once to the
/// scheduler instead of waiting. The yield keeps the suspension point real,
/// so concurrently polled futures still interleave there.
#[derive(Debug, Default)]
pub struct RecordingTimer {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingTimer {
    /// Creates a timer with no recorded sleeps.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every requested duration, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Timer for RecordingTimer {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}
