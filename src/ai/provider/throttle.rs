//! Minimum-interval call throttle
//!
//! Guarantees a floor on the spacing between consecutive calls through
//! one gateway. No burst allowance: every call after the first waits for
//! whatever is left of the interval.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Owns the "last call" clock of one gateway
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Suspend until the interval since the previous call has elapsed,
    /// then stamp the current call
    pub async fn acquire(&self) {
        let mut last_call = self.last_call.lock().await;

        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let remaining = self.min_interval - elapsed;
                debug!(wait_ms = remaining.as_millis() as u64, "Throttling LLM call");
                sleep(remaining).await;
            }
        }

        *last_call = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_is_immediate() {
        let throttle = Throttle::new(Duration::from_millis(4200));
        let start = Instant::now();
        throttle.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_calls_are_spaced() {
        let throttle = Throttle::new(Duration::from_millis(500));
        let start = Instant::now();

        throttle.acquire().await;
        throttle.acquire().await;
        throttle.acquire().await;

        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_interval_passed() {
        let throttle = Throttle::new(Duration::from_millis(500));
        throttle.acquire().await;

        sleep(Duration::from_millis(800)).await;
        let before = Instant::now();
        throttle.acquire().await;

        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
