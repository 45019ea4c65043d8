//! Sliding-window request limiter keyed by client identifier.

use crate::infra::clock::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub struct RateLimiter {
    max_requests: usize,
    window_ms: i64,
    clock: Arc<dyn Clock>,
    requests: Mutex<Windows>,
}

/// Full sweep of idle identifiers every this many checks.
const SWEEP_INTERVAL: u64 = 256;

#[derive(Default)]
struct Windows {
    by_id: HashMap<String, Vec<i64>>,
    checks: u64,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            max_requests,
            window_ms: window.as_millis() as i64,
            clock,
            requests: Mutex::new(Windows::default()),
        }
    }

    /// Records the request and returns true if it fits in the window.
    pub async fn check(&self, identifier: &str) -> bool {
        let now = self.clock.now_millis();
        let window_ms = self.window_ms;
        let mut windows = self.requests.lock().await;

        windows.checks += 1;
        if windows.checks % SWEEP_INTERVAL == 0 {
            windows.by_id.retain(|_, hits| {
                hits.retain(|t| now - *t < window_ms);
                !hits.is_empty()
            });
        }

        let entry = windows.by_id.entry(identifier.to_string()).or_default();
        entry.retain(|t| now - *t < window_ms);
        if entry.len() >= self.max_requests {
            return false;
        }
        entry.push(now);
        true
    }

    pub async fn reset(&self, identifier: &str) {
        self.requests.lock().await.by_id.remove(identifier);
    }

    /// Identifiers currently holding a window.
    pub async fn tracked(&self) -> usize {
        self.requests.lock().await.by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::clock::ManualClock;

    #[tokio::test]
    async fn limits_within_window_and_recovers() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = RateLimiter::new(2, Duration::from_secs(60), clock.clone());

        assert!(limiter.check("1.2.3.4").await);
        assert!(limiter.check("1.2.3.4").await);
        assert!(!limiter.check("1.2.3.4").await);
        // Other clients have their own window.
        assert!(limiter.check("5.6.7.8").await);

        clock.advance(60_000);
        assert!(limiter.check("1.2.3.4").await);
    }

    #[tokio::test]
    async fn idle_identifiers_are_evicted() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = RateLimiter::new(5, Duration::from_secs(60), clock.clone());

        for i in 0..SWEEP_INTERVAL - 1 {
            assert!(limiter.check(&format!("10.0.{}.{}", i / 256, i % 256)).await);
        }
        assert_eq!(limiter.tracked().await as u64, SWEEP_INTERVAL - 1);

        clock.advance(60_000);
        // This check triggers the sweep; only the caller's fresh window is left.
        assert!(limiter.check("192.168.0.1").await);
        assert_eq!(limiter.tracked().await, 1);
    }

    #[tokio::test]
    async fn reset_clears_history() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60), Arc::new(ManualClock::new(0)));
        assert!(limiter.check("a").await);
        assert!(!limiter.check("a").await);
        limiter.reset("a").await;
        assert!(limiter.check("a").await);
    }
}
