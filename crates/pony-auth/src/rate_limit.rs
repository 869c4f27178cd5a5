//! Sliding-window-log rate limiter.
//!
//! Each key keeps the instants of its admitted requests. A request is
//! admitted when fewer than `max_requests` of those instants fall
//! inside the trailing window; rejected requests are not recorded.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Outcome of [`SlidingWindowLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Rejected,
}

impl Admission {
    pub fn is_allowed(self) -> bool {
        matches!(self, Admission::Allowed)
    }
}

pub struct SlidingWindowLimiter {
    window: Duration,
    max_requests: usize,
    log: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10);
    pub const DEFAULT_MAX_REQUESTS: usize = 5;

    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            window,
            max_requests,
            log: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Admit or reject one request for `key`.
    pub fn check(&self, key: &str) -> Admission {
        let now = Instant::now();
        let mut log = self.log.lock();
        let stamps = log.entry(key.to_string()).or_default();

        while let Some(oldest) = stamps.front() {
            if now.duration_since(*oldest) >= self.window {
                stamps.pop_front();
            } else {
                break;
            }
        }

        if stamps.len() >= self.max_requests {
            debug!(key, "Rate limit exceeded");
            return Admission::Rejected;
        }

        stamps.push_back(now);
        Admission::Allowed
    }

    /// Drop keys whose every recorded instant has left the window.
    /// Returns the number of keys removed.
    pub fn purge_stale(&self) -> usize {
        let now = Instant::now();
        let mut log = self.log.lock();
        let before = log.len();
        log.retain(|_, stamps| {
            stamps
                .back()
                .is_some_and(|newest| now.duration_since(*newest) < self.window)
        });
        before - log.len()
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.log.lock().len()
    }
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW, Self::DEFAULT_MAX_REQUESTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sixth_request_in_window_is_rejected() {
        let limiter = SlidingWindowLimiter::default();
        for _ in 0..5 {
            assert_eq!(limiter.check("10.0.0.1"), Admission::Allowed);
        }
        assert_eq!(limiter.check("10.0.0.1"), Admission::Rejected);
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_independent() {
        let limiter = SlidingWindowLimiter::new(Duration::from_secs(10), 1);
        assert!(limiter.check("a").is_allowed());
        assert!(!limiter.check("a").is_allowed());
        assert!(limiter.check("b").is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn window_slides() {
        let limiter = SlidingWindowLimiter::default();
        for _ in 0..5 {
            limiter.check("k");
            tokio::time::advance(Duration::from_secs(1)).await;
        }
        // t = 5s: five admitted at t = 0..4.
        assert_eq!(limiter.check("k"), Admission::Rejected);

        // t = 10s: the request at t = 0 has aged out.
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(limiter.check("k"), Admission::Allowed);
        assert_eq!(limiter.check("k"), Admission::Rejected);
    }

    #[tokio::test(start_paused = true)]
    async fn rejections_are_not_recorded() {
        let limiter = SlidingWindowLimiter::new(Duration::from_secs(10), 2);
        limiter.check("k");
        limiter.check("k");
        for _ in 0..10 {
            assert_eq!(limiter.check("k"), Admission::Rejected);
        }
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(limiter.check("k"), Admission::Allowed);
        assert_eq!(limiter.check("k"), Admission::Allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn purge_drops_only_idle_keys() {
        let limiter = SlidingWindowLimiter::default();
        limiter.check("idle");
        tokio::time::advance(Duration::from_secs(6)).await;
        limiter.check("busy");
        tokio::time::advance(Duration::from_secs(5)).await;

        assert_eq!(limiter.purge_stale(), 1);
        assert_eq!(limiter.tracked_keys(), 1);
        assert_eq!(limiter.check("busy"), Admission::Allowed);
    }
}
