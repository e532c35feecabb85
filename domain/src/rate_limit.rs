//! Admission control for expensive operations (uploads and processing runs).
//!
//! Limiters are injected where they are needed rather than kept as process globals, so a
//! deployment running several instances can swap in an implementation backed by a
//! shared store.

use dashmap::DashMap;
use log::*;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;

/// A request was rejected because its key used up the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Rate limit exceeded, retry in {} seconds", retry_after_secs(.retry_after))]
pub struct RateLimited {
    pub retry_after: Duration,
}

impl RateLimited {
    /// Whole seconds until the window resets, never less than one.
    pub fn retry_after_secs(&self) -> u64 {
        retry_after_secs(&self.retry_after)
    }
}

fn retry_after_secs(retry_after: &Duration) -> u64 {
    retry_after.as_secs_f64().ceil().max(1.0) as u64
}

/// Decides whether another request for `key` may proceed right now.
pub trait RateLimiter: Send + Sync {
    /// Counts one request against `key`, rejecting it once the limit is reached.
    fn check(&self, key: &str) -> Result<(), RateLimited>;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// In-memory fixed-window limiter: at most `limit` requests per key per `window`.
///
/// Expired windows are dropped at most once per `window`, on the next check.
pub struct FixedWindowRateLimiter {
    limit: u32,
    window: Duration,
    windows: DashMap<String, Window>,
    last_purge: Mutex<Instant>,
}

impl FixedWindowRateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: DashMap::new(),
            last_purge: Mutex::new(Instant::now()),
        }
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), RateLimited> {
        self.purge_if_due(now);

        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        let elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count < self.limit {
            entry.count += 1;
            return Ok(());
        }

        let retry_after = self
            .window
            .saturating_sub(now.saturating_duration_since(entry.started));
        debug!("Rate limit of {} reached for {key}", self.limit);
        Err(RateLimited { retry_after })
    }

    // Must run before an entry guard is taken, retain locks every shard
    fn purge_if_due(&self, now: Instant) {
        // A concurrent check is already purging
        let Ok(mut last_purge) = self.last_purge.try_lock() else {
            return;
        };
        if now.saturating_duration_since(*last_purge) < self.window {
            return;
        }
        *last_purge = now;
        drop(last_purge);

        let before = self.windows.len();
        self.windows
            .retain(|_, window| now.saturating_duration_since(window.started) < self.window);
        trace!(
            "Purged {} expired rate limit windows",
            before.saturating_sub(self.windows.len())
        );
    }
}

impl RateLimiter for FixedWindowRateLimiter {
    fn check(&self, key: &str) -> Result<(), RateLimited> {
        self.check_at(key, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_the_limit_then_rejects() {
        let limiter = FixedWindowRateLimiter::new(5, Duration::from_secs(60));
        let now = Instant::now();

        for _ in 0..5 {
            assert!(limiter.check_at("user-1", now).is_ok());
        }

        let rejected = limiter
            .check_at("user-1", now + Duration::from_secs(20))
            .unwrap_err();
        assert_eq!(rejected.retry_after, Duration::from_secs(40));
        assert_eq!(rejected.retry_after_secs(), 40);
    }

    #[test]
    fn keys_are_limited_independently() {
        let limiter = FixedWindowRateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.check_at("user-1", now).is_ok());
        assert!(limiter.check_at("user-1", now).is_err());
        assert!(limiter.check_at("user-2", now).is_ok());
    }

    #[test]
    fn a_new_window_resets_the_count() {
        let limiter = FixedWindowRateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.check_at("user-1", now).is_ok());
        assert!(limiter.check_at("user-1", now + Duration::from_secs(59)).is_err());
        assert!(limiter.check_at("user-1", now + Duration::from_secs(60)).is_ok());
    }

    #[test]
    fn retry_after_rounds_up_to_whole_seconds() {
        let rejected = RateLimited {
            retry_after: Duration::from_millis(1500),
        };
        assert_eq!(rejected.retry_after_secs(), 2);
        assert_eq!(
            RateLimited {
                retry_after: Duration::ZERO
            }
            .retry_after_secs(),
            1
        );
    }

    #[test]
    fn expired_windows_are_dropped_on_a_later_check() {
        let limiter = FixedWindowRateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.check_at("user-1", now).is_ok());
        assert!(limiter.check_at("user-2", now + Duration::from_secs(30)).is_ok());
        assert_eq!(limiter.windows.len(), 2);

        assert!(limiter.check_at("user-3", now + Duration::from_secs(61)).is_ok());

        assert!(!limiter.windows.contains_key("user-1"));
        assert!(limiter.windows.contains_key("user-2"));
        assert_eq!(limiter.windows.len(), 2);
    }

    #[test]
    fn live_windows_survive_a_purge() {
        let limiter = FixedWindowRateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.check_at("user-1", now + Duration::from_secs(50)).is_ok());
        assert!(limiter
            .check_at("user-1", now + Duration::from_secs(100))
            .is_err());
    }
}
