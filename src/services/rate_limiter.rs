//! Failed-login throttle
//!
//! Counts failed logins per username inside a sliding window. Once the limit
//! is reached, further attempts for that username are refused until old
//! failures age out of the window.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Login rate limiter
pub struct LoginRateLimiter {
    failures: RwLock<HashMap<String, Vec<DateTime<Utc>>>>,
    max_attempts: usize,
    window: Duration,
}

impl LoginRateLimiter {
    pub fn new(max_attempts: u32, window_seconds: u64) -> Self {
        let window = i64::try_from(window_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(|| Duration::minutes(15));
        Self {
            failures: RwLock::new(HashMap::new()),
            max_attempts: max_attempts.max(1) as usize,
            window,
        }
    }

    pub fn window_seconds(&self) -> i64 {
        self.window.num_seconds()
    }

    /// True when the username has used up its attempts in the current window
    pub async fn is_limited(&self, username: &str) -> bool {
        let cutoff = Utc::now() - self.window;
        let mut failures = self.failures.write().await;
        match failures.get_mut(&username.to_lowercase()) {
            Some(times) => {
                times.retain(|time| *time > cutoff);
                times.len() >= self.max_attempts
            }
            None => false,
        }
    }

    pub async fn record_failure(&self, username: &str) {
        self.failures
            .write()
            .await
            .entry(username.to_lowercase())
            .or_default()
            .push(Utc::now());
    }

    /// Forget failures after a successful login
    pub async fn clear(&self, username: &str) {
        self.failures.write().await.remove(&username.to_lowercase());
    }

    /// Drop usernames whose failures all fell out of the window
    pub async fn cleanup(&self) -> usize {
        let cutoff = Utc::now() - self.window;
        let mut failures = self.failures.write().await;
        let before = failures.len();
        failures.retain(|_, times| {
            times.retain(|time| *time > cutoff);
            !times.is_empty()
        });
        before - failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limit_after_max_failures() {
        let limiter = LoginRateLimiter::new(3, 900);
        for _ in 0..2 {
            assert!(!limiter.is_limited("admin").await);
            limiter.record_failure("admin").await;
        }
        assert!(!limiter.is_limited("admin").await);

        limiter.record_failure("admin").await;
        assert!(limiter.is_limited("admin").await);
        assert!(!limiter.is_limited("someone-else").await);

        limiter.clear("admin").await;
        assert!(!limiter.is_limited("admin").await);
    }

    #[tokio::test]
    async fn test_username_case_insensitive() {
        let limiter = LoginRateLimiter::new(2, 900);
        limiter.record_failure("Admin").await;
        limiter.record_failure("ADMIN").await;
        assert!(limiter.is_limited("admin").await);
    }

    #[tokio::test]
    async fn test_cleanup_keeps_recent_failures() {
        let limiter = LoginRateLimiter::new(5, 900);
        limiter.record_failure("admin").await;
        assert_eq!(limiter.cleanup().await, 0);
        assert_eq!(limiter.failures.read().await.len(), 1);
    }
}
