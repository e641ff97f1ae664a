//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether a failed attempt may be retried
//! - Compute the delay before each retry
//! - Bound the number of attempts per logical request
//!
//! # Design Decisions
//! - Transport failures (timeouts, refused connections) are always retryable
//! - Non-2xx statuses retry by default; 4xx can be opted out (except 408/429)
//! - Attempts for one request are strictly sequential

use std::time::Duration;

use crate::config::HttpConfig;
use crate::resilience::backoff::calculate_backoff;

/// Retry budget and schedule for one logical request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base of the linear delay schedule.
    pub base_delay: Duration,
    /// Retry 4xx responses other than 408/429.
    pub retry_client_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.base_delay(),
            retry_client_errors: config.retry_client_errors,
        }
    }

    /// Total attempts including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        calculate_backoff(retry, self.base_delay)
    }

    /// Whether an attempt that ended with `status` (`None` for a transport
    /// failure) should be tried again.
    pub fn is_retryable(&self, status: Option<u16>) -> bool {
        is_retryable(status, self.retry_client_errors)
    }
}

/// Classify an attempt outcome.
pub fn is_retryable(status: Option<u16>, retry_client_errors: bool) -> bool {
    match status {
        None => true,
        Some(200..=299) => false,
        Some(408) | Some(429) => true,
        Some(400..=499) => retry_client_errors,
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.base_delay, Duration::from_millis(200));
    }

    #[test]
    fn test_classification() {
        assert!(is_retryable(None, false));
        assert!(!is_retryable(Some(200), true));
        assert!(!is_retryable(Some(204), true));
        assert!(is_retryable(Some(503), false));
        assert!(is_retryable(Some(404), true));
        assert!(!is_retryable(Some(404), false));
        assert!(is_retryable(Some(429), false));
        assert!(is_retryable(Some(408), false));
    }

    #[test]
    fn test_delay_schedule() {
        let policy = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(50),
            retry_client_errors: true,
        };
        let first = policy.delay_for(1);
        let second = policy.delay_for(2);
        assert!(first >= Duration::from_millis(50) && first < Duration::from_millis(100));
        assert!(second >= Duration::from_millis(100) && second < Duration::from_millis(150));
    }
}
