//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound each attempt with a wall-clock deadline
//! - Cancel the attempt cleanly on expiry
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; expiry drops the in-flight future,
//!   which aborts the underlying request
//! - Timeout errors are distinct from other errors

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// The attempt did not finish within its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("attempt timed out after {0:?}")]
pub struct Elapsed(pub Duration);

/// Run `future` with a deadline.
pub async fn with_timeout<F, T>(limit: Duration, future: F) -> Result<T, Elapsed>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| Elapsed(limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pending_future_times_out() {
        let result = with_timeout(Duration::from_millis(20), std::future::pending::<()>()).await;
        assert_eq!(result, Err(Elapsed(Duration::from_millis(20))));
    }

    #[tokio::test]
    async fn test_ready_future_passes_through() {
        let result = with_timeout(Duration::from_millis(20), async { 7 }).await;
        assert_eq!(result, Ok(7));
    }
}
