//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Logical request to a backend service:
//!     → circuit_breaker.rs (fail fast while the service's breaker is open)
//!     → timeouts.rs (bound each attempt)
//!     → On failure: retries.rs (classify, wait base*n + jitter via clock.rs Sleeper)
//!     → circuit_breaker.rs (record the final outcome)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every attempt has a deadline
//! - Linear backoff with jitter, bounded retry budget
//! - Circuit breaker prevents hammering a failing service
//! - Time is injected (Clock, Sleeper) so schedules are testable

pub mod backoff;
pub mod circuit_breaker;
pub mod clock;
pub mod retries;
pub mod timeouts;

pub use circuit_breaker::{BreakerSet, CircuitBreaker, CircuitState};
pub use clock::{Clock, ManualClock, RecordingSleeper, Sleeper, SystemClock, TokioSleeper};
pub use retries::RetryPolicy;
