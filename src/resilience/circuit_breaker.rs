//! Circuit breaker for backend protection.
//!
//! # States
//! - Closed: normal operation, requests pass through
//! - Open: backend assumed down, requests fail fast
//! - Half-Open: cooldown elapsed, a trial request may go through
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count >= threshold
//! Open → Half-Open: first can_request() at or after the cooldown deadline
//! Half-Open → Closed: any recorded success
//! Half-Open → Open: recorded failure (count is still >= threshold)
//! ```
//!
//! # Design Decisions
//! - Per-service circuit breaker (not global), see [`BreakerSet`]
//! - Pure guard: never performs I/O, callers report outcomes
//! - The Open → Half-Open transition happens inside the check itself

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::config::CircuitBreakerConfig;
use crate::http::ServiceId;
use crate::observability::metrics;
use crate::resilience::clock::{Clock, SystemClock};

/// Default failures before opening.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
/// Default time spent open.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(2000);

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failures: u32,
    next_attempt_at: Option<Instant>,
}

/// Three-state circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    failure_threshold: u32,
    cooldown: Duration,
    clock: Arc<dyn Clock>,
    inner: Mutex<BreakerState>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_THRESHOLD, DEFAULT_COOLDOWN)
    }
}

impl CircuitBreaker {
    /// Create a breaker on the system clock.
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self::with_clock(failure_threshold, cooldown, Arc::new(SystemClock))
    }

    /// Create a breaker reading time from `clock`.
    pub fn with_clock(failure_threshold: u32, cooldown: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: "default".to_string(),
            failure_threshold: failure_threshold.max(1),
            cooldown,
            clock,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failures: 0,
                next_attempt_at: None,
            }),
        }
    }

    pub fn from_config(config: &CircuitBreakerConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_clock(config.failure_threshold, config.cooldown(), clock)
    }

    /// Label used in logs and metrics.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// May a call go out now?
    pub fn can_request(&self) -> bool {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let ready = inner
                    .next_attempt_at
                    .map(|deadline| self.clock.now() >= deadline)
                    .unwrap_or(true);
                if ready {
                    self.transition(&mut inner, CircuitState::HalfOpen);
                }
                ready
            }
        }
    }

    /// Report a successful call: fully closes the breaker.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        inner.failures = 0;
        inner.next_attempt_at = None;
        if inner.state != CircuitState::Closed {
            self.transition(&mut inner, CircuitState::Closed);
        }
    }

    /// Report a failed call.
    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.failures = inner.failures.saturating_add(1);
        if inner.failures >= self.failure_threshold {
            inner.next_attempt_at = Some(self.clock.now() + self.cooldown);
            if inner.state != CircuitState::Open {
                self.transition(&mut inner, CircuitState::Open);
            }
        }
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().failures
    }

    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn transition(&self, inner: &mut BreakerState, to: CircuitState) {
        let from = inner.state;
        inner.state = to;
        match to {
            CircuitState::Open => tracing::warn!(
                breaker = %self.name,
                from = %from,
                failures = inner.failures,
                cooldown_ms = self.cooldown.as_millis() as u64,
                "Circuit opened"
            ),
            _ => tracing::info!(breaker = %self.name, from = %from, to = %to, "Circuit state changed"),
        }
        metrics::record_circuit_transition(&self.name, to.as_str());
    }
}

/// One breaker per backend service.
#[derive(Debug)]
pub struct BreakerSet {
    breakers: HashMap<ServiceId, Arc<CircuitBreaker>>,
}

impl BreakerSet {
    /// Build a breaker for every known service.
    pub fn new(config: &CircuitBreakerConfig, clock: Arc<dyn Clock>) -> Self {
        let breakers = ServiceId::ALL
            .iter()
            .map(|service| {
                let breaker = CircuitBreaker::from_config(config, clock.clone()).named(service.as_str());
                (*service, Arc::new(breaker))
            })
            .collect();
        Self { breakers }
    }

    /// The breaker guarding `service`.
    pub fn get(&self, service: ServiceId) -> Option<Arc<CircuitBreaker>> {
        self.breakers.get(&service).cloned()
    }
}
