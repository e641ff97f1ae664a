//! Request correlation identifiers.
//!
//! # Responsibilities
//! - Generate a request ID for every logical request
//! - Generate a W3C trace context (`traceparent`) for outgoing calls
//! - Keep working when the OS random source is unavailable
//!
//! # Design Decisions
//! - No tracing backend: identifiers are synthesized locally
//! - Trace ID per logical request, fresh span ID per attempt
//! - Fallback generator is a seeded `StdRng`, deterministic for a given seed

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Request ID header name.
pub const X_REQUEST_ID: &str = "x-request-id";
/// W3C trace context header name.
pub const TRACEPARENT: &str = "traceparent";

/// Source of random bytes for identifiers.
pub trait IdSource: Send + Sync + std::fmt::Debug {
    fn fill_bytes(&self, dest: &mut [u8]);
}

/// Deterministic seeded generator, used when OS randomness is unavailable.
#[derive(Debug)]
pub struct FallbackIdSource {
    rng: Mutex<StdRng>,
}

impl FallbackIdSource {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Seed from the wall clock.
    pub fn from_time() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        Self::with_seed(nanos as u64 ^ (nanos >> 64) as u64)
    }
}

impl IdSource for FallbackIdSource {
    fn fill_bytes(&self, dest: &mut [u8]) {
        self.rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .fill_bytes(dest);
    }
}

/// OS randomness with a deterministic fallback.
#[derive(Debug)]
pub struct OsIdSource {
    fallback: FallbackIdSource,
    degraded: AtomicBool,
}

impl OsIdSource {
    pub fn new() -> Self {
        Self {
            fallback: FallbackIdSource::from_time(),
            degraded: AtomicBool::new(false),
        }
    }
}

impl Default for OsIdSource {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for OsIdSource {
    fn fill_bytes(&self, dest: &mut [u8]) {
        if let Err(e) = OsRng.try_fill_bytes(dest) {
            if !self.degraded.swap(true, Ordering::Relaxed) {
                tracing::warn!(error = %e, "OS random source unavailable, using fallback id generator");
            }
            self.fallback.fill_bytes(dest);
        }
    }
}

/// W3C trace ID / span ID pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: u128,
    pub span_id: u64,
}

impl TraceContext {
    /// New trace with a root span.
    pub fn generate(source: &dyn IdSource) -> Self {
        let mut trace = [0u8; 16];
        source.fill_bytes(&mut trace);
        Self {
            trace_id: u128::from_be_bytes(trace).max(1),
            span_id: new_span_id(source),
        }
    }

    /// Same trace, new span.
    pub fn next_span(&self, source: &dyn IdSource) -> Self {
        Self {
            trace_id: self.trace_id,
            span_id: new_span_id(source),
        }
    }

    /// `00-{trace}-{span}-01`.
    pub fn traceparent(&self) -> String {
        format!("00-{:032x}-{:016x}-01", self.trace_id, self.span_id)
    }

    /// Parse a version-00 `traceparent` header value.
    pub fn parse(header: &str) -> Option<Self> {
        let mut parts = header.split('-');
        let version = parts.next()?;
        let trace = parts.next()?;
        let span = parts.next()?;
        let flags = parts.next()?;
        if version != "00" || trace.len() != 32 || span.len() != 16 || flags.len() != 2 {
            return None;
        }
        if parts.next().is_some() {
            return None;
        }
        let trace_id = u128::from_str_radix(trace, 16).ok()?;
        let span_id = u64::from_str_radix(span, 16).ok()?;
        if trace_id == 0 || span_id == 0 {
            return None;
        }
        Some(Self { trace_id, span_id })
    }
}

fn new_span_id(source: &dyn IdSource) -> u64 {
    let mut span = [0u8; 8];
    source.fill_bytes(&mut span);
    u64::from_be_bytes(span).max(1)
}

/// Identifiers attached to one logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestIds {
    pub request_id: Uuid,
    pub trace: TraceContext,
}

impl RequestIds {
    pub fn generate(source: &dyn IdSource) -> Self {
        let mut bytes = [0u8; 16];
        source.fill_bytes(&mut bytes);
        Self {
            request_id: uuid::Builder::from_random_bytes(bytes).into_uuid(),
            trace: TraceContext::generate(source),
        }
    }
}
