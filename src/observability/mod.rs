//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (request IDs and trace context headers)
//!
//! Consumers:
//!     → Log output (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, opt-in)
//!     → Backend services (x-request-id / traceparent headers)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID flows through every attempt of a logical request
//! - Metrics are cheap (no-op until a recorder is installed)

pub mod logging;
pub mod metrics;
pub mod tracing;
