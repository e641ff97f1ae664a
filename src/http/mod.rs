//! Outbound HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! caller (ServiceId, path, RequestOptions)
//!     → service.rs (resolve base URL + path)
//!     → client.rs (breaker check, retry loop)
//!         → request.rs (per-attempt copy + x-request-id + traceparent)
//!         → transport.rs (reqwest, bounded by resilience::timeouts)
//!     → response.rs (buffered status/headers/body)
//!     → caller, or HttpError with the service and failure kind
//! ```

pub mod client;
pub mod error;
pub mod request;
pub mod response;
pub mod service;
pub mod transport;

pub use client::{HttpClient, HttpClientBuilder};
pub use error::{HttpError, HttpResult, TransportError};
pub use request::{OutgoingRequest, RequestOptions};
pub use response::RawResponse;
pub use service::{ServiceDirectory, ServiceId};
pub use transport::{ReqwestTransport, Transport};
