//! HTTP client error definitions.

use std::time::Duration;
use thiserror::Error;

use crate::http::service::ServiceId;

/// Failure of a single attempt below the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The attempt exceeded its deadline and was aborted.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other transport-level failure.
    #[error("transport error: {0}")]
    Other(String),
}

/// Errors surfaced to callers of the HTTP client.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Non-2xx response after exhausting retries.
    #[error("{service} responded HTTP {status} to {path} after {attempts} attempt(s)")]
    Status {
        service: ServiceId,
        path: String,
        status: u16,
        attempts: u32,
    },

    /// Timeout or network failure after exhausting retries.
    #[error("{service} unreachable for {path} after {attempts} attempt(s): {source}")]
    Transport {
        service: ServiceId,
        path: String,
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// The service's circuit breaker rejected the call.
    #[error("circuit open for {service}")]
    CircuitOpen { service: ServiceId },

    /// Response body was not the expected JSON.
    #[error("invalid JSON from {service} {path}: {source}")]
    Decode {
        service: ServiceId,
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },

    #[error("invalid header value for '{0}'")]
    InvalidHeader(String),

    /// The transport could not be constructed.
    #[error("failed to build transport: {0}")]
    Setup(String),
}

impl HttpError {
    /// HTTP status for status failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, HttpError::Transport { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            HttpError::Transport {
                source: TransportError::Timeout(_),
                ..
            }
        )
    }

    /// Short status text suitable for showing next to a page section.
    pub fn user_message(&self) -> String {
        match self {
            HttpError::Status { service, status, .. } => {
                format!("{} unavailable (HTTP {})", service, status)
            }
            HttpError::Transport { service, source, .. } => match source {
                TransportError::Timeout(_) => format!("{} timed out", service),
                _ => format!("{} unreachable", service),
            },
            HttpError::CircuitOpen { service } => {
                format!("{} temporarily unavailable", service)
            }
            HttpError::Decode { service, .. } => format!("{} sent an unexpected response", service),
            _ => "request failed".to_string(),
        }
    }
}

/// Result type for HTTP client operations.
pub type HttpResult<T> = Result<T, HttpError>;
