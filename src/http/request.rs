//! Request descriptors.
//!
//! # Responsibilities
//! - Carry caller-supplied method, headers and body
//! - Build the per-attempt request handed to the transport
//! - Attach correlation headers (request ID, traceparent)
//!
//! # Design Decisions
//! - Caller options are never mutated; each attempt gets its own copy
//! - Bodies are buffered bytes so they can be replayed on retry

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::http::error::HttpError;
use crate::observability::tracing::{RequestIds, TraceContext, TRACEPARENT, X_REQUEST_ID};

/// Caller-side request options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl RequestOptions {
    /// A `GET` with no headers.
    pub fn get() -> Self {
        Self::default()
    }

    /// A `POST` with no body yet.
    pub fn post() -> Self {
        Self::default().method(Method::POST)
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Serialize `value` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, HttpError> {
        let body = serde_json::to_vec(value).map_err(HttpError::Encode)?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(body);
        Ok(self)
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// One attempt as seen by the transport.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl OutgoingRequest {
    /// Build an attempt from caller options plus correlation headers.
    pub fn build(
        url: &Url,
        options: &RequestOptions,
        ids: &RequestIds,
        trace: &TraceContext,
    ) -> Result<Self, HttpError> {
        let mut headers = options.headers.clone();
        headers.insert(X_REQUEST_ID, header_value(X_REQUEST_ID, &ids.request_id.to_string())?);
        headers.insert(TRACEPARENT, header_value(TRACEPARENT, &trace.traceparent())?);

        Ok(Self {
            method: options.method.clone(),
            url: url.clone(),
            headers,
            body: options.body.clone(),
        })
    }

    /// Header value as text, if present and visible ASCII.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, HttpError> {
    HeaderValue::from_str(value).map_err(|_| HttpError::InvalidHeader(name.to_string()))
}
