//! Transport abstraction.
//!
//! The client only needs "send one request, get one buffered response". The
//! production implementation is reqwest; tests plug in scripted transports.

use async_trait::async_trait;

use crate::http::error::{HttpError, TransportError};
use crate::http::request::OutgoingRequest;
use crate::http::response::RawResponse;

/// Sends a single attempt.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| HttpError::Setup(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client (custom TLS, proxies, pooling).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(classify)?;

        Ok(RawResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}
