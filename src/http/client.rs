//! Resilient HTTP client.
//!
//! # Responsibilities
//! - Resolve a service identifier and path to a URL
//! - Attach request ID and trace context headers
//! - Bound every attempt with a timeout
//! - Retry failed attempts on a linear jittered schedule
//! - Consult and update the service's circuit breaker
//!
//! # Design Decisions
//! - Bounded loop, no recursion; delays go through the injected Sleeper
//! - One request ID and trace ID per logical request, a new span per attempt
//! - The breaker sees one outcome per logical request, not per attempt
//! - Status failures and transport failures stay distinguishable

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use tracing::Instrument;

use crate::config::{HttpConfig, ServicesConfig, StorefrontConfig};
use crate::http::error::{HttpError, HttpResult, TransportError};
use crate::http::request::{OutgoingRequest, RequestOptions};
use crate::http::response::RawResponse;
use crate::http::service::{ServiceDirectory, ServiceId};
use crate::http::transport::{ReqwestTransport, Transport};
use crate::observability::metrics;
use crate::observability::tracing::{IdSource, OsIdSource, RequestIds};
use crate::resilience::circuit_breaker::BreakerSet;
use crate::resilience::clock::{Sleeper, SystemClock, TokioSleeper};
use crate::resilience::retries::RetryPolicy;
use crate::resilience::timeouts::{with_timeout, Elapsed};

/// Why one attempt failed.
#[derive(Debug)]
enum AttemptFailure {
    Status(u16),
    Transport(TransportError),
}

impl AttemptFailure {
    fn status(&self) -> Option<u16> {
        match self {
            AttemptFailure::Status(status) => Some(*status),
            AttemptFailure::Transport(_) => None,
        }
    }

    fn outcome(&self) -> &'static str {
        match self {
            AttemptFailure::Status(_) => "status_error",
            AttemptFailure::Transport(TransportError::Timeout(_)) => "timeout",
            AttemptFailure::Transport(_) => "transport_error",
        }
    }

    fn into_error(self, service: ServiceId, path: &str, attempts: u32) -> HttpError {
        match self {
            AttemptFailure::Status(status) => HttpError::Status {
                service,
                path: path.to_string(),
                status,
                attempts,
            },
            AttemptFailure::Transport(source) => HttpError::Transport {
                service,
                path: path.to_string(),
                attempts,
                source,
            },
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Status(status) => write!(f, "HTTP {}", status),
            AttemptFailure::Transport(e) => write!(f, "{}", e),
        }
    }
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    services: ServiceDirectory,
    policy: RetryPolicy,
    attempt_timeout: Duration,
    sleeper: Arc<dyn Sleeper>,
    ids: Arc<dyn IdSource>,
    breakers: Option<BreakerSet>,
}

/// HTTP client with timeout, retry, tracing headers and circuit breaking.
///
/// Cheap to clone; clones share the transport and breakers.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("policy", &self.inner.policy)
            .field("attempt_timeout", &self.inner.attempt_timeout)
            .field("breakers", &self.inner.breakers.is_some())
            .finish()
    }
}

impl HttpClient {
    pub fn builder(services: ServicesConfig) -> HttpClientBuilder {
        HttpClientBuilder::new(services)
    }

    /// Production client: reqwest transport, tokio timers, OS randomness and
    /// per-service breakers when enabled.
    pub fn from_config(config: &StorefrontConfig) -> HttpResult<Self> {
        let mut builder = Self::builder(config.services.clone()).http_config(&config.http);
        if config.circuit_breaker.enabled {
            builder = builder.breakers(BreakerSet::new(
                &config.circuit_breaker,
                Arc::new(SystemClock),
            ));
        }
        builder.build()
    }

    /// Issue a request, retrying per policy.
    pub async fn request(
        &self,
        service: ServiceId,
        path: &str,
        options: RequestOptions,
    ) -> HttpResult<RawResponse> {
        let url = self.inner.services.resolve(service, path)?;
        let ids = RequestIds::generate(self.inner.ids.as_ref());
        let span = tracing::info_span!(
            "http_request",
            service = %service,
            method = %options.method,
            path = %path,
            request_id = %ids.request_id,
        );

        self.execute(service, path, url, options, ids)
            .instrument(span)
            .await
    }

    /// `request`, then parse the body as JSON.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        service: ServiceId,
        path: &str,
        mut options: RequestOptions,
    ) -> HttpResult<T> {
        if !options.headers.contains_key(ACCEPT) {
            options
                .headers
                .insert(ACCEPT, HeaderValue::from_static("application/json"));
        }
        let response = self.request(service, path, options).await?;
        response.json().map_err(|source| HttpError::Decode {
            service,
            path: path.to_string(),
            source,
        })
    }

    /// Shorthand for a JSON `GET`.
    pub async fn get_json<T: DeserializeOwned>(&self, service: ServiceId, path: &str) -> HttpResult<T> {
        self.request_json(service, path, RequestOptions::get()).await
    }

    pub fn breakers(&self) -> Option<&BreakerSet> {
        self.inner.breakers.as_ref()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.inner.policy
    }

    async fn execute(
        &self,
        service: ServiceId,
        path: &str,
        url: url::Url,
        options: RequestOptions,
        ids: RequestIds,
    ) -> HttpResult<RawResponse> {
        let start = Instant::now();
        let inner = &self.inner;

        let breaker = inner.breakers.as_ref().and_then(|set| set.get(service));
        if let Some(breaker) = &breaker {
            if !breaker.can_request() {
                tracing::warn!("Circuit open, rejecting request");
                metrics::record_request(service.as_str(), "circuit_open", start);
                return Err(HttpError::CircuitOpen { service });
            }
        }

        let max_attempts = inner.policy.max_attempts();
        let mut trace = ids.trace;
        let mut attempt: u32 = 0;

        let failure = loop {
            attempt += 1;
            if attempt > 1 {
                let delay = inner.policy.delay_for(attempt - 1);
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying request");
                metrics::record_retry(service.as_str());
                inner.sleeper.sleep(delay).await;
                trace = trace.next_span(inner.ids.as_ref());
            }

            let request = OutgoingRequest::build(&url, &options, &ids, &trace)?;
            let failure = match with_timeout(inner.attempt_timeout, inner.transport.send(request)).await {
                Ok(Ok(response)) if response.is_success() => {
                    tracing::debug!(status = response.status, attempt, "Request succeeded");
                    if let Some(breaker) = &breaker {
                        breaker.record_success();
                    }
                    metrics::record_request(service.as_str(), "success", start);
                    return Ok(response);
                }
                Ok(Ok(response)) => AttemptFailure::Status(response.status),
                Ok(Err(e)) => AttemptFailure::Transport(e),
                Err(Elapsed(limit)) => AttemptFailure::Transport(TransportError::Timeout(limit)),
            };

            let retryable = inner.policy.is_retryable(failure.status());
            tracing::warn!(
                attempt,
                max_attempts,
                retryable,
                error = %failure,
                "Request attempt failed"
            );
            if !retryable || attempt >= max_attempts {
                break failure;
            }
        };

        if let Some(breaker) = &breaker {
            breaker.record_failure();
        }
        metrics::record_request(service.as_str(), failure.outcome(), start);
        Err(failure.into_error(service, path, attempt))
    }
}

/// Builder for [`HttpClient`].
pub struct HttpClientBuilder {
    services: ServicesConfig,
    transport: Option<Arc<dyn Transport>>,
    policy: RetryPolicy,
    attempt_timeout: Duration,
    sleeper: Arc<dyn Sleeper>,
    ids: Arc<dyn IdSource>,
    breakers: Option<BreakerSet>,
}

impl HttpClientBuilder {
    fn new(services: ServicesConfig) -> Self {
        let http = HttpConfig::default();
        Self {
            services,
            transport: None,
            policy: RetryPolicy::from_config(&http),
            attempt_timeout: http.attempt_timeout(),
            sleeper: Arc::new(TokioSleeper),
            ids: Arc::new(OsIdSource::new()),
            breakers: None,
        }
    }

    /// Apply timeout and retry settings.
    pub fn http_config(mut self, config: &HttpConfig) -> Self {
        self.policy = RetryPolicy::from_config(config);
        self.attempt_timeout = config.attempt_timeout();
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn id_source(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    pub fn breakers(mut self, breakers: BreakerSet) -> Self {
        self.breakers = Some(breakers);
        self
    }

    pub fn build(self) -> HttpResult<HttpClient> {
        let services = ServiceDirectory::from_config(&self.services)?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        Ok(HttpClient {
            inner: Arc::new(ClientInner {
                transport,
                services,
                policy: self.policy,
                attempt_timeout: self.attempt_timeout,
                sleeper: self.sleeper,
                ids: self.ids,
                breakers: self.breakers,
            }),
        })
    }
}
