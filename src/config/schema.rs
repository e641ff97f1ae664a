//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the storefront
//! client runtime. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the storefront client runtime.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Base URLs of the backend services.
    pub services: ServicesConfig,

    /// Timeout and retry settings for the HTTP client.
    pub http: HttpConfig,

    /// Circuit breaker settings (one breaker per service).
    pub circuit_breaker: CircuitBreakerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Backend service locations.
///
/// An empty base URL routes that service through `origin`, which is how a
/// deployment behind a reverse proxy is expressed.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Origin used for same-origin (relative) requests.
    pub origin: String,

    /// Inventory / catalog service base URL.
    pub inventory: String,

    /// Recommendations service base URL.
    pub recommendations: String,

    /// Checkout service base URL.
    pub checkout: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080".to_string(),
            inventory: String::new(),
            recommendations: String::new(),
            checkout: String::new(),
        }
    }
}

/// HTTP client resilience settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Wall-clock bound for a single attempt, in milliseconds.
    pub timeout_ms: u64,

    /// Retries after the first attempt (2 means 3 attempts in total).
    pub max_retries: u32,

    /// Base delay for the linear retry schedule, in milliseconds.
    pub base_delay_ms: u64,

    /// Retry 4xx responses (other than 408/429) as well.
    pub retry_client_errors: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2500,
            max_retries: 2,
            base_delay_ms: 200,
            retry_client_errors: true,
        }
    }
}

impl HttpConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Guard HTTP calls with a per-service breaker.
    pub enabled: bool,

    /// Consecutive failures before the breaker opens.
    pub failure_threshold: u32,

    /// Time spent open before a trial request is allowed, in milliseconds.
    pub cooldown_ms: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_threshold: 5,
            cooldown_ms: 2000,
        }
    }
}

impl CircuitBreakerConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Install the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
