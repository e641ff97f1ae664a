//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that every configured service URL is absolute http(s)
//! - Validate value ranges (timeouts > 0, thresholds > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: StorefrontConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::StorefrontConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("services.{field}: '{value}' is not an absolute http(s) URL")]
    InvalidServiceUrl { field: &'static str, value: String },

    #[error("http.timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("circuit_breaker.failure_threshold must be greater than zero")]
    ZeroFailureThreshold,

    #[error("observability.log_level: unknown level '{0}'")]
    UnknownLogLevel(String),

    #[error("observability.metrics_address: '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration, collecting every problem.
pub fn validate_config(config: &StorefrontConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let services = &config.services;
    check_url("origin", &services.origin, false, &mut errors);
    check_url("inventory", &services.inventory, true, &mut errors);
    check_url("recommendations", &services.recommendations, true, &mut errors);
    check_url("checkout", &services.checkout, true, &mut errors);

    if config.http.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.circuit_breaker.failure_threshold == 0 {
        errors.push(ValidationError::ZeroFailureThreshold);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(
    field: &'static str,
    value: &str,
    allow_empty: bool,
    errors: &mut Vec<ValidationError>,
) {
    if value.is_empty() && allow_empty {
        return;
    }
    let valid = Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::InvalidServiceUrl {
            field,
            value: value.to_string(),
        });
    }
}
