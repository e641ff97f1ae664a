//! Backend service identifiers and URL resolution.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;

use crate::config::ServicesConfig;
use crate::http::error::HttpError;

/// Known backend services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceId {
    /// Relative request against the configured origin.
    SameOrigin,
    Inventory,
    Recommendations,
    Checkout,
}

impl ServiceId {
    pub const ALL: [ServiceId; 4] = [
        ServiceId::SameOrigin,
        ServiceId::Inventory,
        ServiceId::Recommendations,
        ServiceId::Checkout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::SameOrigin => "same_origin",
            ServiceId::Inventory => "inventory",
            ServiceId::Recommendations => "recommendations",
            ServiceId::Checkout => "checkout",
        }
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "same_origin" | "same-origin" => Ok(ServiceId::SameOrigin),
            "inventory" => Ok(ServiceId::Inventory),
            "recommendations" => Ok(ServiceId::Recommendations),
            "checkout" => Ok(ServiceId::Checkout),
            other => Err(format!("unknown service '{}'", other)),
        }
    }
}

/// Resolved base URLs for every service.
#[derive(Debug, Clone)]
pub struct ServiceDirectory {
    origin: Url,
    inventory: Option<Url>,
    recommendations: Option<Url>,
    checkout: Option<Url>,
}

impl ServiceDirectory {
    pub fn from_config(config: &ServicesConfig) -> Result<Self, HttpError> {
        Ok(Self {
            origin: parse_base(&config.origin)?,
            inventory: parse_optional(&config.inventory)?,
            recommendations: parse_optional(&config.recommendations)?,
            checkout: parse_optional(&config.checkout)?,
        })
    }

    /// Base URL used for `service`. Unconfigured services fall back to the origin.
    pub fn base(&self, service: ServiceId) -> &Url {
        let configured = match service {
            ServiceId::SameOrigin => None,
            ServiceId::Inventory => self.inventory.as_ref(),
            ServiceId::Recommendations => self.recommendations.as_ref(),
            ServiceId::Checkout => self.checkout.as_ref(),
        };
        configured.unwrap_or(&self.origin)
    }

    /// Full URL for `path` on `service`.
    pub fn resolve(&self, service: ServiceId, path: &str) -> Result<Url, HttpError> {
        let base = self.base(service).as_str().trim_end_matches('/');
        let joined = if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        };
        Url::parse(&joined).map_err(|e| HttpError::InvalidUrl {
            value: joined.clone(),
            reason: e.to_string(),
        })
    }
}

fn parse_base(value: &str) -> Result<Url, HttpError> {
    Url::parse(value).map_err(|e| HttpError::InvalidUrl {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_optional(value: &str) -> Result<Option<Url>, HttpError> {
    if value.is_empty() {
        Ok(None)
    } else {
        parse_base(value).map(Some)
    }
}
