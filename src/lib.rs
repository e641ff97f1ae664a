//! Storefront client runtime core.
//!
//! Hash routing, a resilient HTTP client for the storefront's backend
//! services, per-service circuit breakers and idempotent order submission.

pub mod checkout;
pub mod config;
pub mod http;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use checkout::{compute_key, LineItem, OrderClient};
pub use config::schema::StorefrontConfig;
pub use http::{HttpClient, HttpError, ServiceId};
pub use resilience::CircuitBreaker;
pub use routing::Router;
