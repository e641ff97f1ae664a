//! Order submission against the checkout service.

use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::checkout::idempotency::{compute_key, LineItem, IDEMPOTENCY_KEY};
use crate::http::{HttpClient, HttpError, HttpResult, RequestOptions, ServiceId};

/// Path of the order creation endpoint on the checkout service.
pub const ORDERS_PATH: &str = "/orders";

/// Order creation payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    pub items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
}

/// What the checkout service returns for an accepted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total: Option<f64>,
}

/// Submits orders with an idempotency key so retries are deduplicated.
#[derive(Debug, Clone)]
pub struct OrderClient {
    http: HttpClient,
}

impl OrderClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn place_order(&self, order: &PlaceOrder) -> HttpResult<OrderReceipt> {
        let key = compute_key(&order.items);
        let value =
            HeaderValue::from_str(&key).map_err(|_| HttpError::InvalidHeader(IDEMPOTENCY_KEY.to_string()))?;

        let options = RequestOptions::post()
            .json(order)?
            .header(HeaderName::from_static(IDEMPOTENCY_KEY), value);

        info!(idempotency_key = %key, items = order.items.len(), "Submitting order");
        let receipt: OrderReceipt = self
            .http
            .request_json(ServiceId::Checkout, ORDERS_PATH, options)
            .await?;
        info!(order_id = %receipt.order_id, status = %receipt.status, "Order accepted");
        Ok(receipt)
    }
}
