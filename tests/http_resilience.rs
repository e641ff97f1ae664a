//! HTTP client behavior against a real socket.

use std::time::Duration;

use storefront_core::checkout::{compute_key, LineItem, OrderClient, PlaceOrder, IDEMPOTENCY_KEY};
use storefront_core::http::{HttpClient, HttpError, RequestOptions, ServiceId};
use storefront_core::observability::tracing::{TraceContext, TRACEPARENT, X_REQUEST_ID};

mod common;

#[tokio::test]
async fn test_retry_on_failure() {
    let backend = common::start_programmable_backend(|n| async move {
        if n < 2 {
            (503, "Service Unavailable".into())
        } else {
            (200, r#"{"books":[]}"#.into())
        }
    })
    .await;

    let client = HttpClient::from_config(&common::config_for(&backend.url())).unwrap();
    let body: serde_json::Value = client
        .get_json(ServiceId::Inventory, "/books")
        .await
        .unwrap();
    assert_eq!(body, serde_json::json!({ "books": [] }));

    let requests = backend.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r.path == "/books"));

    // One logical request: same request id and trace, different spans.
    let ids: Vec<_> = requests.iter().map(|r| r.header(X_REQUEST_ID).unwrap()).collect();
    assert!(ids.iter().all(|id| *id == ids[0]));
    let spans: Vec<TraceContext> = requests
        .iter()
        .map(|r| TraceContext::parse(r.header(TRACEPARENT).unwrap()).unwrap())
        .collect();
    assert!(spans.iter().all(|t| t.trace_id == spans[0].trace_id));
    assert_ne!(spans[0].span_id, spans[1].span_id);
    assert_ne!(spans[1].span_id, spans[2].span_id);
}

#[tokio::test]
async fn test_status_failure_carries_status() {
    let backend = common::start_programmable_backend(|_| async { (502, "Bad Gateway".into()) }).await;

    let client = HttpClient::from_config(&common::config_for(&backend.url())).unwrap();
    let err = client
        .request(ServiceId::Recommendations, "/recommendations", RequestOptions::get())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(502));
    assert!(!err.is_transport());
    assert_eq!(backend.requests().len(), 3);
}

#[tokio::test]
async fn test_connection_refused_is_transport_failure() {
    let addr = common::closed_addr().await;
    let mut config = common::config_for(&format!("http://{}", addr));
    config.circuit_breaker.enabled = false;

    let client = HttpClient::from_config(&config).unwrap();
    let err = client
        .request(ServiceId::Inventory, "/books", RequestOptions::get())
        .await
        .unwrap_err();

    assert!(err.is_transport(), "unexpected error: {err}");
    assert!(matches!(err, HttpError::Transport { attempts: 3, .. }));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let backend = common::start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        (200, "too late".into())
    })
    .await;

    let mut config = common::config_for(&backend.url());
    config.http.timeout_ms = 50;
    config.http.max_retries = 1;

    let client = HttpClient::from_config(&config).unwrap();
    let err = client
        .request(ServiceId::Inventory, "/books", RequestOptions::get())
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "unexpected error: {err}");
}

#[tokio::test]
async fn test_breaker_opens_after_repeated_failures() {
    let backend = common::start_programmable_backend(|_| async { (500, "boom".into()) }).await;

    let mut config = common::config_for(&backend.url());
    config.http.max_retries = 0;
    config.circuit_breaker.failure_threshold = 2;
    config.circuit_breaker.cooldown_ms = 60_000;

    let client = HttpClient::from_config(&config).unwrap();
    for _ in 0..2 {
        let err = client
            .request(ServiceId::Checkout, "/orders", RequestOptions::post())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    let err = client
        .request(ServiceId::Checkout, "/orders", RequestOptions::post())
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::CircuitOpen { service: ServiceId::Checkout }));
    assert_eq!(backend.requests().len(), 2);

    // Breakers are per service.
    let err = client
        .request(ServiceId::Inventory, "/books", RequestOptions::get())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_place_order_sends_idempotency_key() {
    let backend = common::start_programmable_backend(|_| async {
        (201, r#"{"orderId":"o-42","status":"created","total":40}"#.into())
    })
    .await;

    let client = OrderClient::new(HttpClient::from_config(&common::config_for(&backend.url())).unwrap());
    let order = PlaceOrder {
        items: vec![LineItem::new("B", 2.0, 15.0), LineItem::new("A", 1.0, 10.0)],
        customer_email: Some("reader@example.com".to_string()),
    };

    let receipt = client.place_order(&order).await.unwrap();
    assert_eq!(receipt.order_id, "o-42");
    assert_eq!(receipt.total, Some(40.0));

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, axum::http::Method::POST);
    assert_eq!(request.path, "/orders");
    assert_eq!(request.header(IDEMPOTENCY_KEY), Some(compute_key(&order.items).as_str()));
    assert_eq!(request.header(IDEMPOTENCY_KEY), Some("14b7c5d7"));
    assert_eq!(request.header("content-type"), Some("application/json"));

    let sent: PlaceOrder = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(sent, order);
}

#[tokio::test]
async fn test_retried_order_reuses_key() {
    let backend = common::start_programmable_backend(|n| async move {
        if n == 0 {
            (503, String::new())
        } else {
            (200, r#"{"orderId":"o-7"}"#.into())
        }
    })
    .await;

    let client = OrderClient::new(HttpClient::from_config(&common::config_for(&backend.url())).unwrap());
    let order = PlaceOrder {
        items: vec![LineItem::new("b1", 1.0, 9.99)],
        customer_email: None,
    };
    client.place_order(&order).await.unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].header(IDEMPOTENCY_KEY), requests[1].header(IDEMPOTENCY_KEY));
}
