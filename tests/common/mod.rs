//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use tokio::net::TcpListener;

use storefront_core::config::{HttpConfig, StorefrontConfig};

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

type Responder = Arc<dyn Fn(u32) -> Pin<Box<dyn Future<Output = (u16, String)> + Send>> + Send + Sync>;

/// Handle to a running mock backend.
pub struct MockBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` receives the zero-based index of the request and returns
/// `(status, body)`.
pub async fn start_programmable_backend<F, Fut>(f: F) -> MockBackend
where
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let requests = Arc::new(Mutex::new(Vec::new()));
    let counter = Arc::new(AtomicU32::new(0));
    let responder: Responder = Arc::new(move |n| Box::pin(f(n)));

    let recorded = requests.clone();
    let app = axum::Router::new().fallback(
        move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
            let recorded = recorded.clone();
            let counter = counter.clone();
            let responder = responder.clone();
            async move {
                recorded.lock().unwrap().push(Recorded {
                    method,
                    path: uri.path().to_string(),
                    headers,
                    body,
                });
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let (status, body) = responder(n).await;
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, body)
            }
        },
    );

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend { addr, requests }
}

/// Start a mock backend that always returns `200` with `body`.
#[allow(dead_code)]
pub async fn start_mock_backend(body: &'static str) -> MockBackend {
    start_programmable_backend(move |_| async move { (200, body.to_string()) }).await
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Config pointing every service at `base`, with short test delays.
#[allow(dead_code)]
pub fn config_for(base: &str) -> StorefrontConfig {
    let mut config = StorefrontConfig::default();
    config.services.origin = base.to_string();
    config.services.inventory = base.to_string();
    config.services.recommendations = base.to_string();
    config.services.checkout = base.to_string();
    config.http = HttpConfig {
        timeout_ms: 1000,
        max_retries: 2,
        base_delay_ms: 10,
        retry_client_errors: true,
    };
    config
}
