//! Router end-to-end scenarios.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use storefront_core::routing::{
    handler, not_found_html, HtmlBuffer, Location, MemoryLocation, RenderTarget, Resolution, RouteHandler,
    Router,
};

type Root = Arc<HtmlBuffer>;

fn page(name: &'static str) -> RouteHandler<Root> {
    handler(move |root: &Root, _| root.render(name))
}

#[test]
fn test_unknown_path_renders_not_found() {
    let root = Arc::new(HtmlBuffer::new());
    let location = Arc::new(MemoryLocation::new());
    let mut router = Router::initialize(
        root.clone(),
        vec![("/", page("A")), ("/home", page("B"))],
        location,
    )
    .unwrap();
    assert_eq!(root.content(), "A");

    assert!(router.navigate_to("/unknown"));
    let resolved = router.pump();

    assert_eq!(
        resolved,
        vec![Resolution::NotFound {
            path: "/unknown".to_string()
        }]
    );
    assert!(root.content().contains("/unknown"));
    assert_eq!(root.content(), not_found_html("/unknown"));
}

#[test]
fn test_repeated_navigation_resolves_once() {
    let root = Arc::new(HtmlBuffer::new());
    let mut router = Router::initialize(
        root.clone(),
        vec![("/", page("A")), ("/home", page("B"))],
        Arc::new(MemoryLocation::new()),
    )
    .unwrap();

    assert!(router.navigate_to("/home"));
    assert!(!router.navigate_to("/home"));
    assert_eq!(router.pump().len(), 1);
    assert_eq!(root.content(), "B");
}

#[tokio::test]
async fn test_run_loop_follows_external_hash_changes() {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let book_tx = tx.clone();
    let routes: Vec<(&str, RouteHandler<Root>)> = vec![
        (
            "/",
            handler(move |root: &Root, _| {
                root.render("home");
                let _ = tx.send("home".to_string());
            }),
        ),
        (
            "/book/:id",
            handler(move |root: &Root, params| {
                let id = params.get("id").unwrap_or_default().to_string();
                root.render(&format!("book {}", id));
                let _ = book_tx.send(id);
            }),
        ),
    ];

    let root = Arc::new(HtmlBuffer::new());
    let location = Arc::new(MemoryLocation::with_hash("#/"));
    let mut router = Router::initialize(root.clone(), routes, location.clone()).unwrap();
    assert_eq!(rx.recv().await.as_deref(), Some("home"));

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        router
            .run(async {
                let _ = stop_rx.await;
            })
            .await;
    });

    // Browser-driven changes arrive through the location, not navigate_to.
    location.set_hash("#/book/a%20b");
    location.set_hash("#/book/42");

    let first = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
    let second = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
    assert_eq!(first.as_deref(), Some("a b"));
    assert_eq!(second.as_deref(), Some("42"));
    assert_eq!(root.content(), "book 42");

    stop_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_async_page_work_does_not_block_navigation() {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<&'static str>();
    let routes: Vec<(&str, RouteHandler<Root>)> = vec![
        ("/", page("home")),
        (
            "/catalog",
            handler(move |root: &Root, _| {
                root.render("loading catalog");
                let done_tx = done_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    let _ = done_tx.send("catalog loaded");
                });
            }),
        ),
        ("/cart", page("cart")),
    ];

    let root = Arc::new(HtmlBuffer::new());
    let mut router =
        Router::initialize(root.clone(), routes, Arc::new(MemoryLocation::new())).unwrap();

    router.navigate_to("/catalog");
    router.navigate_to("/cart");
    let resolved = router.pump();
    assert_eq!(resolved.len(), 2);
    assert_eq!(root.content(), "cart");

    let done = tokio::time::timeout(Duration::from_secs(1), done_rx.recv())
        .await
        .unwrap();
    assert_eq!(done, Some("catalog loaded"));
}
