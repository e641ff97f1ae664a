//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes in registration order
//! - Resolve the current location to a handler or the not-found fallback
//! - Process navigation events in arrival order
//!
//! # Design Decisions
//! - Append-only registry, owned by the router instance (no globals)
//! - First registered match wins; no specificity ranking
//! - Handlers run synchronously; async page work is spawned by the handler
//!   and never awaited by the dispatcher
//! - Explicit NotFound rendering rather than a silent default

use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, error::TryRecvError};

use crate::observability::metrics;
use crate::routing::location::{Location, NavigationEvent};
use crate::routing::pattern::{RouteError, RouteParams, RoutePattern};

/// Where pages are rendered.
pub trait RenderTarget: Send + Sync {
    /// Replace the target's content with `html`.
    fn render(&self, html: &str);
}

/// A render target that keeps the last rendered markup in memory.
#[derive(Debug, Default)]
pub struct HtmlBuffer {
    content: Mutex<String>,
}

impl HtmlBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently rendered markup.
    pub fn content(&self) -> String {
        self.content
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl RenderTarget for HtmlBuffer {
    fn render(&self, html: &str) {
        *self
            .content
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = html.to_string();
    }
}

impl<T: RenderTarget + ?Sized> RenderTarget for Arc<T> {
    fn render(&self, html: &str) {
        (**self).render(html)
    }
}

/// Page render callback: `(root, params)`.
pub type RouteHandler<T> = Arc<dyn Fn(&T, &RouteParams) + Send + Sync>;

/// Wrap a closure as a [`RouteHandler`].
pub fn handler<T, F>(f: F) -> RouteHandler<T>
where
    F: Fn(&T, &RouteParams) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A compiled route bound to its handler.
pub struct Route<T> {
    pattern: RoutePattern,
    handler: RouteHandler<T>,
}

impl<T> Route<T> {
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }
}

impl<T> std::fmt::Debug for Route<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Ordered, append-only route registry.
#[derive(Debug)]
pub struct RouteTable<T> {
    routes: Vec<Route<T>>,
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<T> RouteTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `pattern` and append it after every existing route.
    pub fn register(&mut self, pattern: &str, handler: RouteHandler<T>) -> Result<(), RouteError> {
        let pattern = RoutePattern::compile(pattern)?;
        self.routes.push(Route { pattern, handler });
        Ok(())
    }

    /// First route, in registration order, that matches `path`.
    pub fn lookup(&self, path: &str) -> Option<(&Route<T>, RouteParams)> {
        self.routes
            .iter()
            .find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Outcome of resolving one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched { pattern: String, params: RouteParams },
    NotFound { path: String },
}

/// Hash router: owns the route table and reacts to navigation events.
pub struct Router<T> {
    root: T,
    table: RouteTable<T>,
    location: Arc<dyn Location>,
    events: mpsc::UnboundedReceiver<NavigationEvent>,
}

impl<T: RenderTarget> Router<T> {
    /// Compile every route, subscribe to navigation and resolve the current
    /// location once.
    pub fn initialize<I, P>(
        root: T,
        routes: I,
        location: Arc<dyn Location>,
    ) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = (P, RouteHandler<T>)>,
        P: AsRef<str>,
    {
        let mut table = RouteTable::new();
        for (pattern, handler) in routes {
            table.register(pattern.as_ref(), handler)?;
        }

        let events = location.subscribe();
        let router = Self {
            root,
            table,
            location,
            events,
        };

        tracing::debug!(routes = router.table.len(), "Router initialized");
        router.resolve_current();
        Ok(router)
    }

    /// Move to `path` unless it is already the active location.
    ///
    /// Returns `true` when the location changed (and a navigation event will
    /// be delivered).
    pub fn navigate_to(&self, path: &str) -> bool {
        if !path.starts_with('/') {
            tracing::warn!(path = %path, "Ignoring navigation to a relative path");
            return false;
        }
        let target = format!("#{}", path);
        if self.location.hash() == target {
            return false;
        }
        self.location.set_hash(&target);
        true
    }

    /// Resolve the location as it is right now.
    pub fn resolve_current(&self) -> Resolution {
        self.resolve_hash(&self.location.hash())
    }

    /// Synchronously process every queued navigation event, oldest first.
    pub fn pump(&mut self) -> Vec<Resolution> {
        let mut resolved = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => resolved.push(self.resolve_hash(&event.new_hash)),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        resolved
    }

    /// Process navigation events until `shutdown` completes or the location
    /// goes away.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::debug!("Router received shutdown signal");
                    break;
                }
                event = self.events.recv() => match event {
                    Some(event) => {
                        self.resolve_hash(&event.new_hash);
                    }
                    None => break,
                },
            }
        }
    }

    pub fn root(&self) -> &T {
        &self.root
    }

    pub fn routes(&self) -> &RouteTable<T> {
        &self.table
    }

    fn resolve_hash(&self, hash: &str) -> Resolution {
        let path = path_from_hash(hash);

        match self.table.lookup(&path) {
            Some((route, params)) => {
                tracing::debug!(path = %path, pattern = %route.pattern.as_str(), "Route matched");
                metrics::record_navigation("matched");
                (route.handler)(&self.root, &params);
                Resolution::Matched {
                    pattern: route.pattern.as_str().to_string(),
                    params,
                }
            }
            None => {
                tracing::info!(path = %path, "No route matched");
                metrics::record_navigation("not_found");
                self.root.render(&not_found_html(&path));
                Resolution::NotFound { path }
            }
        }
    }
}

/// `#/book/1` → `/book/1`; empty → `/`.
pub fn path_from_hash(hash: &str) -> String {
    let path = hash.strip_prefix('#').unwrap_or(hash);
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

/// Fallback markup rendered when no route matches `path`.
pub fn not_found_html(path: &str) -> String {
    format!(
        "<section class=\"not-found\"><h2>Page not found</h2><p>No route matches <code>{}</code>.</p></section>",
        escape_html(path)
    )
}

/// Escape text for inclusion in HTML element content or attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
