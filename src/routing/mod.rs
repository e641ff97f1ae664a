//! Client-side hash routing.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     (pattern, handler)[]
//!     → pattern.rs (compile to segment matchers)
//!     → router.rs (append to RouteTable in order)
//!     → resolve current location once
//!
//! Navigation:
//!     navigate_to(path) → location.rs (assign hash, emit NavigationEvent)
//!     → router.rs (first matching route) → handler(root, params)
//!                                        → or not-found fallback
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable afterwards
//! - No regex (segment comparison only)
//! - Deterministic: same path always resolves to the same route
//! - First match wins (registration order)

pub mod location;
pub mod pattern;
pub mod router;

pub use location::{Location, MemoryLocation, NavigationEvent};
pub use pattern::{RouteError, RouteParams, RoutePattern};
pub use router::{
    escape_html, handler, not_found_html, HtmlBuffer, RenderTarget, Resolution, Route, RouteHandler,
    RouteTable, Router,
};
