//! Navigable location abstraction.
//!
//! The router never touches a browser directly. It reads and assigns a hash
//! fragment through [`Location`] and subscribes to change notifications, which
//! arrive as a typed [`NavigationEvent`] stream.
//!
//! Every subscriber gets its own unbounded queue, so no change is ever
//! dropped and each subscriber sees events in the order they happened.

use std::sync::Mutex;
use tokio::sync::mpsc;

/// A hash change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
    /// Hash before the change (including `#`, or empty).
    pub old_hash: String,
    /// Hash after the change.
    pub new_hash: String,
}

/// Source of the current location and of navigation notifications.
pub trait Location: Send + Sync {
    /// Current hash fragment, including the leading `#`, or empty.
    fn hash(&self) -> String;

    /// Assign a new hash. Implementations notify subscribers only when the
    /// value actually changes.
    fn set_hash(&self, hash: &str);

    /// Subscribe to hash change notifications, delivered in order.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<NavigationEvent>;
}

/// In-process location, used by the CLI and tests.
#[derive(Debug)]
pub struct MemoryLocation {
    hash: Mutex<String>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<NavigationEvent>>>,
}

impl MemoryLocation {
    pub fn new() -> Self {
        Self::with_hash("")
    }

    /// Start at a given hash, e.g. `#/book/1`.
    pub fn with_hash(hash: &str) -> Self {
        Self {
            hash: Mutex::new(normalize(hash)),
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new()
    }
}

impl Location for MemoryLocation {
    fn hash(&self) -> String {
        self.hash
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_hash(&self, hash: &str) {
        let new_hash = normalize(hash);
        // Held across publish so concurrent writers cannot reorder events.
        let mut current = self
            .hash
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *current == new_hash {
            return;
        }
        let old_hash = std::mem::replace(&mut *current, new_hash.clone());

        let event = NavigationEvent { old_hash, new_hash };
        // Subscribers whose receiver is gone are pruned here.
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<NavigationEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx);
        rx
    }
}

/// Browsers report an assigned `/x` as `#/x`; an empty or bare `#` hash as empty.
fn normalize(hash: &str) -> String {
    if hash.is_empty() || hash == "#" {
        String::new()
    } else if hash.starts_with('#') {
        hash.to_string()
    } else {
        format!("#{}", hash)
    }
}
