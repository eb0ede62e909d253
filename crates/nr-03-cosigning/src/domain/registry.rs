//! # In-Flight Item Registry
//!
//! At most one request per item name between choosing a path and finishing
//! its side effects. A second request for a busy item fails fast.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Item names currently being processed.
#[derive(Debug, Default)]
pub struct InFlightRegistry {
    items: Mutex<HashSet<String>>,
}

impl InFlightRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `item`; `None` if it is already claimed.
    pub fn try_acquire(self: &Arc<Self>, item: &str) -> Option<InFlightGuard> {
        if !self.items.lock().insert(item.to_owned()) {
            return None;
        }
        Some(InFlightGuard {
            registry: Arc::clone(self),
            item: item.to_owned(),
        })
    }

    /// Is `item` claimed?
    pub fn contains(&self, item: &str) -> bool {
        self.items.lock().contains(item)
    }

    /// Number of claimed items.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// No item claimed?
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

/// Releases its item when dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    registry: Arc<InFlightRegistry>,
    item: String,
}

impl InFlightGuard {
    /// The claimed item.
    pub fn item(&self) -> &str {
        &self.item
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry.items.lock().remove(&self.item);
    }
}
