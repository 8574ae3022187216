//! # Callback Registry
//!
//! Thread-safe mapping from event name to the ordered list of callbacks bound
//! to it. Registration order is invocation order.
//!
//! The guard is never held while a callback runs: lookups copy the list out of
//! the critical section first, so callbacks may bind or unbind on the same
//! registry without deadlocking.

use super::envelope::Callback;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Event name to ordered callback list.
pub type CallbackMap = HashMap<String, Vec<Callback>>;

/// Guarded callback map.
#[derive(Default)]
pub struct CallbackRegistry {
    callbacks: Mutex<CallbackMap>,
}

impl CallbackRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback to the list for `event_name`, creating the list if
    /// absent. Duplicate callbacks are kept.
    pub fn bind(&self, event_name: impl Into<String>, callback: Callback) {
        self.callbacks
            .lock()
            .entry(event_name.into())
            .or_default()
            .push(callback);
    }

    /// Remove every callback bound to `event_name`.
    ///
    /// Returns `false` when nothing was bound.
    pub fn unbind_all(&self, event_name: &str) -> bool {
        self.callbacks.lock().remove(event_name).is_some()
    }

    /// Copy of the callback list for `event_name`.
    #[must_use]
    pub fn callbacks_for(&self, event_name: &str) -> Option<Vec<Callback>> {
        self.callbacks.lock().get(event_name).cloned()
    }

    /// Invoke every callback bound to `event_name` with `data`, in
    /// registration order.
    ///
    /// Returns the number of callbacks invoked; an unknown event name
    /// invokes nothing.
    pub fn invoke(&self, event_name: &str, data: &Value) -> usize {
        let Some(callbacks) = self.callbacks_for(event_name) else {
            return 0;
        };

        for callback in &callbacks {
            callback(data);
        }
        callbacks.len()
    }

    /// Number of callbacks bound to `event_name`.
    #[must_use]
    pub fn count_for(&self, event_name: &str) -> usize {
        self.callbacks.lock().get(event_name).map_or(0, Vec::len)
    }

    /// Number of event names with at least one binding.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.lock().len()
    }

    /// Whether no event name has bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.lock().is_empty()
    }

    /// Copy of the whole map.
    #[must_use]
    pub fn snapshot(&self) -> CallbackMap {
        self.callbacks.lock().clone()
    }

    /// Replace the whole map.
    pub fn replace(&self, callbacks: CallbackMap) {
        *self.callbacks.lock() = callbacks;
    }

    /// Drop every binding.
    pub fn clear(&self) {
        self.callbacks.lock().clear();
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let callbacks = self.callbacks.lock();
        let mut counts: Vec<(&String, usize)> =
            callbacks.iter().map(|(name, list)| (name, list.len())).collect();
        counts.sort();
        f.debug_struct("CallbackRegistry")
            .field("bindings", &counts)
            .finish()
    }
}
