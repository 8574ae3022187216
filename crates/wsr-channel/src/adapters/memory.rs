//! # In-Memory Dispatcher
//!
//! Loopback implementation of the [`Dispatcher`] port. Every envelope handed
//! to it is recorded instead of written to a socket, and the connection
//! identity is set by hand. Suitable for tests and for wiring channels before
//! a real transport is attached.

use crate::domain::EventEnvelope;
use crate::ports::Dispatcher;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use uuid::Uuid;

/// Recording dispatcher with a settable connection identity.
#[derive(Debug, Default)]
pub struct InMemoryDispatcher {
    /// Identity of the simulated transport connection (empty = none).
    connection_id: Mutex<String>,

    /// Envelopes sent and not yet taken.
    sent: Mutex<Vec<EventEnvelope>>,

    /// Total envelopes sent.
    events_sent: AtomicU64,
}

impl InMemoryDispatcher {
    /// Create a dispatcher with no live connection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dispatcher already connected under `connection_id`.
    #[must_use]
    pub fn connected(connection_id: impl Into<String>) -> Self {
        let dispatcher = Self::new();
        dispatcher.connect(connection_id);
        dispatcher
    }

    /// Simulate a connection established under `connection_id`.
    pub fn connect(&self, connection_id: impl Into<String>) {
        let connection_id = connection_id.into();
        debug!(connection_id = %connection_id, "Connection established");
        *self.connection_id.lock() = connection_id;
    }

    /// Simulate a reconnect under a fresh identity. Returns the new id.
    pub fn reconnect(&self) -> String {
        let connection_id = Uuid::new_v4().to_string();
        self.connect(connection_id.clone());
        connection_id
    }

    /// Simulate losing the connection.
    pub fn disconnect(&self) {
        debug!("Connection dropped");
        self.connection_id.lock().clear();
    }

    /// Copy of the envelopes recorded so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<EventEnvelope> {
        self.sent.lock().clone()
    }

    /// Recorded envelopes rendered as wire arrays.
    #[must_use]
    pub fn sent_wire(&self) -> Vec<Value> {
        self.sent.lock().iter().map(EventEnvelope::to_wire).collect()
    }

    /// Remove and return the recorded envelopes.
    pub fn take_sent(&self) -> Vec<EventEnvelope> {
        std::mem::take(&mut *self.sent.lock())
    }

    /// Number of recorded envelopes not yet taken.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    /// Total number of envelopes ever sent.
    #[must_use]
    pub fn events_sent(&self) -> u64 {
        self.events_sent.load(Ordering::Relaxed)
    }

    /// Acknowledge the most recent envelope, running its success or failure
    /// continuation with `data`.
    ///
    /// Returns `false` when nothing has been sent.
    pub fn resolve_last(&self, success: bool, data: &Value) -> bool {
        let Some(envelope) = self.sent.lock().last().cloned() else {
            return false;
        };
        envelope.resolve(success, data);
        true
    }
}

impl Dispatcher for InMemoryDispatcher {
    fn send_event(&self, envelope: EventEnvelope) {
        self.events_sent.fetch_add(1, Ordering::Relaxed);
        debug!(
            event = envelope.name(),
            connection_id = envelope.connection_id(),
            "Event dispatched"
        );
        self.sent.lock().push(envelope);
    }

    fn connection_id(&self) -> String {
        self.connection_id.lock().clone()
    }
}
