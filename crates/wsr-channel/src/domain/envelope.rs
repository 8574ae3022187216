//! # Event Envelope
//!
//! One outbound (or acknowledged) event: the target event name, its JSON
//! payload, the routing connection id and optional success/failure
//! continuations.
//!
//! On the wire an envelope is a 3-element array:
//!
//! ```text
//! [ "<event name>", { "data": {...}, "channel"?: "...", "token"?: "..." }, "<connection id>" ]
//! ```

use serde::ser::{Serialize, SerializeTuple, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A callable receiving event data.
///
/// Used both for callbacks bound to an event name and for the success and
/// failure continuations carried by an envelope.
pub type Callback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Payload key holding the event data.
pub const DATA_KEY: &str = "data";
/// Payload key holding the channel name.
pub const CHANNEL_KEY: &str = "channel";
/// Payload key holding the subscription token.
pub const TOKEN_KEY: &str = "token";

/// Immutable description of one event handed to a dispatcher.
#[derive(Clone)]
pub struct EventEnvelope {
    name: String,
    payload: Map<String, Value>,
    connection_id: String,
    on_success: Option<Callback>,
    on_failure: Option<Callback>,
}

impl EventEnvelope {
    /// Create an envelope without continuations.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        payload: Map<String, Value>,
        connection_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            payload,
            connection_id: connection_id.into(),
            on_success: None,
            on_failure: None,
        }
    }

    /// Attach success and failure continuations.
    #[must_use]
    pub fn with_continuations(
        mut self,
        on_success: Option<Callback>,
        on_failure: Option<Callback>,
    ) -> Self {
        self.on_success = on_success;
        self.on_failure = on_failure;
        self
    }

    /// Event name this envelope targets.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full payload object.
    #[must_use]
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Routing connection id (empty when no transport connection was live).
    #[must_use]
    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    /// The `data` member of the payload.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.payload.get(DATA_KEY)
    }

    /// The `channel` member of the payload.
    #[must_use]
    pub fn channel(&self) -> Option<&str> {
        self.payload.get(CHANNEL_KEY).and_then(Value::as_str)
    }

    /// The `token` member of the payload.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.payload.get(TOKEN_KEY).and_then(Value::as_str)
    }

    /// Whether a success or failure continuation is attached.
    #[must_use]
    pub fn has_continuations(&self) -> bool {
        self.on_success.is_some() || self.on_failure.is_some()
    }

    /// Finalise a queued envelope with the granted token and the connection
    /// that owns the subscription.
    pub(crate) fn stamp(&mut self, token: &str, connection_id: &str) {
        self.payload
            .insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.connection_id = connection_id.to_string();
    }

    /// Run the continuation matching the acknowledgment outcome.
    ///
    /// Missing continuations are a no-op.
    pub fn resolve(&self, success: bool, data: &Value) {
        let continuation = if success {
            &self.on_success
        } else {
            &self.on_failure
        };
        if let Some(callback) = continuation {
            callback(data);
        }
    }

    /// Render the 3-element wire array.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        Value::Array(vec![
            Value::String(self.name.clone()),
            Value::Object(self.payload.clone()),
            Value::String(self.connection_id.clone()),
        ])
    }

    /// Render the wire array as a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for EventEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.name)?;
        tuple.serialize_element(&self.payload)?;
        tuple.serialize_element(&self.connection_id)?;
        tuple.end()
    }
}

impl fmt::Debug for EventEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEnvelope")
            .field("name", &self.name)
            .field("payload", &self.payload)
            .field("connection_id", &self.connection_id)
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}
