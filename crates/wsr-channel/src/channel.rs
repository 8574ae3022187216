//! # Channel
//!
//! Subscription state machine for one named topic.
//!
//! ```text
//! new() ──subscribe──→ [UNSUBSCRIBED] ──channel_token──→ [SUBSCRIBED]
//!                        │ trigger(): queue              │ trigger(): send
//!                        └──────── flush on grant ───────┘
//! ```
//!
//! | Field | Guard | Writers |
//! |-------|-------|---------|
//! | callbacks | registry mutex | `bind`, `unbind_all`, `set_callbacks`, `destroy` |
//! | pending queue | queue mutex | `trigger`, token grant |
//! | connection id | own mutex | construction, token grant |
//! | token | own mutex | token grant only |
//!
//! Guards are independent and never nested. None is held while the
//! dispatcher or a callback runs.

use crate::config::ChannelConfig;
use crate::domain::{
    Callback, CallbackMap, CallbackRegistry, ChannelError, EventEnvelope, PendingQueue,
    CHANNEL_KEY, DATA_KEY, TOKEN_KEY,
};
use crate::ports::Dispatcher;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// A subscription to one channel, borrowing the dispatcher it talks through.
pub struct Channel<'d, D: Dispatcher + ?Sized> {
    name: String,
    is_private: bool,
    config: ChannelConfig,
    token_event: String,
    dispatcher: &'d D,
    connection_id: Mutex<String>,
    token: Mutex<String>,
    callbacks: CallbackRegistry,
    pending: PendingQueue,
    on_subscribe_success: Option<Callback>,
    on_subscribe_failure: Option<Callback>,
}

impl<'d, D: Dispatcher + ?Sized> Channel<'d, D> {
    /// Create a channel and start its subscribe handshake.
    pub fn new(name: impl Into<String>, dispatcher: &'d D, is_private: bool) -> Self {
        ChannelBuilder::new(name)
            .private(is_private)
            .subscribe(dispatcher)
    }

    /// Create a channel whose subscribe handshake resolves through the given
    /// continuations.
    pub fn with_continuations<S, F>(
        name: impl Into<String>,
        dispatcher: &'d D,
        is_private: bool,
        on_success: S,
        on_failure: F,
    ) -> Self
    where
        S: Fn(&Value) + Send + Sync + 'static,
        F: Fn(&Value) + Send + Sync + 'static,
    {
        ChannelBuilder::new(name)
            .private(is_private)
            .on_subscribe_success(on_success)
            .on_subscribe_failure(on_failure)
            .subscribe(dispatcher)
    }

    /// Channel name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the channel was subscribed as private.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.is_private
    }

    /// Configuration the channel was built with.
    #[must_use]
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Subscription token, once granted.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        let token = self.token.lock();
        (!token.is_empty()).then(|| token.clone())
    }

    /// Connection that owns this subscription (empty if none was live).
    #[must_use]
    pub fn connection_id(&self) -> String {
        self.connection_id.lock().clone()
    }

    /// Whether the server has granted a token.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        !self.token.lock().is_empty()
    }

    /// Number of triggers waiting for the token.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Bind `callback` to `event_name`. Binds accumulate in call order.
    pub fn bind<F>(&self, event_name: impl Into<String>, callback: F)
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let event_name = event_name.into();
        debug!(channel = %self.name, event = %event_name, "Callback bound");
        self.callbacks.bind(event_name, Arc::new(callback));
    }

    /// Remove every callback bound to `event_name`.
    pub fn unbind_all(&self, event_name: &str) {
        if self.callbacks.unbind_all(event_name) {
            debug!(channel = %self.name, event = event_name, "Callbacks unbound");
        }
    }

    /// Copy of the callback map.
    #[must_use]
    pub fn callbacks(&self) -> CallbackMap {
        self.callbacks.snapshot()
    }

    /// Replace the callback map.
    pub fn set_callbacks(&self, callbacks: CallbackMap) {
        self.callbacks.replace(callbacks);
    }

    /// Send `data` as `event_name` on this channel.
    ///
    /// Before the token arrives the event is queued and sent when the grant
    /// is dispatched.
    pub fn trigger(&self, event_name: impl Into<String>, data: Value) {
        self.send_or_queue(event_name.into(), data, None, None);
    }

    /// Like [`trigger`](Self::trigger), resolving the server acknowledgment
    /// through the given continuations.
    pub fn trigger_with<S, F>(
        &self,
        event_name: impl Into<String>,
        data: Value,
        on_success: S,
        on_failure: F,
    ) where
        S: Fn(&Value) + Send + Sync + 'static,
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.send_or_queue(
            event_name.into(),
            data,
            Some(Arc::new(on_success)),
            Some(Arc::new(on_failure)),
        );
    }

    /// Inbound delivery from the dispatcher.
    ///
    /// The token-grant event installs the token and flushes queued triggers;
    /// any other event runs the callbacks bound to it. Events nobody listens
    /// to are ignored.
    ///
    /// # Errors
    ///
    /// `ChannelError::MissingToken` if a token grant has no non-empty string
    /// `token` field. The channel state is left unchanged.
    pub fn dispatch(&self, event_name: &str, data: &Value) -> Result<(), ChannelError> {
        if event_name == self.token_event {
            return self.accept_token(data);
        }

        let invoked = self.callbacks.invoke(event_name, data);
        trace!(
            channel = %self.name,
            event = event_name,
            invoked,
            "Event dispatched to callbacks"
        );
        Ok(())
    }

    /// Unsubscribe if this channel still belongs to the live connection, then
    /// drop every callback.
    pub fn destroy(&self) {
        self.unsubscribe(None, None);
    }

    /// Like [`destroy`](Self::destroy), resolving the unsubscribe
    /// acknowledgment through the given continuations.
    pub fn destroy_with<S, F>(&self, on_success: S, on_failure: F)
    where
        S: Fn(&Value) + Send + Sync + 'static,
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.unsubscribe(Some(Arc::new(on_success)), Some(Arc::new(on_failure)));
    }

    fn subscribe(&self) {
        let connection_id = self.dispatcher.connection_id();
        *self.connection_id.lock() = connection_id.clone();

        let event_name = self.config.subscribe_event_for(self.is_private);
        debug!(
            channel = %self.name,
            event = %event_name,
            connection_id = %connection_id,
            "Subscribing"
        );

        let envelope = EventEnvelope::new(event_name, self.request_payload(), connection_id)
            .with_continuations(
                self.on_subscribe_success.clone(),
                self.on_subscribe_failure.clone(),
            );
        self.dispatcher.send_event(envelope);
    }

    fn unsubscribe(&self, on_success: Option<Callback>, on_failure: Option<Callback>) {
        let owner = self.connection_id();
        let live = self.dispatcher.connection_id();

        if owner == live {
            info!(channel = %self.name, connection_id = %owner, "Unsubscribing");
            let envelope =
                EventEnvelope::new(self.config.unsubscribe_event(), self.request_payload(), owner)
                    .with_continuations(on_success, on_failure);
            self.dispatcher.send_event(envelope);
        } else {
            warn!(
                channel = %self.name,
                owner = %owner,
                live = %live,
                "Stale channel destroyed without unsubscribe"
            );
        }

        self.callbacks.clear();
    }

    fn accept_token(&self, data: &Value) -> Result<(), ChannelError> {
        let Some(token) = data
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
        else {
            warn!(channel = %self.name, "Rejected token grant without token");
            return Err(ChannelError::MissingToken {
                channel: self.name.clone(),
            });
        };

        let connection_id = self.dispatcher.connection_id();
        *self.connection_id.lock() = connection_id.clone();
        *self.token.lock() = token.to_string();

        let flushed = self.flush_pending();
        info!(
            channel = %self.name,
            connection_id = %connection_id,
            flushed,
            "Channel token received"
        );
        Ok(())
    }

    fn send_or_queue(
        &self,
        event_name: String,
        data: Value,
        on_success: Option<Callback>,
        on_failure: Option<Callback>,
    ) {
        let token = self.token.lock().clone();
        let envelope = self
            .trigger_envelope(event_name, data, &token)
            .with_continuations(on_success, on_failure);

        if !token.is_empty() {
            trace!(channel = %self.name, event = envelope.name(), "Trigger sent");
            self.dispatcher.send_event(envelope);
            return;
        }

        let event = envelope.name().to_string();
        let queued = self.pending.enqueue(envelope);
        debug!(
            channel = %self.name,
            event = %event,
            queued,
            "Trigger queued until channel token arrives"
        );

        // The grant may have landed between the token read and the enqueue.
        if self.is_subscribed() {
            self.flush_pending();
        }
    }

    fn flush_pending(&self) -> usize {
        let token = self.token.lock().clone();
        let connection_id = self.connection_id();

        self.pending.flush_with(|mut envelope| {
            envelope.stamp(&token, &connection_id);
            self.dispatcher.send_event(envelope);
        })
    }

    fn request_payload(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert(CHANNEL_KEY.to_string(), Value::String(self.name.clone()));

        let mut payload = Map::new();
        payload.insert(DATA_KEY.to_string(), Value::Object(data));
        payload
    }

    fn trigger_envelope(&self, event_name: String, data: Value, token: &str) -> EventEnvelope {
        let mut payload = Map::new();
        payload.insert(CHANNEL_KEY.to_string(), Value::String(self.name.clone()));
        payload.insert(DATA_KEY.to_string(), data);
        payload.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        EventEnvelope::new(event_name, payload, self.connection_id())
    }
}

impl<D: Dispatcher + ?Sized> fmt::Debug for Channel<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let connection_id = self.connection_id();
        let subscribed = self.is_subscribed();
        let pending = self.pending.len();
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("is_private", &self.is_private)
            .field("connection_id", &connection_id)
            .field("subscribed", &subscribed)
            .field("pending", &pending)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

/// Builder for channels with a custom namespace or subscribe continuations.
#[derive(Default)]
pub struct ChannelBuilder {
    name: String,
    is_private: bool,
    config: ChannelConfig,
    on_success: Option<Callback>,
    on_failure: Option<Callback>,
}

impl ChannelBuilder {
    /// Start a builder for channel `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Subscribe as a private channel.
    #[must_use]
    pub fn private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }

    /// Use `config` instead of the default namespace.
    #[must_use]
    pub fn config(mut self, config: ChannelConfig) -> Self {
        self.config = config;
        self
    }

    /// Continuation run when the subscribe handshake succeeds.
    #[must_use]
    pub fn on_subscribe_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(callback));
        self
    }

    /// Continuation run when the subscribe handshake fails.
    #[must_use]
    pub fn on_subscribe_failure<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.on_failure = Some(Arc::new(callback));
        self
    }

    /// Build the channel and send its subscribe event through `dispatcher`.
    pub fn subscribe<D: Dispatcher + ?Sized>(self, dispatcher: &D) -> Channel<'_, D> {
        let channel = Channel {
            token_event: self.config.channel_token_event(),
            name: self.name,
            is_private: self.is_private,
            config: self.config,
            dispatcher,
            connection_id: Mutex::new(String::new()),
            token: Mutex::new(String::new()),
            callbacks: CallbackRegistry::new(),
            pending: PendingQueue::new(),
            on_subscribe_success: self.on_success,
            on_subscribe_failure: self.on_failure,
        };
        channel.subscribe();
        channel
    }
}

impl fmt::Debug for ChannelBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelBuilder")
            .field("name", &self.name)
            .field("is_private", &self.is_private)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
