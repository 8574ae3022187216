//! # Channel Scenarios
//!
//! End-to-end flows through `Channel` and `InMemoryDispatcher`:
//!
//! 1. **Subscribe → queue → token → flush**: triggers issued before the grant
//!    are sent in order, stamped with the token
//! 2. **Inbound delivery**: bound callbacks run in registration order
//! 3. **Destroy**: unsubscribe only from the owning connection

#[cfg(test)]
mod tests {
    use super::super::init_test_logging;
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use wsr_channel::{
        Channel, ChannelBuilder, ChannelConfig, ChannelError, Dispatcher, InMemoryDispatcher,
    };
    use wsr_telemetry::{channel_span, log_channel_event};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn rails_channel<'d>(
        name: &str,
        dispatcher: &'d InMemoryDispatcher,
    ) -> Channel<'d, InMemoryDispatcher> {
        ChannelBuilder::new(name)
            .config(ChannelConfig::with_namespace("rails"))
            .subscribe(dispatcher)
    }

    fn recorder(
        log: &Arc<Mutex<Vec<String>>>,
        tag: &'static str,
    ) -> impl Fn(&Value) + Send + Sync + 'static {
        let log = log.clone();
        move |data: &Value| log.lock().push(format!("{tag}:{data}"))
    }

    // =============================================================================
    // SUBSCRIBE / TRIGGER / TOKEN
    // =============================================================================

    /// Full handshake: subscribe on construction, queue, grant, flush, send.
    #[test]
    fn test_orders_channel_handshake() {
        init_test_logging();
        let dispatcher = InMemoryDispatcher::new();
        let channel = rails_channel("orders", &dispatcher);
        let _span = channel_span!("handshake", channel.name()).entered();

        assert_eq!(
            dispatcher.take_sent()[0].to_wire(),
            json!(["rails.subscribe", {"data": {"channel": "orders"}}, ""])
        );

        channel.trigger("ping", json!({"x": 1}));
        assert_eq!(dispatcher.sent_count(), 0, "trigger before token must not send");
        assert_eq!(channel.pending_len(), 1);

        dispatcher.connect("conn0");
        channel
            .dispatch("rails.channel_token", &json!({"token": "T1"}))
            .expect("token grant accepted");
        log_channel_event!(
            debug,
            channel.name(),
            "token granted",
            pending = channel.pending_len()
        );

        assert_eq!(
            dispatcher
                .take_sent()
                .iter()
                .map(|e| e.to_wire())
                .collect::<Vec<_>>(),
            vec![json!(["ping", {"channel": "orders", "data": {"x": 1}, "token": "T1"}, "conn0"])]
        );

        channel.trigger("ping", json!({"x": 2}));
        assert_eq!(
            dispatcher.sent_wire(),
            vec![json!(["ping", {"channel": "orders", "data": {"x": 2}, "token": "T1"}, "conn0"])]
        );
    }

    /// Subscribing when connected records the owning connection.
    #[test]
    fn test_subscribe_while_connected() {
        init_test_logging();
        let dispatcher = InMemoryDispatcher::connected("conn7");
        let channel = Channel::new("prices", &dispatcher, true);

        assert_eq!(channel.connection_id(), "conn7");
        let sent = dispatcher.sent();
        assert_eq!(sent[0].name(), "websocket_rails.subscribe_private");
        assert_eq!(sent[0].connection_id(), "conn7");
    }

    /// A grant missing its token leaves the channel queuing; a later valid
    /// grant still flushes everything.
    #[test]
    fn test_malformed_grant_then_valid_grant() {
        init_test_logging();
        let dispatcher = InMemoryDispatcher::connected("conn0");
        let channel = Channel::new("orders", &dispatcher, false);
        dispatcher.take_sent();

        channel.trigger("a", json!(1));
        let err = channel
            .dispatch("websocket_rails.channel_token", &json!({"tok": "T1"}))
            .unwrap_err();
        assert!(matches!(err, ChannelError::MissingToken { .. }));

        channel.trigger("b", json!(2));
        assert_eq!(channel.pending_len(), 2);

        channel
            .dispatch("websocket_rails.channel_token", &json!({"token": "T1"}))
            .unwrap();
        let names: Vec<String> = dispatcher
            .sent()
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    /// Re-granting a token keeps the channel subscribed and re-flushes an
    /// empty queue without sending anything.
    #[test]
    fn test_token_regrant_is_idempotent() {
        init_test_logging();
        let dispatcher = InMemoryDispatcher::connected("conn0");
        let channel = Channel::new("orders", &dispatcher, false);
        let grant = |token: &str| json!({ "token": token });

        channel.dispatch("websocket_rails.channel_token", &grant("T1")).unwrap();
        let before = dispatcher.events_sent();
        channel.dispatch("websocket_rails.channel_token", &grant("T2")).unwrap();

        assert_eq!(dispatcher.events_sent(), before);
        assert_eq!(channel.token().as_deref(), Some("T2"));
    }

    // =============================================================================
    // INBOUND DELIVERY
    // =============================================================================

    /// cbA then cbB receive the same payload; other events stay silent.
    #[test]
    fn test_order_created_callbacks() {
        init_test_logging();
        let dispatcher = InMemoryDispatcher::new();
        let channel = Channel::new("orders", &dispatcher, false);
        let log = Arc::new(Mutex::new(Vec::new()));

        channel.bind("order.created", recorder(&log, "cbA"));
        channel.bind("order.created", recorder(&log, "cbB"));
        channel.bind("order.cancelled", recorder(&log, "cbC"));

        channel.dispatch("order.created", &json!({"id": 5})).unwrap();

        assert_eq!(
            *log.lock(),
            vec![r#"cbA:{"id":5}"#.to_string(), r#"cbB:{"id":5}"#.to_string()]
        );
    }

    /// Callbacks rebound after `unbind_all` are the only ones invoked.
    #[test]
    fn test_unbind_then_rebind() {
        init_test_logging();
        let dispatcher = InMemoryDispatcher::new();
        let channel = Channel::new("orders", &dispatcher, false);
        let log = Arc::new(Mutex::new(Vec::new()));

        channel.bind("tick", recorder(&log, "old"));
        channel.unbind_all("tick");
        channel.dispatch("tick", &json!(1)).unwrap();
        channel.bind("tick", recorder(&log, "new"));
        channel.dispatch("tick", &json!(2)).unwrap();

        assert_eq!(*log.lock(), vec!["new:2".to_string()]);
    }

    // =============================================================================
    // DESTROY
    // =============================================================================

    /// Destroy on the owning connection sends unsubscribe; after a reconnect
    /// it only clears callbacks.
    #[test]
    fn test_destroy_owning_and_stale() {
        init_test_logging();
        let dispatcher = InMemoryDispatcher::connected("conn0");
        let owned = Channel::new("owned", &dispatcher, false);
        let stale = Channel::new("stale", &dispatcher, false);
        owned.bind("tick", |_| {});
        stale.bind("tick", |_| {});

        dispatcher.reconnect();
        let live = dispatcher.connection_id();
        owned
            .dispatch("websocket_rails.channel_token", &json!({"token": "T"}))
            .unwrap();
        assert_eq!(owned.connection_id(), live);
        dispatcher.take_sent();

        owned.destroy();
        stale.destroy();

        assert_eq!(
            dispatcher.sent_wire(),
            vec![json!(["websocket_rails.unsubscribe", {"data": {"channel": "owned"}}, live])]
        );
        assert!(owned.callbacks().is_empty());
        assert!(stale.callbacks().is_empty());
    }

    /// The unsubscribe acknowledgment reaches the caller's continuation.
    #[test]
    fn test_destroy_failure_continuation() {
        init_test_logging();
        let dispatcher = InMemoryDispatcher::connected("conn0");
        let channel = Channel::new("orders", &dispatcher, false);
        let log = Arc::new(Mutex::new(Vec::new()));

        channel.destroy_with(recorder(&log, "ok"), recorder(&log, "err"));
        dispatcher.resolve_last(false, &json!("denied"));

        assert_eq!(*log.lock(), vec![r#"err:"denied""#.to_string()]);
    }
}
