//! Channel configuration and the reserved protocol event names.

use serde::{Deserialize, Serialize};
use std::env;

/// Namespace the WebSocket-Rails server prefixes its control events with.
pub const DEFAULT_NAMESPACE: &str = "websocket_rails";

/// Configuration shared by channels talking to one server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Prefix of the reserved control events (`<namespace>.subscribe`, ...).
    pub namespace: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl ChannelConfig {
    /// Configuration with a custom namespace.
    #[must_use]
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `WSR_NAMESPACE`: control event namespace (default: websocket_rails)
    pub fn from_env() -> Self {
        Self {
            namespace: env::var("WSR_NAMESPACE")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
        }
    }

    /// `<namespace>.subscribe`
    #[must_use]
    pub fn subscribe_event(&self) -> String {
        self.event("subscribe")
    }

    /// `<namespace>.subscribe_private`
    #[must_use]
    pub fn subscribe_private_event(&self) -> String {
        self.event("subscribe_private")
    }

    /// Subscribe event name for a public or private channel.
    #[must_use]
    pub fn subscribe_event_for(&self, is_private: bool) -> String {
        if is_private {
            self.subscribe_private_event()
        } else {
            self.subscribe_event()
        }
    }

    /// `<namespace>.unsubscribe`
    #[must_use]
    pub fn unsubscribe_event(&self) -> String {
        self.event("unsubscribe")
    }

    /// `<namespace>.channel_token`, the token grant consumed by the channel.
    #[must_use]
    pub fn channel_token_event(&self) -> String {
        self.event("channel_token")
    }

    fn event(&self, action: &str) -> String {
        format!("{}.{}", self.namespace, action)
    }
}
