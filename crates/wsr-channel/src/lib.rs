//! # WSR Channel - Channel Subscriptions for WebSocket-Rails Clients
//!
//! A channel is a named, optionally private topic on a WebSocket-Rails server.
//! Subscribing sends `<namespace>.subscribe` (or `subscribe_private`); the
//! server answers with `<namespace>.channel_token`, after which events can be
//! triggered into the channel. Server-pushed events for the channel are routed
//! to callbacks bound by event name.
//!
//! ## Handshake
//!
//! ```text
//! ┌──────────┐   subscribe    ┌────────────┐   frame    ┌────────┐
//! │ Channel  │ ─────────────→ │ Dispatcher │ ─────────→ │ Server │
//! │          │                │            │            │        │
//! │          │ ←── dispatch ─ │            │ ←───────── │        │
//! └──────────┘ channel_token  └────────────┘   token    └────────┘
//! ```
//!
//! Triggers issued before the token arrives are held in a FIFO queue and sent,
//! stamped with the token, as soon as it is granted.
//!
//! ## Module Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | `domain/` | `EventEnvelope`, `CallbackRegistry`, `PendingQueue`, `ChannelError` |
//! | `ports/` | `Dispatcher`, the transport boundary |
//! | `adapters/` | `InMemoryDispatcher` |
//! | `channel` | `Channel` state machine and `ChannelBuilder` |
//! | `config` | `ChannelConfig` and reserved event names |

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod channel;
pub mod config;
pub mod domain;
pub mod ports;

// Re-export main types
pub use adapters::InMemoryDispatcher;
pub use channel::{Channel, ChannelBuilder};
pub use config::{ChannelConfig, DEFAULT_NAMESPACE};
pub use domain::{
    Callback, CallbackMap, CallbackRegistry, ChannelError, EventEnvelope, PendingQueue,
};
pub use ports::Dispatcher;
