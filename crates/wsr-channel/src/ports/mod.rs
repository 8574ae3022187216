//! Ports for the channel layer.

pub mod outbound;

pub use outbound::Dispatcher;
