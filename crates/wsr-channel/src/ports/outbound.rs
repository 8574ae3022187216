//! Outbound (driven) port: the dispatcher a channel transmits through.
//!
//! The dispatcher multiplexes every channel over one transport connection.
//! Framing, reconnection and acknowledgment routing live behind this trait.

use crate::domain::EventEnvelope;

/// Transport-facing side of the channel layer.
///
/// A dispatcher outlives every channel borrowing it.
pub trait Dispatcher: Send + Sync {
    /// Hand an envelope over for transmission.
    ///
    /// When the server acknowledges the event the dispatcher resolves the
    /// envelope's continuations with [`EventEnvelope::resolve`].
    fn send_event(&self, envelope: EventEnvelope);

    /// Identifier of the live transport connection, or an empty string when
    /// there is none.
    fn connection_id(&self) -> String;
}
