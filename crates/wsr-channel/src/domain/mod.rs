//! Domain layer: envelopes, the callback registry, the pending queue and
//! the error taxonomy. Nothing here knows about a transport.

pub mod callbacks;
pub mod envelope;
pub mod errors;
pub mod queue;

pub use callbacks::{CallbackMap, CallbackRegistry};
pub use envelope::{Callback, EventEnvelope, CHANNEL_KEY, DATA_KEY, TOKEN_KEY};
pub use errors::ChannelError;
pub use queue::PendingQueue;
