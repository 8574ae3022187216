//! Channel error types.
//!
//! Handshake rejections, stale connections and unknown events are not errors
//! here: they surface through continuations or are silently ignored. The only
//! condition a channel refuses outright is a token grant it cannot use.

use thiserror::Error;

/// Errors returned by channel operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// A token-grant event arrived without a usable `token` field.
    ///
    /// Storing an empty token would leave the channel queuing forever, so the
    /// frame is rejected and the channel state is left untouched.
    #[error("Token grant for channel {channel} carries no usable token")]
    MissingToken { channel: String },
}
