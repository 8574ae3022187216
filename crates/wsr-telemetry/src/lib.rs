//! # WSR Telemetry
//!
//! Logging bootstrap for applications embedding the channel layer.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wsr_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     init_logging(&TelemetryConfig::from_env()).expect("Failed to init logging");
//!     // Channel transitions are now logged under the `wsr_channel` target
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `WSR_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `WSR_JSON_LOGS` | `false` | JSON output |
//! | `WSR_CONSOLE_OUTPUT` | `true` | Console output |
//! | `WSR_SERVICE_NAME` | `wsr-client` | Service name |

#![cfg_attr(test, allow(clippy::unwrap_used))]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Global subscriber already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Convenience macro for creating a span carrying the channel name.
///
/// # Example
///
/// ```rust,ignore
/// use wsr_telemetry::channel_span;
///
/// let _span = channel_span!("replay_backlog", "orders", pending = 3).entered();
/// ```
#[macro_export]
macro_rules! channel_span {
    ($name:expr, $channel:expr $(, $($field:tt)*)?) => {
        tracing::info_span!($name, channel = %$channel $(, $($field)*)?)
    };
}
