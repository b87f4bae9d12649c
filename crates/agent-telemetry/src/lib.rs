//! # Agent Telemetry
//!
//! Structured logging for applications embedding the HTTP agent.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_telemetry::{init_tracing, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_tracing(&config).expect("Failed to init tracing");
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AGENT_SERVICE_NAME` | `http-agent` | Service name in log records |
//! | `AGENT_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `AGENT_JSON_LOGS` | `false` | Emit JSON lines instead of text |

#![warn(missing_docs)]

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TelemetryError {
    /// The log filter could not be parsed.
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter {
        /// Filter string.
        filter: String,
        /// Parser message.
        reason: String,
    },

    /// A global subscriber is already installed.
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}
