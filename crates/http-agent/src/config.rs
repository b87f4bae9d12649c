//! # Agent Configuration
//!
//! Configuration for the HTTP agent.

use serde::{Deserialize, Serialize};
use std::env;

use crate::domain::DEFAULT_INGRESS_EXPIRY_DELTA_MS;

/// Default replica host.
pub const DEFAULT_HOST: &str = "https://ic0.app";

/// HTTP agent configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentConfig {
    /// Replica host; subdomains of the canonical roots are collapsed.
    pub host: String,

    /// Skip nonce injection on update calls.
    pub disable_nonce: bool,

    /// Requested request lifetime in milliseconds.
    pub ingress_expiry_delta_ms: u64,

    /// Timeout applied by the built-in transport, in seconds.
    pub transport_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            disable_nonce: false,
            ingress_expiry_delta_ms: DEFAULT_INGRESS_EXPIRY_DELTA_MS,
            transport_timeout_secs: 30,
        }
    }
}

impl AgentConfig {
    /// Create a config for testing (local replica, short timeout).
    pub fn for_testing() -> Self {
        Self {
            host: "http://localhost:4943".to_string(),
            disable_nonce: false,
            ingress_expiry_delta_ms: DEFAULT_INGRESS_EXPIRY_DELTA_MS,
            transport_timeout_secs: 5,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AGENT_HOST`: Replica host (default: https://ic0.app)
    /// - `AGENT_DISABLE_NONCE`: Disable nonces on update calls (default: false)
    /// - `AGENT_INGRESS_EXPIRY_MS`: Request lifetime (default: 300000)
    /// - `AGENT_TRANSPORT_TIMEOUT_SECS`: Transport timeout (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("AGENT_HOST").unwrap_or(defaults.host),

            disable_nonce: env::var("AGENT_DISABLE_NONCE")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.disable_nonce),

            ingress_expiry_delta_ms: env::var("AGENT_INGRESS_EXPIRY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.ingress_expiry_delta_ms),

            transport_timeout_secs: env::var("AGENT_TRANSPORT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.transport_timeout_secs),
        }
    }
}
