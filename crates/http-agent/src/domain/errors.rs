//! # Domain Errors
//!
//! Error types surfaced by every agent operation.

use agent_crypto::CryptoError;
use thiserror::Error;

/// Agent error types.
///
/// Everything is surfaced to the immediate caller; the agent never retries.
/// The only swallowed failure is a clock sync that could not reach the
/// replica, which keeps the previous offset instead.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No usable transport could be resolved while building the agent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The agent's identity was invalidated; nothing was built or sent.
    #[error("This identity has expired due to this application's security policy. Please refresh your authentication.")]
    IdentityExpired,

    /// A registered request transform failed.
    #[error("Request transform failed: {0}")]
    Transform(String),

    /// The transport call itself failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The replica answered with a non-success HTTP status.
    #[error("Server returned an error: HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Response body, lossily decoded as UTF-8
        body: String,
    },

    /// A response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Request envelope could not be encoded.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Signing or key handling failed.
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Principal bytes or text were malformed.
    #[error("Invalid principal: {0}")]
    InvalidPrincipal(String),

    /// Host string could not be parsed.
    #[error("Invalid host: {0}")]
    InvalidHost(String),

    /// A certificate did not contain the expected path.
    #[error("Certificate lookup failed: {0}")]
    CertificateLookup(String),
}
