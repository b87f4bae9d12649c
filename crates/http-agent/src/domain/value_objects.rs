//! # Domain Value Objects
//!
//! Immutable value types and protocol constants.

use std::fmt;

/// Default time-to-live for a submitted request (5 minutes).
pub const DEFAULT_INGRESS_EXPIRY_DELTA_MS: u64 = 5 * 60 * 1000;

/// How far ahead of its own clock a replica still accepts an expiry.
pub const REPLICA_PERMITTED_DRIFT_MS: u64 = 60 * 1000;

/// Nanoseconds per millisecond.
pub const NANOSECONDS_PER_MILLISECOND: u64 = 1_000_000;

/// Domain separator prepended to the request id before signing.
pub const IC_REQUEST_DOMAIN_SEPARATOR: &[u8] = b"\x0Aic-request";

/// Length of a nonce in bytes.
pub const NONCE_LEN: usize = 8;

/// 32-byte content hash identifying a request independently of its signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId([u8; 32]);

impl RequestId {
    /// Wrap a raw hash.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lower-case hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Message an identity signs: domain separator followed by the id.
    pub fn signable(&self) -> Vec<u8> {
        let mut message = Vec::with_capacity(IC_REQUEST_DOMAIN_SEPARATOR.len() + 32);
        message.extend_from_slice(IC_REQUEST_DOMAIN_SEPARATOR);
        message.extend_from_slice(&self.0);
        message
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestId({})", self.to_hex())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Replay-protection nonce carried by state-changing requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Nonce([u8; NONCE_LEN]);

impl Nonce {
    /// Wrap raw bytes.
    pub fn new(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}

/// Ingress expiry in nanoseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Expiry(u64);

impl Expiry {
    /// From nanoseconds.
    pub fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// From milliseconds.
    pub fn from_millis(millis: u64) -> Self {
        Self(millis.saturating_mul(NANOSECONDS_PER_MILLISECOND))
    }

    /// Nanoseconds since epoch.
    pub fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Whole milliseconds since epoch.
    pub fn as_millis(&self) -> u64 {
        self.0 / NANOSECONDS_PER_MILLISECOND
    }
}
