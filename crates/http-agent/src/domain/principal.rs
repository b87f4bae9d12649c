//! # Principal
//!
//! Identifier shared by canisters and request senders.
//!
//! Text form: `base32(crc32_be(bytes) || bytes)` in lower case without
//! padding, split into dash-separated groups of five characters.

use agent_crypto::sha224;
use std::fmt;
use std::str::FromStr;

use super::errors::AgentError;

/// Maximum principal length in bytes.
pub const PRINCIPAL_MAX_LEN: usize = 29;

/// Trailing tag byte of a self-authenticating principal.
pub const SELF_AUTHENTICATING_SUFFIX: u8 = 0x02;

/// Trailing tag byte of the anonymous principal.
pub const ANONYMOUS_SUFFIX: u8 = 0x04;

const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";
const CHECKSUM_LEN: usize = 4;
const GROUP_LEN: usize = 5;

/// Canister or user identifier.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Principal {
    bytes: Vec<u8>,
}

impl Principal {
    /// Create from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AgentError> {
        if bytes.len() > PRINCIPAL_MAX_LEN {
            return Err(AgentError::InvalidPrincipal(format!(
                "{} bytes exceeds the {} byte limit",
                bytes.len(),
                PRINCIPAL_MAX_LEN
            )));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// The principal used when no identity signs the request.
    pub fn anonymous() -> Self {
        Self {
            bytes: vec![ANONYMOUS_SUFFIX],
        }
    }

    /// The management canister (`aaaaa-aa`).
    pub fn management_canister() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Principal controlled by the holder of a DER-encoded public key.
    pub fn self_authenticating(der_public_key: &[u8]) -> Self {
        let mut bytes = sha224(der_public_key).to_vec();
        bytes.push(SELF_AUTHENTICATING_SUFFIX);
        Self { bytes }
    }

    /// Raw bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether this is the anonymous principal.
    pub fn is_anonymous(&self) -> bool {
        self.bytes == [ANONYMOUS_SUFFIX]
    }

    /// Textual representation.
    pub fn to_text(&self) -> String {
        let mut payload = Vec::with_capacity(CHECKSUM_LEN + self.bytes.len());
        payload.extend_from_slice(&crc32fast::hash(&self.bytes).to_be_bytes());
        payload.extend_from_slice(&self.bytes);

        let encoded = base32_encode(&payload);
        let mut text = String::with_capacity(encoded.len() + encoded.len() / GROUP_LEN);
        for (i, c) in encoded.chars().enumerate() {
            if i > 0 && i % GROUP_LEN == 0 {
                text.push('-');
            }
            text.push(c);
        }
        text
    }

    /// Parse the textual representation.
    ///
    /// Rejects unknown characters, checksum mismatches and anything that does
    /// not re-encode to the same (lower-cased) text.
    pub fn from_text(text: &str) -> Result<Self, AgentError> {
        let normalized = text.to_ascii_lowercase();
        let compact: String = normalized.chars().filter(|c| *c != '-').collect();

        let decoded = base32_decode(&compact)?;
        if decoded.len() < CHECKSUM_LEN {
            return Err(AgentError::InvalidPrincipal(format!(
                "'{}' is too short",
                text
            )));
        }

        let (checksum, bytes) = decoded.split_at(CHECKSUM_LEN);
        if crc32fast::hash(bytes).to_be_bytes() != checksum {
            return Err(AgentError::InvalidPrincipal(format!(
                "checksum mismatch in '{}'",
                text
            )));
        }

        let principal = Self::from_slice(bytes)?;
        if principal.to_text() != normalized {
            return Err(AgentError::InvalidPrincipal(format!(
                "'{}' is not in canonical form",
                text
            )));
        }
        Ok(principal)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", self.to_text())
    }
}

impl FromStr for Principal {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl TryFrom<&str> for Principal {
    type Error = AgentError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_text(value)
    }
}

/// RFC 4648 base32, lower case, no padding.
fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits = 0u32;

    for &byte in data {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

fn base32_decode(text: &str) -> Result<Vec<u8>, AgentError> {
    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;

    for c in text.bytes() {
        let value = BASE32_ALPHABET
            .iter()
            .position(|&a| a == c)
            .ok_or_else(|| {
                AgentError::InvalidPrincipal(format!("invalid character '{}'", c as char))
            })?;
        buffer = (buffer << 5) | value as u32;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
        buffer &= (1 << bits) - 1;
    }
    Ok(out)
}
