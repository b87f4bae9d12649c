//! # Request Id
//!
//! Representation-independent hash of request content:
//!
//! 1. hash every field name and every field value independently
//! 2. sort the `(name hash, value hash)` pairs by name hash
//! 3. hash the concatenation of the sorted pairs
//!
//! Values hash by kind: bytes and text directly, naturals as unsigned
//! LEB128, arrays as the concatenation of their element hashes, maps with
//! the same three steps. Two field lists holding the same pairs yield the
//! same id whatever order they were built in.

use agent_crypto::{sha256, Sha256Hasher};

use crate::domain::{AgentError, HashValue, RequestContent, RequestId};

type Hash = [u8; 32];

/// Hash a single value.
pub fn hash_value(value: &HashValue) -> Hash {
    match value {
        HashValue::Bytes(bytes) => sha256(bytes),
        HashValue::Text(text) => sha256(text.as_bytes()),
        HashValue::Nat(n) => sha256(&leb128_encode(*n)),
        HashValue::Array(items) => {
            let mut hasher = Sha256Hasher::new();
            for item in items {
                hasher.update(&hash_value(item));
            }
            hasher.finalize()
        }
        HashValue::Map(fields) => hash_of_map(fields),
    }
}

/// Hash a field map, independent of field order.
pub fn hash_of_map<K: AsRef<str>>(fields: &[(K, HashValue)]) -> Hash {
    let mut pairs: Vec<(Hash, Hash)> = fields
        .iter()
        .map(|(name, value)| (sha256(name.as_ref().as_bytes()), hash_value(value)))
        .collect();
    pairs.sort_unstable();

    let mut hasher = Sha256Hasher::new();
    for (name_hash, value_hash) in &pairs {
        hasher.update(name_hash);
        hasher.update(value_hash);
    }
    hasher.finalize()
}

/// Request id of an arbitrary field list.
pub fn request_id_of<K: AsRef<str>>(fields: &[(K, HashValue)]) -> RequestId {
    RequestId::new(hash_of_map(fields))
}

impl RequestContent {
    /// Request id of this content.
    pub fn request_id(&self) -> RequestId {
        request_id_of(&self.fields())
    }
}

/// Unsigned LEB128.
pub fn leb128_encode(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

/// Decode unsigned LEB128, rejecting trailing bytes and overflow.
pub fn leb128_decode(bytes: &[u8]) -> Result<u64, AgentError> {
    let mut value: u64 = 0;
    for (i, byte) in bytes.iter().enumerate() {
        let shift = 7 * i as u32;
        let chunk = u64::from(byte & 0x7f);
        if shift >= 64 || (shift > 0 && chunk >> (64 - shift) != 0) {
            return Err(AgentError::Decode("LEB128 value overflows u64".to_string()));
        }
        value |= chunk << shift;
        if byte & 0x80 == 0 {
            if i + 1 != bytes.len() {
                return Err(AgentError::Decode("trailing bytes after LEB128".to_string()));
            }
            return Ok(value);
        }
    }
    Err(AgentError::Decode("truncated LEB128".to_string()))
}
