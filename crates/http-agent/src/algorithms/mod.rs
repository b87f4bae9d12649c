//! # Algorithms Module
//!
//! - `request_id`: canonical, order-independent content hashing
//! - `nonce`: 8-byte nonce packing with two interchangeable write strategies
//! - `host`: canonical hostname resolution for transport routing
//! - `clock`: replica clock reconciliation and expiry computation

pub mod clock;
pub mod host;
pub mod nonce;
pub mod request_id;

pub use clock::ClockSync;
pub use host::{canonical_root, resolve_hostname, ResolvedHost, CANONICAL_ROOT_DOMAINS};
pub use nonce::{NonceGenerator, NoncePacking};
pub use request_id::{hash_of_map, hash_value, leb128_decode, leb128_encode, request_id_of};
