//! # Adapters Module
//!
//! Wire codec and concrete transport implementations.

pub mod cbor;
#[cfg(feature = "reqwest-transport")]
pub mod reqwest_transport;

pub use cbor::{
    decode_certificate, decode_hash_tree, decode_query_response, decode_read_state_response,
    decode_value, encode_envelope, map_get, SELF_DESCRIBE_TAG,
};
#[cfg(feature = "reqwest-transport")]
pub use reqwest_transport::ReqwestTransport;
