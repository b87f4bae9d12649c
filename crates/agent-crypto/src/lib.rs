//! # Agent Crypto - Signing Primitives for Canister Agents
//!
//! Key material and hash functions consumed by the identities that sign
//! requests sent to a replica.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256, SHA-224 | Request ids, self-authenticating principals |
//! | `signatures` | Ed25519 | Default key identity |
//! | `ecdsa` | secp256k1 | Hardware-wallet / exchange compatible identity |
//!
//! Public keys are exposed both raw and DER-wrapped (`SubjectPublicKeyInfo`),
//! since the DER form is what travels in `sender_pubkey` and what principals
//! are derived from.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod signatures;

// Re-exports
pub use ecdsa::{Secp256k1KeyPair, Secp256k1PublicKey, Secp256k1Signature};
pub use errors::CryptoError;
pub use hashing::{sha224, sha256, Sha256Hasher};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
