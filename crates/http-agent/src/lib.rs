//! # HTTP Agent
//!
//! Client-side agent that submits authenticated, replay-resistant requests to
//! canisters and identifies them deterministically for status polling.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Request Flow
//!
//! ```text
//! IdentityHolder ──check──┐
//!                         ▼
//! ClockSync ──expiry──▶ RequestBuilder ──▶ TransformPipeline ──▶ request id
//!                                                                   │
//!                      Transport ◀── CBOR codec ◀── EnvelopeSigner ◀┘
//! ```
//!
//! The request id is computed from the request content alone, so attaching a
//! signature never changes it. A pre-built read-state request skips both the
//! builder and the pipeline.
//!
//! ## Module Structure
//!
//! ```text
//! http-agent/
//! ├── domain/          # Principal, request content, identities, envelope, certificate
//! ├── algorithms/      # Request id hashing, nonce packing, host resolution, clock sync
//! ├── ports/           # Agent API (inbound) + transport / time sources (outbound)
//! ├── application/     # HttpAgent, identity holder, transform pipeline, signer
//! ├── adapters/        # CBOR codec, reqwest transport
//! └── config.rs        # AgentConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use algorithms::{
    canonical_root, hash_of_map, hash_value, request_id_of, resolve_hostname, ClockSync,
    NonceGenerator, NoncePacking, ResolvedHost,
};
pub use application::{
    transform_fn, EnvelopeSigner, HttpAgent, HttpAgentBuilder, IdentityHolder, NonceTransform,
    PreparedRequest, RequestBuilder, RequestTransform, TransformPipeline,
};
pub use config::AgentConfig;
pub use domain::{
    AgentError, AnonymousIdentity, CallOptions, CanisterRequest, Certificate, Delegation,
    DelegatedIdentity, DelegationChain, Ed25519Identity, Endpoint, Envelope, Expiry, HashTree,
    HashValue, Identity, LookupResult, Nonce, Path, Principal, QueryOptions, QueryResponse,
    ReadStateRequest, ReadStateResponse, RequestContent, RequestId, Secp256k1Identity,
    SignedDelegation, SubmitResponse, DEFAULT_INGRESS_EXPIRY_DELTA_MS, REPLICA_PERMITTED_DRIFT_MS,
};
pub use ports::{
    Agent, FixedClock, FixedReplicaTime, HttpMethod, HttpRequest, HttpResponse, LocalClock,
    MockTransport, ReplicaTimeSource, SystemClock, Transport,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
