//! # Application Module
//!
//! Application services orchestrating the domain, algorithms and outbound ports.

pub mod builder;
pub mod identity_holder;
pub mod service;
pub mod signer;
pub mod transforms;

pub use builder::RequestBuilder;
pub use identity_holder::IdentityHolder;
pub use service::{HttpAgent, HttpAgentBuilder, PreparedRequest};
pub use signer::EnvelopeSigner;
pub use transforms::{transform_fn, FnTransform, NonceTransform, RequestTransform, TransformPipeline};
