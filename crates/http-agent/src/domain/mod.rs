//! # Domain Module
//!
//! Core domain types for the agent.

pub mod certificate;
pub mod envelope;
pub mod errors;
pub mod identity;
pub mod principal;
pub mod request;
pub mod value_objects;

pub use certificate::*;
pub use envelope::*;
pub use errors::*;
pub use identity::*;
pub use principal::*;
pub use request::*;
pub use value_objects::*;
