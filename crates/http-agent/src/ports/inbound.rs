//! # Inbound Ports
//!
//! API trait defining what the agent can do.

use async_trait::async_trait;

use crate::domain::{
    AgentError, CallOptions, Path, Principal, QueryOptions, QueryResponse, ReadStateResponse,
    SubmitResponse,
};

/// Agent API - inbound port.
///
/// Every request operation checks the identity first and fails with
/// [`AgentError::IdentityExpired`] before any work once it is invalidated.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Submit an update call; returns the request id to poll.
    async fn call(
        &self,
        canister_id: &Principal,
        options: CallOptions,
    ) -> Result<SubmitResponse, AgentError>;

    /// Run a query and decode the reply.
    async fn query(
        &self,
        canister_id: &Principal,
        options: QueryOptions,
    ) -> Result<QueryResponse, AgentError>;

    /// Read certified state at `paths`.
    async fn read_state(
        &self,
        canister_id: &Principal,
        paths: Vec<Path>,
    ) -> Result<ReadStateResponse, AgentError>;

    /// Reconcile with the replica clock; returns the offset in use afterwards.
    ///
    /// Never fails: an unreachable replica keeps the previous offset.
    async fn sync_time(&self) -> i64;

    /// Principal of the active identity.
    fn principal(&self) -> Result<Principal, AgentError>;
}
