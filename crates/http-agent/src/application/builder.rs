//! # Request Builder
//!
//! Assembles unsigned request content: sender from the active identity,
//! expiry from the drift-corrected clock. Nonces are left to the transform
//! pipeline.

use std::sync::Arc;

use crate::algorithms::ClockSync;
use crate::domain::{
    CallOptions, CanisterRequest, Expiry, Path, Principal, QueryOptions, ReadStateRequest,
    RequestContent,
};
use crate::ports::LocalClock;

/// Builds request content for the agent.
pub struct RequestBuilder {
    clock_sync: Arc<ClockSync>,
    local_clock: Arc<dyn LocalClock>,
    ingress_expiry_delta_ms: u64,
}

impl RequestBuilder {
    /// Create a builder.
    pub fn new(
        clock_sync: Arc<ClockSync>,
        local_clock: Arc<dyn LocalClock>,
        ingress_expiry_delta_ms: u64,
    ) -> Self {
        Self {
            clock_sync,
            local_clock,
            ingress_expiry_delta_ms,
        }
    }

    /// Expiry for a request built now.
    pub fn expiry(&self) -> Expiry {
        self.clock_sync
            .compute_expiry(self.local_clock.now_ms(), self.ingress_expiry_delta_ms)
    }

    /// Update call content.
    pub fn call(
        &self,
        sender: Principal,
        canister_id: &Principal,
        options: CallOptions,
    ) -> RequestContent {
        RequestContent::Call(self.canister_request(sender, canister_id, options))
    }

    /// Query content.
    pub fn query(
        &self,
        sender: Principal,
        canister_id: &Principal,
        options: QueryOptions,
    ) -> RequestContent {
        RequestContent::Query(self.canister_request(sender, canister_id, options))
    }

    /// Read-state content.
    pub fn read_state(&self, sender: Principal, paths: Vec<Path>) -> RequestContent {
        RequestContent::ReadState(ReadStateRequest {
            paths,
            sender,
            ingress_expiry: self.expiry(),
            nonce: None,
        })
    }

    fn canister_request(
        &self,
        sender: Principal,
        canister_id: &Principal,
        options: CallOptions,
    ) -> CanisterRequest {
        CanisterRequest {
            canister_id: canister_id.clone(),
            method_name: options.method_name,
            arg: options.arg,
            sender,
            ingress_expiry: self.expiry(),
            nonce: None,
        }
    }
}
