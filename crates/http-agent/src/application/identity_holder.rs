//! # Identity Holder
//!
//! The one piece of mutable state shared by every request. Reads and writes go
//! through a single lock; the last write wins and is visible immediately.
//!
//! An identity may also be handed over as a future. Requests wait for it to
//! resolve; until then the sender reported by [`IdentityHolder::sender`] is
//! anonymous.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;

use crate::domain::{AgentError, AnonymousIdentity, Identity, Principal};

type PendingIdentity = Shared<BoxFuture<'static, Arc<dyn Identity>>>;

enum IdentityState {
    Pending(PendingIdentity),
    Active(Arc<dyn Identity>),
    Invalidated,
}

enum Current {
    Ready(Arc<dyn Identity>),
    Waiting(PendingIdentity),
}

/// Owner of the agent's current identity.
///
/// `Pending` → `Active` once the future resolves,
/// any state → `Active` via [`replace`](Self::replace),
/// `Pending` / `Active` → `Invalidated` via [`invalidate`](Self::invalidate).
pub struct IdentityHolder {
    state: RwLock<IdentityState>,
}

impl IdentityHolder {
    /// Holder starting with `identity`.
    pub fn new(identity: Arc<dyn Identity>) -> Self {
        Self {
            state: RwLock::new(IdentityState::Active(identity)),
        }
    }

    /// Holder starting with the anonymous identity.
    pub fn anonymous() -> Self {
        Self::new(Arc::new(AnonymousIdentity))
    }

    /// Holder whose identity is produced by `identity`.
    pub fn pending<F>(identity: F) -> Self
    where
        F: Future<Output = Arc<dyn Identity>> + Send + 'static,
    {
        Self {
            state: RwLock::new(IdentityState::Pending(identity.boxed().shared())),
        }
    }

    /// Current identity, waiting for a pending one to resolve.
    ///
    /// Fails with `IdentityExpired` once invalidated, including when the
    /// invalidation happens while waiting.
    pub async fn active(&self) -> Result<Arc<dyn Identity>, AgentError> {
        let pending = match self.current()? {
            Current::Ready(identity) => return Ok(identity),
            Current::Waiting(pending) => pending,
        };

        let resolved = pending.await;
        self.settle(resolved)
    }

    /// Sender of the current identity; anonymous while still pending.
    pub fn sender(&self) -> Result<Principal, AgentError> {
        match &*self.state.read() {
            IdentityState::Active(identity) => Ok(identity.sender()),
            IdentityState::Pending(pending) => Ok(pending
                .peek()
                .map(|identity| identity.sender())
                .unwrap_or_else(Principal::anonymous)),
            IdentityState::Invalidated => Err(AgentError::IdentityExpired),
        }
    }

    /// Install `identity`. Requests built afterwards use it.
    pub fn replace(&self, identity: Arc<dyn Identity>) {
        let sender = identity.sender();
        *self.state.write() = IdentityState::Active(identity);
        tracing::info!("[http-agent] Identity replaced, sender {}", sender);
    }

    /// Drop the identity; every request fails until the next `replace`.
    pub fn invalidate(&self) {
        let mut state = self.state.write();
        if !matches!(*state, IdentityState::Invalidated) {
            *state = IdentityState::Invalidated;
            tracing::info!("[http-agent] Identity invalidated");
        }
    }

    /// Whether the holder is invalidated.
    pub fn is_invalidated(&self) -> bool {
        matches!(*self.state.read(), IdentityState::Invalidated)
    }

    /// Whether the identity is still being resolved.
    pub fn is_pending(&self) -> bool {
        matches!(*self.state.read(), IdentityState::Pending(_))
    }

    fn current(&self) -> Result<Current, AgentError> {
        match &*self.state.read() {
            IdentityState::Active(identity) => Ok(Current::Ready(Arc::clone(identity))),
            IdentityState::Pending(pending) => Ok(Current::Waiting(pending.clone())),
            IdentityState::Invalidated => Err(AgentError::IdentityExpired),
        }
    }

    // A replace or invalidate that landed while waiting takes precedence.
    fn settle(&self, resolved: Arc<dyn Identity>) -> Result<Arc<dyn Identity>, AgentError> {
        let mut state = self.state.write();
        if matches!(*state, IdentityState::Pending(_)) {
            tracing::info!("[http-agent] Identity resolved, sender {}", resolved.sender());
            *state = IdentityState::Active(Arc::clone(&resolved));
            return Ok(resolved);
        }
        match &*state {
            IdentityState::Active(identity) => Ok(Arc::clone(identity)),
            _ => Err(AgentError::IdentityExpired),
        }
    }
}
