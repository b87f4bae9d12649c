//! # Envelope Signer
//!
//! Wraps content into an envelope, signing the domain-separated request id.
//! The content is moved in untouched, so the request id never depends on the
//! signature.

use crate::domain::{AgentError, Envelope, Identity, RequestContent, RequestId};

/// Produces envelopes for the active identity.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvelopeSigner;

impl EnvelopeSigner {
    /// Create a signer.
    pub fn new() -> Self {
        Self
    }

    /// Sign `content` as `identity`.
    ///
    /// Anonymous identities get neither public key nor signature; a
    /// non-empty delegation chain is attached as `sender_delegation`.
    pub fn sign(
        &self,
        content: RequestContent,
        request_id: &RequestId,
        identity: &dyn Identity,
    ) -> Result<Envelope, AgentError> {
        let Some(public_key) = identity.public_key() else {
            return Ok(Envelope::unsigned(content));
        };

        let signature = identity.sign(&request_id.signable())?;
        let delegations = identity.delegation_chain();

        Ok(Envelope {
            content,
            sender_pubkey: Some(public_key),
            sender_sig: Some(signature),
            sender_delegation: (!delegations.is_empty()).then_some(delegations),
        })
    }
}
