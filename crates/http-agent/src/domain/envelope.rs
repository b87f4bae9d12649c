//! # Envelope and Responses
//!
//! The signed wrapper sent over the wire and the decoded replica replies.

use super::identity::SignedDelegation;
use super::request::RequestContent;
use super::value_objects::RequestId;

/// Request content plus optional authentication fields.
///
/// Signing never touches `content`; the request id is a function of the
/// content only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// Unsigned content.
    pub content: RequestContent,
    /// DER public key of the sender.
    pub sender_pubkey: Option<Vec<u8>>,
    /// Signature over the domain-separated request id.
    pub sender_sig: Option<Vec<u8>>,
    /// Delegation chain, when signing through a session key.
    pub sender_delegation: Option<Vec<SignedDelegation>>,
}

impl Envelope {
    /// Envelope without authentication (anonymous sender).
    pub fn unsigned(content: RequestContent) -> Self {
        Self {
            content,
            sender_pubkey: None,
            sender_sig: None,
            sender_delegation: None,
        }
    }

    /// Whether signature fields are attached.
    pub fn is_signed(&self) -> bool {
        self.sender_sig.is_some()
    }
}

/// Outcome of submitting an update call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitResponse {
    /// Id to poll for the result.
    pub request_id: RequestId,
    /// HTTP status returned by the replica.
    pub status: u16,
}

/// Decoded query reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryResponse {
    /// The canister replied.
    Replied {
        /// Encoded reply argument.
        arg: Vec<u8>,
    },
    /// The canister or replica rejected the query.
    Rejected {
        /// Reject code.
        reject_code: u64,
        /// Human readable message.
        reject_message: String,
        /// Optional error code.
        error_code: Option<String>,
    },
}

/// Decoded read-state reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadStateResponse {
    /// CBOR-encoded certificate.
    pub certificate: Vec<u8>,
}
