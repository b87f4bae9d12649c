//! # Request Content
//!
//! The unsigned body of a call, query or read-state request.
//!
//! Each variant can be flattened into `(field name, value)` pairs; the request
//! id and the wire codec both work on that flat view, so neither depends on
//! how a request was assembled.

use super::principal::Principal;
use super::value_objects::{Expiry, Nonce};

/// Replica endpoint a request is submitted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Asynchronous update call.
    Call,
    /// Synchronous query.
    Query,
    /// Certified state read.
    ReadState,
}

impl Endpoint {
    /// URL path segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Call => "call",
            Endpoint::Query => "query",
            Endpoint::ReadState => "read_state",
        }
    }
}

/// Generic value of a request field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HashValue {
    /// Raw bytes (blobs, principals, nonces).
    Bytes(Vec<u8>),
    /// UTF-8 text.
    Text(String),
    /// Natural number.
    Nat(u64),
    /// Ordered list.
    Array(Vec<HashValue>),
    /// Nested field map.
    Map(Vec<(String, HashValue)>),
}

impl HashValue {
    /// Principal as its raw bytes.
    pub fn principal(principal: &Principal) -> Self {
        HashValue::Bytes(principal.as_slice().to_vec())
    }
}

/// A state path: a sequence of labels.
pub type Path = Vec<Vec<u8>>;

/// Content shared by call and query requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanisterRequest {
    /// Target canister.
    pub canister_id: Principal,
    /// Method to invoke.
    pub method_name: String,
    /// Encoded argument.
    pub arg: Vec<u8>,
    /// Sender principal.
    pub sender: Principal,
    /// Expiry.
    pub ingress_expiry: Expiry,
    /// Optional replay nonce.
    pub nonce: Option<Nonce>,
}

/// Content of a read-state request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadStateRequest {
    /// Requested state paths.
    pub paths: Vec<Path>,
    /// Sender principal.
    pub sender: Principal,
    /// Expiry.
    pub ingress_expiry: Expiry,
    /// Optional replay nonce.
    pub nonce: Option<Nonce>,
}

/// Unsigned request content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestContent {
    /// Update call.
    Call(CanisterRequest),
    /// Query.
    Query(CanisterRequest),
    /// Read state.
    ReadState(ReadStateRequest),
}

impl RequestContent {
    /// Value of the `request_type` field.
    pub fn request_type(&self) -> &'static str {
        self.endpoint().as_str()
    }

    /// Endpoint this content is submitted to.
    pub fn endpoint(&self) -> Endpoint {
        match self {
            RequestContent::Call(_) => Endpoint::Call,
            RequestContent::Query(_) => Endpoint::Query,
            RequestContent::ReadState(_) => Endpoint::ReadState,
        }
    }

    /// Sender principal.
    pub fn sender(&self) -> &Principal {
        match self {
            RequestContent::Call(r) | RequestContent::Query(r) => &r.sender,
            RequestContent::ReadState(r) => &r.sender,
        }
    }

    /// Expiry.
    pub fn ingress_expiry(&self) -> Expiry {
        match self {
            RequestContent::Call(r) | RequestContent::Query(r) => r.ingress_expiry,
            RequestContent::ReadState(r) => r.ingress_expiry,
        }
    }

    /// Nonce, if any.
    pub fn nonce(&self) -> Option<&Nonce> {
        match self {
            RequestContent::Call(r) | RequestContent::Query(r) => r.nonce.as_ref(),
            RequestContent::ReadState(r) => r.nonce.as_ref(),
        }
    }

    /// Flatten into `(name, value)` pairs. An absent nonce is omitted.
    pub fn fields(&self) -> Vec<(&'static str, HashValue)> {
        let mut fields = vec![("request_type", HashValue::Text(self.request_type().to_string()))];

        match self {
            RequestContent::Call(r) | RequestContent::Query(r) => {
                fields.push(("canister_id", HashValue::principal(&r.canister_id)));
                fields.push(("method_name", HashValue::Text(r.method_name.clone())));
                fields.push(("arg", HashValue::Bytes(r.arg.clone())));
            }
            RequestContent::ReadState(r) => {
                let paths = r
                    .paths
                    .iter()
                    .map(|path| {
                        HashValue::Array(
                            path.iter().map(|label| HashValue::Bytes(label.clone())).collect(),
                        )
                    })
                    .collect();
                fields.push(("paths", HashValue::Array(paths)));
            }
        }

        fields.push(("sender", HashValue::principal(self.sender())));
        fields.push(("ingress_expiry", HashValue::Nat(self.ingress_expiry().as_nanos())));
        if let Some(nonce) = self.nonce() {
            fields.push(("nonce", HashValue::Bytes(nonce.as_bytes().to_vec())));
        }
        fields
    }
}

/// Caller parameters for an update call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Method to invoke.
    pub method_name: String,
    /// Encoded argument.
    pub arg: Vec<u8>,
}

impl CallOptions {
    /// Create call options.
    pub fn new(method_name: impl Into<String>, arg: impl Into<Vec<u8>>) -> Self {
        Self {
            method_name: method_name.into(),
            arg: arg.into(),
        }
    }
}

/// Caller parameters for a query.
pub type QueryOptions = CallOptions;
