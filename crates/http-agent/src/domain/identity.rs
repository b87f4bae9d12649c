//! # Identities
//!
//! Signing capability attached to the agent. An identity yields the sender
//! principal, its DER public key and signatures over arbitrary bytes.
//! Anonymous identities have no key material and produce no signature.

use std::sync::Arc;

use agent_crypto::{Ed25519KeyPair, Secp256k1KeyPair};

use super::errors::AgentError;
use super::principal::Principal;
use super::request::HashValue;

/// Signing identity.
///
/// Signing is synchronous. Keys that live behind I/O are resolved first,
/// e.g. by passing a future to `HttpAgentBuilder::with_identity_future`.
pub trait Identity: Send + Sync {
    /// Principal the requests are sent as.
    fn sender(&self) -> Principal;

    /// DER-encoded public key, `None` for anonymous.
    fn public_key(&self) -> Option<Vec<u8>>;

    /// Sign `message`. Only called when `public_key` is `Some`.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, AgentError>;

    /// Delegations from the sender key down to the signing key.
    fn delegation_chain(&self) -> Vec<SignedDelegation> {
        Vec::new()
    }
}

/// Identity without keys; requests go out as the anonymous principal.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnonymousIdentity;

impl Identity for AnonymousIdentity {
    fn sender(&self) -> Principal {
        Principal::anonymous()
    }

    fn public_key(&self) -> Option<Vec<u8>> {
        None
    }

    fn sign(&self, _message: &[u8]) -> Result<Vec<u8>, AgentError> {
        Ok(Vec::new())
    }
}

/// Ed25519 key identity.
pub struct Ed25519Identity {
    key_pair: Ed25519KeyPair,
    der: Vec<u8>,
}

impl Ed25519Identity {
    /// Identity from a 32-byte secret seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::from_key_pair(Ed25519KeyPair::from_seed(seed))
    }

    /// Fresh random identity.
    pub fn generate() -> Self {
        Self::from_key_pair(Ed25519KeyPair::generate())
    }

    fn from_key_pair(key_pair: Ed25519KeyPair) -> Self {
        let der = key_pair.public_key().to_der();
        Self { key_pair, der }
    }
}

impl Identity for Ed25519Identity {
    fn sender(&self) -> Principal {
        Principal::self_authenticating(&self.der)
    }

    fn public_key(&self) -> Option<Vec<u8>> {
        Some(self.der.clone())
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, AgentError> {
        Ok(self.key_pair.sign(message).as_bytes().to_vec())
    }
}

/// secp256k1 key identity.
pub struct Secp256k1Identity {
    key_pair: Secp256k1KeyPair,
    der: Vec<u8>,
}

impl Secp256k1Identity {
    /// Identity from 32 secret key bytes.
    pub fn from_secret(secret: [u8; 32]) -> Result<Self, AgentError> {
        Self::from_key_pair(Secp256k1KeyPair::from_bytes(secret)?)
    }

    /// Fresh random identity.
    pub fn generate() -> Result<Self, AgentError> {
        Self::from_key_pair(Secp256k1KeyPair::generate())
    }

    fn from_key_pair(key_pair: Secp256k1KeyPair) -> Result<Self, AgentError> {
        let der = key_pair.public_key().to_der()?;
        Ok(Self { key_pair, der })
    }
}

impl Identity for Secp256k1Identity {
    fn sender(&self) -> Principal {
        Principal::self_authenticating(&self.der)
    }

    fn public_key(&self) -> Option<Vec<u8>> {
        Some(self.der.clone())
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, AgentError> {
        Ok(self.key_pair.sign(message).as_bytes().to_vec())
    }
}

/// Permission for `pubkey` to sign on behalf of the delegating key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delegation {
    /// DER public key receiving the delegation.
    pub pubkey: Vec<u8>,
    /// Expiration in nanoseconds since epoch.
    pub expiration: u64,
    /// Canisters the delegation is restricted to.
    pub targets: Option<Vec<Principal>>,
}

impl Delegation {
    /// Field view used by the codec.
    pub fn fields(&self) -> Vec<(String, HashValue)> {
        let mut fields = vec![
            ("pubkey".to_string(), HashValue::Bytes(self.pubkey.clone())),
            ("expiration".to_string(), HashValue::Nat(self.expiration)),
        ];
        if let Some(targets) = &self.targets {
            fields.push((
                "targets".to_string(),
                HashValue::Array(targets.iter().map(HashValue::principal).collect()),
            ));
        }
        fields
    }
}

/// A delegation together with the delegator's signature over it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedDelegation {
    /// The delegation.
    pub delegation: Delegation,
    /// Signature by the previous key in the chain.
    pub signature: Vec<u8>,
}

impl SignedDelegation {
    /// Field view used by the codec.
    pub fn fields(&self) -> Vec<(String, HashValue)> {
        vec![
            ("delegation".to_string(), HashValue::Map(self.delegation.fields())),
            ("signature".to_string(), HashValue::Bytes(self.signature.clone())),
        ]
    }
}

/// Root public key plus the delegations leading to the session key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelegationChain {
    /// DER public key of the root identity.
    pub public_key: Vec<u8>,
    /// Delegations, root first.
    pub delegations: Vec<SignedDelegation>,
}

/// Session key signing on behalf of a root key through a delegation chain.
pub struct DelegatedIdentity {
    inner: Arc<dyn Identity>,
    chain: DelegationChain,
}

impl DelegatedIdentity {
    /// Wrap a session identity with the chain that authorises it.
    pub fn new(inner: Arc<dyn Identity>, chain: DelegationChain) -> Self {
        Self { inner, chain }
    }

    /// The chain.
    pub fn chain(&self) -> &DelegationChain {
        &self.chain
    }
}

impl Identity for DelegatedIdentity {
    fn sender(&self) -> Principal {
        Principal::self_authenticating(&self.chain.public_key)
    }

    fn public_key(&self) -> Option<Vec<u8>> {
        Some(self.chain.public_key.clone())
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, AgentError> {
        self.inner.sign(message)
    }

    fn delegation_chain(&self) -> Vec<SignedDelegation> {
        self.chain.delegations.clone()
    }
}
