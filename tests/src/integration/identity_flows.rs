//! # Identity Flows
//!
//! Invalidation, replacement and signing as observed on the wire.
//!
//! ## Flows Tested:
//!
//! 1. **Invalidation**: every request operation fails fast, transport untouched
//! 2. **Replacement**: the next request is signed with the new key
//! 3. **Non-interference**: signing never changes the request id
//! 4. **Pending identity**: requests wait for it, principal is anonymous meanwhile

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use agent_crypto::{Ed25519PublicKey, Ed25519Signature, Secp256k1PublicKey, Secp256k1Signature};
    use ciborium::Value;
    use futures::channel::oneshot;
    use http_agent::adapters::map_get;
    use http_agent::{
        Agent, AgentError, CallOptions, Delegation, DelegatedIdentity, DelegationChain,
        Ed25519Identity, EnvelopeSigner, Identity, MockTransport, Principal, QueryOptions,
        RequestId, Secp256k1Identity, SignedDelegation,
    };

    use crate::integration::fixtures::*;

    const EXPIRED_MESSAGE: &str = "This identity has expired due to this application's \
                                   security policy. Please refresh your authentication.";

    fn envelope_bytes(body: &[u8], field: &str) -> Option<Vec<u8>> {
        map_get(&envelope_map(body), field)
            .and_then(Value::as_bytes)
            .cloned()
    }

    fn request_id_from_wire(body: &[u8]) -> RequestId {
        http_agent::request_id_of(&hash_fields(&content_map(body)))
    }

    // =============================================================================
    // INVALIDATION
    // =============================================================================

    #[tokio::test]
    async fn test_invalidated_identity_rejects_every_operation() {
        let transport = Arc::new(MockTransport::new());
        let agent = agent(transport.clone());
        agent.invalidate_identity();

        let call = agent
            .call(&canister(), CallOptions::new("greet", vec![]))
            .await
            .unwrap_err();
        let query = agent
            .query(&canister(), QueryOptions::new("greet", vec![]))
            .await
            .unwrap_err();
        let read_state = agent
            .read_state(&canister(), vec![vec![b"time".to_vec()]])
            .await
            .unwrap_err();

        for error in [call, query, read_state] {
            assert!(matches!(error, AgentError::IdentityExpired));
            assert_eq!(error.to_string(), EXPIRED_MESSAGE);
        }
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalidated_identity_rejects_prepared_read_state() {
        let transport = Arc::new(MockTransport::with_response(200, read_state_reply(b"c")));
        let agent = agent(transport.clone());
        let prepared = agent
            .create_read_state_request(vec![vec![b"time".to_vec()]])
            .await
            .unwrap();

        agent.invalidate_identity();

        assert!(matches!(
            agent.read_state_prepared(&canister(), &prepared).await,
            Err(AgentError::IdentityExpired)
        ));
        assert!(matches!(
            agent.create_read_state_request(vec![]).await,
            Err(AgentError::IdentityExpired)
        ));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_sync_time_after_invalidation_keeps_offset() {
        let transport = Arc::new(MockTransport::new());
        let agent = agent(transport.clone());
        agent.invalidate_identity();

        assert_eq!(agent.sync_time().await, 0);
        assert_eq!(transport.call_count(), 0);
    }

    // =============================================================================
    // REPLACEMENT
    // =============================================================================

    #[tokio::test]
    async fn test_replacement_after_invalidation_signs_with_new_key() {
        let transport = accepting_transport();
        let original = Arc::new(Ed25519Identity::from_seed([1u8; 32]));
        let agent = agent_builder(transport.clone())
            .with_identity(original)
            .build()
            .unwrap();

        agent.invalidate_identity();
        let replacement = Arc::new(Ed25519Identity::from_seed([2u8; 32]));
        agent.replace_identity(replacement.clone());

        let response = agent
            .call(&canister(), CallOptions::new("greet", vec![]))
            .await
            .unwrap();

        let calls = transport.calls();
        let body = &calls[0].1.body;
        let der = replacement.public_key().unwrap();
        assert_eq!(envelope_bytes(body, "sender_pubkey"), Some(der.clone()));
        assert_eq!(
            map_get(&content_map(body), "sender").and_then(Value::as_bytes),
            Some(&replacement.sender().as_slice().to_vec())
        );

        let signature: [u8; 64] = envelope_bytes(body, "sender_sig").unwrap().try_into().unwrap();
        let public_key = Ed25519PublicKey::from_der(&der).unwrap();
        assert!(public_key
            .verify(&response.request_id.signable(), &Ed25519Signature::from_bytes(signature))
            .is_ok());
    }

    #[tokio::test]
    async fn test_replacement_is_visible_to_next_request() {
        let transport = accepting_transport();
        let agent = agent(transport.clone());
        assert!(agent.principal().unwrap().is_anonymous());

        agent
            .call(&canister(), CallOptions::new("greet", vec![]))
            .await
            .unwrap();
        let identity = Arc::new(Secp256k1Identity::from_secret([0x22u8; 32]).unwrap());
        agent.replace_identity(identity.clone());
        agent
            .call(&canister(), CallOptions::new("greet", vec![]))
            .await
            .unwrap();

        let calls = transport.calls();
        assert!(envelope_bytes(&calls[0].1.body, "sender_sig").is_none());
        assert_eq!(
            envelope_bytes(&calls[1].1.body, "sender_pubkey"),
            identity.public_key()
        );
        assert_eq!(agent.principal().unwrap(), identity.sender());

        let public_key = Secp256k1PublicKey::from_der(&identity.public_key().unwrap()).unwrap();
        let signature: [u8; 64] = envelope_bytes(&calls[1].1.body, "sender_sig")
            .unwrap()
            .try_into()
            .unwrap();
        let request_id = request_id_from_wire(&calls[1].1.body);
        assert!(public_key
            .verify(&request_id.signable(), &Secp256k1Signature::from_bytes(signature))
            .is_ok());
    }

    #[tokio::test]
    async fn test_delegated_identity_attaches_chain() {
        let transport = accepting_transport();
        let session: Arc<dyn Identity> = Arc::new(Ed25519Identity::from_seed([3u8; 32]));
        let root = Ed25519Identity::from_seed([4u8; 32]);
        let chain = DelegationChain {
            public_key: root.public_key().unwrap(),
            delegations: vec![SignedDelegation {
                delegation: Delegation {
                    pubkey: session.public_key().unwrap(),
                    expiration: 1_800_000_000_000_000_000,
                    targets: Some(vec![canister()]),
                },
                signature: vec![0x5A; 64],
            }],
        };
        let agent = agent_builder(transport.clone())
            .with_identity(Arc::new(DelegatedIdentity::new(session, chain)))
            .build()
            .unwrap();

        agent
            .call(&canister(), CallOptions::new("greet", vec![]))
            .await
            .unwrap();

        let envelope = envelope_map(&transport.calls()[0].1.body);
        let delegations = map_get(&envelope, "sender_delegation")
            .and_then(Value::as_array)
            .unwrap();
        assert_eq!(delegations.len(), 1);
        assert_eq!(agent.principal().unwrap(), root.sender());
    }

    // =============================================================================
    // PENDING IDENTITY
    // =============================================================================

    #[tokio::test]
    async fn test_call_waits_for_pending_identity() {
        let transport = accepting_transport();
        let (resolve, resolved) = oneshot::channel::<Arc<dyn Identity>>();
        let agent = Arc::new(
            agent_builder(transport.clone())
                .with_identity_future(async move {
                    match resolved.await {
                        Ok(identity) => identity,
                        Err(_) => Arc::new(http_agent::AnonymousIdentity) as Arc<dyn Identity>,
                    }
                })
                .build()
                .unwrap(),
        );
        assert!(agent.principal().unwrap().is_anonymous());

        let in_flight = tokio::spawn({
            let agent = agent.clone();
            async move {
                let target = canister();
                agent.call(&target, CallOptions::new("greet", vec![])).await
            }
        });
        tokio::task::yield_now().await;
        assert_eq!(transport.call_count(), 0);

        let identity = Arc::new(Ed25519Identity::from_seed([10u8; 32]));
        assert!(resolve.send(identity.clone()).is_ok());
        in_flight.await.unwrap().unwrap();

        let calls = transport.calls();
        assert_eq!(envelope_bytes(&calls[0].1.body, "sender_pubkey"), identity.public_key());
        assert_eq!(agent.principal().unwrap(), identity.sender());
    }

    #[tokio::test]
    async fn test_invalidation_while_pending_rejects_requests() {
        let transport = accepting_transport();
        let agent = agent_builder(transport.clone())
            .with_identity_future(futures::future::pending::<Arc<dyn Identity>>())
            .build()
            .unwrap();

        agent.invalidate_identity();

        let result = agent.call(&canister(), CallOptions::new("greet", vec![])).await;
        assert!(matches!(result, Err(AgentError::IdentityExpired)));
        assert_eq!(transport.call_count(), 0);
    }

    // =============================================================================
    // NON-INTERFERENCE
    // =============================================================================

    #[tokio::test]
    async fn test_signature_does_not_change_request_id() {
        let transport = accepting_transport();
        let identity = Arc::new(Ed25519Identity::from_seed([7u8; 32]));
        let agent = agent_builder(transport.clone())
            .with_identity(identity.clone())
            .build()
            .unwrap();

        let response = agent
            .call(&canister(), CallOptions::new("greet", vec![0x01]))
            .await
            .unwrap();

        // Hash of the content alone, ignoring sender_pubkey / sender_sig
        assert_eq!(request_id_from_wire(&transport.calls()[0].1.body), response.request_id);
    }

    #[test]
    fn test_signing_same_content_twice_keeps_id() {
        let identity = Ed25519Identity::from_seed([8u8; 32]);
        let content = http_agent::RequestContent::Query(http_agent::CanisterRequest {
            canister_id: canister(),
            method_name: "get".to_string(),
            arg: vec![],
            sender: identity.sender(),
            ingress_expiry: http_agent::Expiry::from_millis(LOCAL_NOW_MS),
            nonce: None,
        });
        let id = content.request_id();

        let signed = EnvelopeSigner::new()
            .sign(content.clone(), &id, &identity)
            .unwrap();
        let unsigned = EnvelopeSigner::new()
            .sign(content, &id, &http_agent::AnonymousIdentity)
            .unwrap();

        assert_eq!(signed.content.request_id(), unsigned.content.request_id());
        assert!(signed.is_signed());
        assert!(!unsigned.is_signed());
        assert_ne!(signed.content.sender(), &Principal::anonymous());
    }
}
