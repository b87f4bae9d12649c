//! # Agent Request Flows
//!
//! Construction, submission and transform behaviour of the agent as seen
//! from the transport.
//!
//! ## Flows Tested:
//!
//! 1. **Construction**: no transport → configuration error
//! 2. **Call**: URL, headers, request id derived from the wire content
//! 3. **Transforms**: sequential, awaited, errors abort before I/O
//! 4. **Pre-built read state**: bypasses every transform
//! 5. **Polling input**: identical read-state requests are byte-identical

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use http_agent::adapters::map_get;
    use http_agent::{
        request_id_of, transform_fn, Agent, AgentConfig, AgentError, CallOptions, HttpAgent,
        MockTransport, Nonce, NonceTransform, QueryOptions, QueryResponse, RequestContent,
        RequestTransform,
    };

    use crate::integration::fixtures::*;

    /// Transform that counts invocations.
    fn spy(counter: Arc<AtomicUsize>) -> Arc<dyn RequestTransform> {
        Arc::new(transform_fn(move |content| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(content)
        }))
    }

    /// Transform that suspends before appending to the method name.
    struct SuspendingSuffix(&'static str);

    #[async_trait]
    impl RequestTransform for SuspendingSuffix {
        async fn apply(&self, content: RequestContent) -> Result<RequestContent, AgentError> {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(match content {
                RequestContent::Call(mut request) => {
                    request.method_name.push_str(self.0);
                    RequestContent::Call(request)
                }
                other => other,
            })
        }
    }

    /// Sets a fixed nonce on read-state requests.
    fn fixed_read_state_nonce() -> Arc<dyn RequestTransform> {
        Arc::new(transform_fn(|content| {
            Ok(match content {
                RequestContent::ReadState(mut request) => {
                    request.nonce = Some(Nonce::new([0x42; 8]));
                    RequestContent::ReadState(request)
                }
                other => other,
            })
        }))
    }

    // =============================================================================
    // CONSTRUCTION
    // =============================================================================

    #[test]
    fn test_construction_without_transport_is_configuration_error() {
        let result = HttpAgent::builder(AgentConfig::default()).build();

        match result {
            Err(AgentError::Configuration(message)) => {
                assert!(message.contains("No transport implementation was available"));
            }
            Err(other) => panic!("expected configuration error, got {}", other),
            Ok(_) => panic!("agent built without a transport"),
        }
    }

    #[test]
    fn test_subdomain_host_is_canonicalised() {
        let agent = HttpAgent::builder(AgentConfig::default())
            .with_transport(accepting_transport())
            .with_host("https://foo.bar.ic0.app/some/path")
            .build()
            .unwrap();

        assert_eq!(agent.host().origin(), "https://ic0.app");
    }

    // =============================================================================
    // CALL
    // =============================================================================

    #[tokio::test]
    async fn test_call_targets_canister_endpoint_with_cbor() {
        let transport = accepting_transport();
        let agent = agent(transport.clone());

        agent
            .call(&canister(), CallOptions::new("greet", b"DIDL\x00\x00".to_vec()))
            .await
            .unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        let (url, request) = &calls[0];
        assert_eq!(
            url,
            "http://localhost:4943/api/v2/canister/rwlgt-iiaaa-aaaaa-aaaaa-cai/call"
        );
        assert_eq!(request.method, http_agent::HttpMethod::Post);
        assert_eq!(
            request.headers,
            vec![("Content-Type".to_string(), "application/cbor".to_string())]
        );
    }

    #[tokio::test]
    async fn test_request_id_matches_wire_content() {
        let transport = accepting_transport();
        let agent = agent(transport.clone());

        let response = agent
            .call(&canister(), CallOptions::new("greet", vec![1, 2, 3]))
            .await
            .unwrap();

        let content = content_map(&transport.calls()[0].1.body);
        assert_eq!(request_id_of(&hash_fields(&content)), response.request_id);
    }

    #[tokio::test]
    async fn test_consecutive_calls_get_distinct_nonces() {
        let transport = accepting_transport();
        let agent = agent(transport.clone());

        for _ in 0..2 {
            agent.call(&canister(), CallOptions::new("inc", vec![])).await.unwrap();
        }

        let nonces: Vec<_> = transport
            .calls()
            .iter()
            .map(|(_, request)| map_get(&content_map(&request.body), "nonce").cloned())
            .collect();
        assert!(nonces.iter().all(Option::is_some));
        assert_ne!(nonces[0], nonces[1]);
    }

    #[tokio::test]
    async fn test_query_decodes_reply() {
        let transport = Arc::new(MockTransport::with_response(200, query_reply(b"DIDL\x00\x01q")));
        let agent = agent(transport.clone());

        let response = agent
            .query(&canister(), QueryOptions::new("lookup", vec![]))
            .await
            .unwrap();

        assert_eq!(
            response,
            QueryResponse::Replied {
                arg: b"DIDL\x00\x01q".to_vec()
            }
        );
        assert!(transport.calls()[0].0.ends_with("/query"));
        // Queries never carry a nonce
        assert!(map_get(&content_map(&transport.calls()[0].1.body), "nonce").is_none());
    }

    #[tokio::test]
    async fn test_undecodable_reply_is_decode_error() {
        let transport = Arc::new(MockTransport::with_response(200, vec![0xff, 0xff]));
        let agent = agent(transport);

        let result = agent.query(&canister(), QueryOptions::new("lookup", vec![])).await;
        assert!(matches!(result, Err(AgentError::Decode(_))));
    }

    #[tokio::test]
    async fn test_transport_error_surfaces_unchanged() {
        let transport = Arc::new(MockTransport::failing("connection reset"));
        let agent = agent(transport.clone());

        let result = agent.call(&canister(), CallOptions::new("greet", vec![])).await;
        assert!(matches!(result, Err(AgentError::Transport(msg)) if msg == "connection reset"));
        // No retries
        assert_eq!(transport.call_count(), 1);
    }

    // =============================================================================
    // TRANSFORMS
    // =============================================================================

    #[tokio::test]
    async fn test_suspending_transforms_apply_in_order() {
        let transport = accepting_transport();
        let agent = agent(transport.clone());
        agent.add_transform(Arc::new(SuspendingSuffix("_first")));
        agent.add_transform(Arc::new(SuspendingSuffix("_second")));

        agent.call(&canister(), CallOptions::new("greet", vec![])).await.unwrap();

        let content = content_map(&transport.calls()[0].1.body);
        assert_eq!(
            map_get(&content, "method_name").and_then(ciborium::Value::as_text),
            Some("greet_first_second")
        );
    }

    #[tokio::test]
    async fn test_transform_error_aborts_before_transport() {
        let transport = accepting_transport();
        let agent = agent(transport.clone());
        agent.add_transform(Arc::new(transform_fn(|_| {
            Err(AgentError::Transform("entropy unavailable".to_string()))
        })));

        let result = agent.call(&canister(), CallOptions::new("greet", vec![])).await;

        assert!(matches!(result, Err(AgentError::Transform(msg)) if msg == "entropy unavailable"));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_disabled_nonce_keeps_custom_transforms() {
        let transport = accepting_transport();
        let agent = agent_builder(transport.clone()).disable_nonce().build().unwrap();
        let runs = Arc::new(AtomicUsize::new(0));
        agent.add_transform(spy(runs.clone()));

        agent.call(&canister(), CallOptions::new("greet", vec![])).await.unwrap();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(map_get(&content_map(&transport.calls()[0].1.body), "nonce").is_none());
    }

    // =============================================================================
    // PRE-BUILT READ STATE
    // =============================================================================

    #[tokio::test]
    async fn test_prepared_read_state_runs_no_transforms() {
        let transport = Arc::new(MockTransport::with_response(200, read_state_reply(b"cert")));
        let agent = agent(transport.clone());
        let prepared = agent
            .create_read_state_request(vec![vec![b"time".to_vec()]])
            .await
            .unwrap();

        let runs = Arc::new(AtomicUsize::new(0));
        agent.add_transform(spy(runs.clone()));

        let response = agent.read_state_prepared(&canister(), &prepared).await.unwrap();

        assert_eq!(response.certificate, b"cert".to_vec());
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(transport.calls()[0].1.body, prepared.body);
    }

    #[tokio::test]
    async fn test_regular_read_state_runs_transforms() {
        let transport = Arc::new(MockTransport::with_response(200, read_state_reply(b"cert")));
        let agent = agent(transport);
        let runs = Arc::new(AtomicUsize::new(0));
        agent.add_transform(spy(runs.clone()));

        agent
            .read_state(&canister(), vec![vec![b"time".to_vec()]])
            .await
            .unwrap();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    // =============================================================================
    // POLLING INPUT
    // =============================================================================

    #[tokio::test]
    async fn test_identical_read_states_are_byte_identical() {
        let transport = Arc::new(MockTransport::with_response(200, read_state_reply(b"cert")));
        let agent = agent(transport.clone());
        agent.add_transform(fixed_read_state_nonce());

        let paths = vec![vec![b"request_status".to_vec(), vec![0xAB; 32], b"reply".to_vec()]];
        agent.read_state(&canister(), paths.clone()).await.unwrap();
        agent.read_state(&canister(), paths).await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1.body, calls[1].1.body);
    }

    #[tokio::test]
    async fn test_fixed_nonce_calls_are_byte_identical() {
        let transport = accepting_transport();
        let agent = agent(transport.clone());
        agent.add_transform(Arc::new(NonceTransform::fixed(Nonce::new([9; 8]))));

        let first = agent.call(&canister(), CallOptions::new("poll", vec![])).await.unwrap();
        let second = agent.call(&canister(), CallOptions::new("poll", vec![])).await.unwrap();

        assert_eq!(first.request_id, second.request_id);
        let calls = transport.calls();
        assert_eq!(calls[0].1.body, calls[1].1.body);
    }
}
