//! # HTTP Agent Service
//!
//! Application service orchestrating request construction, signing and
//! submission.
//!
//! Every request operation checks the identity first. Once invalidated, the
//! agent fails with `IdentityExpired` before building, transforming, hashing
//! or touching the transport.

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;

use crate::adapters::{
    decode_certificate, decode_query_response, decode_read_state_response, decode_value,
    encode_envelope,
};
use crate::algorithms::{leb128_decode, ClockSync, ResolvedHost};
use crate::application::{
    EnvelopeSigner, IdentityHolder, NonceTransform, RequestBuilder, RequestTransform,
    TransformPipeline,
};
use crate::config::AgentConfig;
use crate::domain::{
    AgentError, CallOptions, Endpoint, Envelope, Identity, LookupResult, Path, Principal,
    QueryOptions, QueryResponse, ReadStateResponse, RequestContent, RequestId, SubmitResponse,
    NANOSECONDS_PER_MILLISECOND,
};
use crate::ports::{
    Agent, HttpRequest, HttpResponse, LocalClock, ReplicaTimeSource, SystemClock, Transport,
};

/// A signed, encoded read-state request ready to be sent as is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedRequest {
    /// Request id of the content.
    pub request_id: RequestId,
    /// The envelope.
    pub envelope: Envelope,
    /// Encoded envelope.
    pub body: Vec<u8>,
}

impl PreparedRequest {
    /// Encode an already signed envelope.
    pub fn from_envelope(envelope: Envelope) -> Result<Self, AgentError> {
        let request_id = envelope.content.request_id();
        let body = encode_envelope(&envelope)?;
        Ok(Self {
            request_id,
            envelope,
            body,
        })
    }
}

/// Builder for [`HttpAgent`].
pub struct HttpAgentBuilder {
    config: AgentConfig,
    transport: Option<Arc<dyn Transport>>,
    identity: Option<Arc<dyn Identity>>,
    identity_future: Option<BoxFuture<'static, Arc<dyn Identity>>>,
    replica_time: Option<Arc<dyn ReplicaTimeSource>>,
    local_clock: Option<Arc<dyn LocalClock>>,
}

impl HttpAgentBuilder {
    /// Start from a configuration.
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config,
            transport: None,
            identity: None,
            identity_future: None,
            replica_time: None,
            local_clock: None,
        }
    }

    /// Use `transport` for every request.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sign as `identity` (anonymous otherwise).
    pub fn with_identity(mut self, identity: Arc<dyn Identity>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Sign as whatever `identity` resolves to.
    ///
    /// Requests wait for it; the principal reads as anonymous until then.
    /// Takes precedence over [`with_identity`](Self::with_identity).
    pub fn with_identity_future<F>(mut self, identity: F) -> Self
    where
        F: Future<Output = Arc<dyn Identity>> + Send + 'static,
    {
        self.identity_future = Some(identity.boxed());
        self
    }

    /// Ask `source` for the replica time instead of reading certified state.
    pub fn with_replica_time_source(mut self, source: Arc<dyn ReplicaTimeSource>) -> Self {
        self.replica_time = Some(source);
        self
    }

    /// Read local time from `clock` instead of the system clock.
    pub fn with_local_clock(mut self, clock: Arc<dyn LocalClock>) -> Self {
        self.local_clock = Some(clock);
        self
    }

    /// Override the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Skip the default nonce transform.
    pub fn disable_nonce(mut self) -> Self {
        self.config.disable_nonce = true;
        self
    }

    /// Build the agent.
    pub fn build(self) -> Result<HttpAgent, AgentError> {
        let host = ResolvedHost::parse(&self.config.host)?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport(&self.config)?,
        };
        let identity = match (self.identity_future, self.identity) {
            (Some(pending), _) => IdentityHolder::pending(pending),
            (None, Some(identity)) => IdentityHolder::new(identity),
            (None, None) => IdentityHolder::anonymous(),
        };
        let local_clock = self
            .local_clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn LocalClock>);

        let clock_sync = Arc::new(ClockSync::new());
        let builder = RequestBuilder::new(
            Arc::clone(&clock_sync),
            Arc::clone(&local_clock),
            self.config.ingress_expiry_delta_ms,
        );

        let transforms = TransformPipeline::new();
        if !self.config.disable_nonce {
            transforms.push(Arc::new(NonceTransform::new()));
        }

        tracing::info!(
            "[http-agent] Agent for {} (nonce {})",
            host.origin(),
            if self.config.disable_nonce { "disabled" } else { "enabled" }
        );

        Ok(HttpAgent {
            config: self.config,
            host,
            transport,
            identity,
            transforms,
            builder,
            signer: EnvelopeSigner::new(),
            clock_sync,
            local_clock,
            replica_time: self.replica_time,
        })
    }
}

#[cfg(feature = "reqwest-transport")]
fn default_transport(config: &AgentConfig) -> Result<Arc<dyn Transport>, AgentError> {
    let timeout = std::time::Duration::from_secs(config.transport_timeout_secs);
    Ok(Arc::new(crate::adapters::ReqwestTransport::new(timeout)?))
}

#[cfg(not(feature = "reqwest-transport"))]
fn default_transport(_config: &AgentConfig) -> Result<Arc<dyn Transport>, AgentError> {
    Err(AgentError::Configuration(
        "No transport implementation was available. Pass one to \
         HttpAgentBuilder::with_transport or enable the `reqwest-transport` feature."
            .to_string(),
    ))
}

/// HTTP Agent - submits signed requests to canisters.
pub struct HttpAgent {
    /// Configuration.
    config: AgentConfig,
    /// Canonicalised replica origin.
    host: ResolvedHost,
    /// Outbound transport.
    transport: Arc<dyn Transport>,
    /// Current identity.
    identity: IdentityHolder,
    /// Registered transforms.
    transforms: TransformPipeline,
    /// Content builder.
    builder: RequestBuilder,
    /// Envelope signer.
    signer: EnvelopeSigner,
    /// Replica clock offset.
    clock_sync: Arc<ClockSync>,
    /// Local wall clock.
    local_clock: Arc<dyn LocalClock>,
    /// Injected replica time source; certified state is read otherwise.
    replica_time: Option<Arc<dyn ReplicaTimeSource>>,
}

impl HttpAgent {
    /// Start building an agent.
    pub fn builder(config: AgentConfig) -> HttpAgentBuilder {
        HttpAgentBuilder::new(config)
    }

    /// Configuration in use.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Resolved replica host.
    pub fn host(&self) -> &ResolvedHost {
        &self.host
    }

    /// Current clock offset in milliseconds.
    pub fn clock_offset_ms(&self) -> i64 {
        self.clock_sync.offset_ms()
    }

    /// Append a transform to the pipeline.
    pub fn add_transform(&self, transform: Arc<dyn RequestTransform>) {
        self.transforms.push(transform);
    }

    /// Install a new identity; later requests use it.
    pub fn replace_identity(&self, identity: Arc<dyn Identity>) {
        self.identity.replace(identity);
    }

    /// Invalidate the identity; requests fail until it is replaced.
    pub fn invalidate_identity(&self) {
        self.identity.invalidate();
    }

    /// Build, transform and sign a read-state request without sending it.
    pub async fn create_read_state_request(
        &self,
        paths: Vec<Path>,
    ) -> Result<PreparedRequest, AgentError> {
        let identity = self.identity.active().await?;
        let content = self.builder.read_state(identity.sender(), paths);
        self.prepare(content, identity.as_ref()).await
    }

    /// Send a pre-built read-state request verbatim.
    ///
    /// Neither the builder nor any transform runs.
    pub async fn read_state_prepared(
        &self,
        canister_id: &Principal,
        request: &PreparedRequest,
    ) -> Result<ReadStateResponse, AgentError> {
        self.identity.active().await?;
        let response = self
            .post(canister_id, Endpoint::ReadState, &request.request_id, request.body.clone())
            .await?;
        decode_read_state_response(&response.body)
    }

    /// Replica status as a raw CBOR value.
    pub async fn status(&self) -> Result<ciborium::Value, AgentError> {
        let url = self.host.status_url();
        let response = self.transport.fetch(&url, HttpRequest::get()).await?;
        let response = check_status(response)?;
        decode_value(&response.body)
    }

    async fn prepare(
        &self,
        content: RequestContent,
        identity: &dyn Identity,
    ) -> Result<PreparedRequest, AgentError> {
        let content = self.transforms.apply(content).await?;
        let request_id = content.request_id();
        let envelope = self.signer.sign(content, &request_id, identity)?;
        let body = encode_envelope(&envelope)?;
        Ok(PreparedRequest {
            request_id,
            envelope,
            body,
        })
    }

    async fn post(
        &self,
        canister_id: &Principal,
        endpoint: Endpoint,
        request_id: &RequestId,
        body: Vec<u8>,
    ) -> Result<HttpResponse, AgentError> {
        let url = self.host.endpoint_url(canister_id, endpoint);
        tracing::debug!(
            "[http-agent] {} {} request {}",
            endpoint.as_str(),
            canister_id,
            request_id
        );

        let response = self
            .transport
            .fetch(&url, HttpRequest::post_cbor(body))
            .await?;
        tracing::debug!(
            "[http-agent] {} {} replied {}",
            endpoint.as_str(),
            canister_id,
            response.status
        );
        check_status(response)
    }

    /// Replica time read from the certified `time` leaf.
    async fn certified_time_ms(&self) -> Result<u64, AgentError> {
        let response = self
            .read_state(&Principal::management_canister(), vec![vec![b"time".to_vec()]])
            .await?;
        let certificate = decode_certificate(&response.certificate)?;

        match certificate.tree.lookup_path(&[b"time"]) {
            LookupResult::Found(leaf) => Ok(leb128_decode(leaf)? / NANOSECONDS_PER_MILLISECOND),
            other => Err(AgentError::CertificateLookup(format!(
                "time not found in certificate: {:?}",
                other
            ))),
        }
    }
}

fn check_status(response: HttpResponse) -> Result<HttpResponse, AgentError> {
    if response.is_success() {
        return Ok(response);
    }
    Err(AgentError::HttpStatus {
        status: response.status,
        body: String::from_utf8_lossy(&response.body).into_owned(),
    })
}

#[async_trait]
impl Agent for HttpAgent {
    async fn call(
        &self,
        canister_id: &Principal,
        options: CallOptions,
    ) -> Result<SubmitResponse, AgentError> {
        let identity = self.identity.active().await?;
        let content = self.builder.call(identity.sender(), canister_id, options);
        let prepared = self.prepare(content, identity.as_ref()).await?;

        let response = self
            .post(canister_id, Endpoint::Call, &prepared.request_id, prepared.body)
            .await?;
        Ok(SubmitResponse {
            request_id: prepared.request_id,
            status: response.status,
        })
    }

    async fn query(
        &self,
        canister_id: &Principal,
        options: QueryOptions,
    ) -> Result<QueryResponse, AgentError> {
        let identity = self.identity.active().await?;
        let content = self.builder.query(identity.sender(), canister_id, options);
        let prepared = self.prepare(content, identity.as_ref()).await?;

        let response = self
            .post(canister_id, Endpoint::Query, &prepared.request_id, prepared.body)
            .await?;
        decode_query_response(&response.body)
    }

    async fn read_state(
        &self,
        canister_id: &Principal,
        paths: Vec<Path>,
    ) -> Result<ReadStateResponse, AgentError> {
        let prepared = self.create_read_state_request(paths).await?;
        let response = self
            .post(canister_id, Endpoint::ReadState, &prepared.request_id, prepared.body)
            .await?;
        decode_read_state_response(&response.body)
    }

    async fn sync_time(&self) -> i64 {
        let replica_time = match &self.replica_time {
            Some(source) => source.replica_time_ms().await,
            None => self.certified_time_ms().await,
        };

        match replica_time {
            Ok(replica_ms) => {
                let offset = self.clock_sync.record(self.local_clock.now_ms(), replica_ms);
                tracing::info!("[http-agent] Clock synced, offset {} ms", offset);
                offset
            }
            Err(e) => {
                let offset = self.clock_sync.offset_ms();
                tracing::warn!(
                    "[http-agent] Clock sync failed, keeping offset {} ms: {}",
                    offset,
                    e
                );
                offset
            }
        }
    }

    fn principal(&self) -> Result<Principal, AgentError> {
        self.identity.sender()
    }
}
