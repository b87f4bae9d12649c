//! # Outbound Ports
//!
//! Traits for external dependencies (transport, replica time, local clock).

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::AgentError;

/// Content type of every encoded envelope.
pub const CBOR_CONTENT_TYPE: &str = "application/cbor";

/// HTTP method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET (status endpoint).
    Get,
    /// POST (canister endpoints).
    Post,
}

/// Request descriptor handed to the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    /// Method.
    pub method: HttpMethod,
    /// Headers in insertion order.
    pub headers: Vec<(String, String)>,
    /// Body bytes.
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// POST of a CBOR body.
    pub fn post_cbor(body: Vec<u8>) -> Self {
        Self {
            method: HttpMethod::Post,
            headers: vec![("Content-Type".to_string(), CBOR_CONTENT_TYPE.to_string())],
            body,
        }
    }

    /// Bodyless GET.
    pub fn get() -> Self {
        Self {
            method: HttpMethod::Get,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

/// Response returned by the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport - outbound port.
///
/// Retries, TLS and timeouts belong to the implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one request against `url`.
    async fn fetch(&self, url: &str, request: HttpRequest) -> Result<HttpResponse, AgentError>;
}

/// Replica time source - outbound port.
#[async_trait]
pub trait ReplicaTimeSource: Send + Sync {
    /// Replica's current time in milliseconds since epoch.
    async fn replica_time_ms(&self) -> Result<u64, AgentError>;
}

/// Local wall clock - outbound port.
pub trait LocalClock: Send + Sync {
    /// Milliseconds since epoch.
    fn now_ms(&self) -> u64;
}

/// System wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl LocalClock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

type Responder = Box<dyn Fn(&str, &HttpRequest) -> Result<HttpResponse, AgentError> + Send + Sync>;

/// Mock transport recording every request.
pub struct MockTransport {
    calls: Mutex<Vec<(String, HttpRequest)>>,
    responder: Responder,
}

impl MockTransport {
    /// Answers every request with `200` and an empty body.
    pub fn new() -> Self {
        Self::with_response(200, Vec::new())
    }

    /// Answers every request with the given status and body.
    pub fn with_response(status: u16, body: Vec<u8>) -> Self {
        Self::responding(move |_, _| {
            Ok(HttpResponse {
                status,
                body: body.clone(),
            })
        })
    }

    /// Fails every request with a transport error.
    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::responding(move |_, _| Err(AgentError::Transport(message.clone())))
    }

    /// Answers through a closure.
    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&str, &HttpRequest) -> Result<HttpResponse, AgentError> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// Recorded `(url, request)` pairs.
    pub fn calls(&self) -> Vec<(String, HttpRequest)> {
        self.calls.lock().clone()
    }

    /// Number of recorded requests.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, url: &str, request: HttpRequest) -> Result<HttpResponse, AgentError> {
        let response = (self.responder)(url, &request);
        self.calls.lock().push((url.to_string(), request));
        response
    }
}

/// Mock replica clock.
#[derive(Debug, Default)]
pub struct FixedReplicaTime {
    time_ms: u64,
    should_fail: bool,
    queries: AtomicUsize,
}

impl FixedReplicaTime {
    /// Replica reporting `time_ms`.
    pub fn new(time_ms: u64) -> Self {
        Self {
            time_ms,
            should_fail: false,
            queries: AtomicUsize::new(0),
        }
    }

    /// Replica that cannot be reached.
    pub fn unreachable() -> Self {
        Self {
            time_ms: 0,
            should_fail: true,
            queries: AtomicUsize::new(0),
        }
    }

    /// How many times the time was requested.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReplicaTimeSource for FixedReplicaTime {
    async fn replica_time_ms(&self) -> Result<u64, AgentError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(AgentError::Transport("Mock failure".to_string()));
        }
        Ok(self.time_ms)
    }
}

/// Settable local clock.
#[derive(Debug, Default)]
pub struct FixedClock {
    now_ms: AtomicU64,
}

impl FixedClock {
    /// Clock frozen at `now_ms`.
    pub fn new(now_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(now_ms),
        }
    }

    /// Move the clock.
    pub fn set(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }
}

impl LocalClock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
