//! # Transform Pipeline
//!
//! Ordered, append-only list of request transforms. Each stage receives the
//! content produced by the previous one and may suspend; stages never run
//! concurrently. The first error aborts the request and is returned as is.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::algorithms::NonceGenerator;
use crate::domain::{AgentError, Nonce, RequestContent};

/// A stage of the pipeline.
#[async_trait]
pub trait RequestTransform: Send + Sync {
    /// Return the replacement content (possibly unchanged).
    async fn apply(&self, content: RequestContent) -> Result<RequestContent, AgentError>;
}

/// Transform backed by a synchronous closure.
pub struct FnTransform<F> {
    f: F,
}

#[async_trait]
impl<F> RequestTransform for FnTransform<F>
where
    F: Fn(RequestContent) -> Result<RequestContent, AgentError> + Send + Sync,
{
    async fn apply(&self, content: RequestContent) -> Result<RequestContent, AgentError> {
        (self.f)(content)
    }
}

/// Wrap a closure as a transform.
pub fn transform_fn<F>(f: F) -> FnTransform<F>
where
    F: Fn(RequestContent) -> Result<RequestContent, AgentError> + Send + Sync,
{
    FnTransform { f }
}

enum NonceSource {
    Random(NonceGenerator),
    Fixed(Nonce),
    Custom(Box<dyn Fn() -> Nonce + Send + Sync>),
}

/// Sets a nonce on update calls. Queries and read-state requests pass through.
pub struct NonceTransform {
    source: NonceSource,
}

impl NonceTransform {
    /// Fresh random nonce per call.
    pub fn new() -> Self {
        Self::with_generator(NonceGenerator::new())
    }

    /// Random nonces from `generator`.
    pub fn with_generator(generator: NonceGenerator) -> Self {
        Self {
            source: NonceSource::Random(generator),
        }
    }

    /// Always the same nonce; makes repeated requests byte-identical.
    pub fn fixed(nonce: Nonce) -> Self {
        Self {
            source: NonceSource::Fixed(nonce),
        }
    }

    /// Nonces from a caller-supplied function.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> Nonce + Send + Sync + 'static,
    {
        Self {
            source: NonceSource::Custom(Box::new(f)),
        }
    }

    fn next_nonce(&self) -> Nonce {
        match &self.source {
            NonceSource::Random(generator) => generator.generate(),
            NonceSource::Fixed(nonce) => *nonce,
            NonceSource::Custom(f) => f(),
        }
    }
}

impl Default for NonceTransform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestTransform for NonceTransform {
    async fn apply(&self, content: RequestContent) -> Result<RequestContent, AgentError> {
        Ok(match content {
            RequestContent::Call(mut request) => {
                request.nonce = Some(self.next_nonce());
                RequestContent::Call(request)
            }
            other => other,
        })
    }
}

/// Ordered transforms, applied in registration order.
#[derive(Default)]
pub struct TransformPipeline {
    transforms: RwLock<Vec<Arc<dyn RequestTransform>>>,
}

impl TransformPipeline {
    /// Empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transform.
    pub fn push(&self, transform: Arc<dyn RequestTransform>) {
        self.transforms.write().push(transform);
    }

    /// Number of registered transforms.
    pub fn len(&self) -> usize {
        self.transforms.read().len()
    }

    /// Whether no transform is registered.
    pub fn is_empty(&self) -> bool {
        self.transforms.read().is_empty()
    }

    /// Run every transform over `content`.
    pub async fn apply(&self, mut content: RequestContent) -> Result<RequestContent, AgentError> {
        // Snapshot so the lock is not held across awaits
        let transforms: Vec<_> = self.transforms.read().clone();
        tracing::debug!("[http-agent] Applying {} transform(s)", transforms.len());

        for transform in transforms {
            content = transform.apply(content).await?;
        }
        Ok(content)
    }
}
