//! Mock provider for testing without a live service.
//!
//! [`MockProvider`] replays pre-configured replies in order, allowing
//! downstream consumers to write deterministic tests against this crate,
//! including rate-limit and transport-failure paths.
//!
//! # Example
//!
//! ```
//! use content_pipeline::provider::{MockProvider, MockReply};
//! use serde_json::json;
//!
//! let mock = MockProvider::new(vec![
//!     MockReply::RateLimited,
//!     MockReply::Value(json!({"questions": []})),
//! ]);
//! assert_eq!(mock.calls(), 0);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{GenerationRequest, Provider};
use crate::error::Result;
use crate::schema::OutputSchema;
use crate::PipelineError;

/// One canned outcome of a [`MockProvider`] call.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Successful call returning this document.
    Value(Value),
    /// HTTP 429 with a `RESOURCE_EXHAUSTED` body.
    RateLimited,
    /// HTTP 500 with this body.
    Fail(String),
}

impl MockReply {
    fn into_result(self) -> Result<Value> {
        match self {
            MockReply::Value(v) => Ok(v),
            MockReply::RateLimited => Err(PipelineError::HttpError {
                status: 429,
                body: r#"{"error": {"status": "RESOURCE_EXHAUSTED"}}"#.to_string(),
                retry_after: None,
            }),
            MockReply::Fail(body) => Err(PipelineError::HttpError {
                status: 500,
                body,
                retry_after: None,
            }),
        }
    }
}

/// A test provider that returns canned replies in order.
///
/// Cycles back to the beginning when all replies have been consumed.
#[derive(Debug)]
pub struct MockProvider {
    replies: Vec<MockReply>,
    index: AtomicUsize,
    schemas: Mutex<Vec<OutputSchema>>,
}

impl MockProvider {
    /// Create a mock provider with the given canned replies.
    ///
    /// An empty list behaves as a provider that always fails.
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies,
            index: AtomicUsize::new(0),
            schemas: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always returns the same document.
    pub fn fixed(value: Value) -> Self {
        Self::new(vec![MockReply::Value(value)])
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }

    /// Schemas requested so far, in call order.
    pub fn requested_schemas(&self) -> Vec<OutputSchema> {
        self.schemas.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn next_reply(&self) -> Option<MockReply> {
        let idx = self.index.fetch_add(1, Ordering::SeqCst);
        if self.replies.is_empty() {
            return None;
        }
        Some(self.replies[idx % self.replies.len()].clone())
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value> {
        if let Ok(mut schemas) = self.schemas.lock() {
            schemas.push(request.schema);
        }
        match self.next_reply() {
            Some(reply) => reply.into_result(),
            None => Err(PipelineError::Other("MockProvider has no replies".into())),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
