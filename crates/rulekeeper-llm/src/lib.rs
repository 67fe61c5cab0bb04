//! Rulekeeper LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `rulekeeper-domain`.
//! Every provider returns JSON that has been checked against the schema
//! carried by the request, so callers can deserialize without second-guessing
//! the shape.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OpenAiProvider`: OpenAI-compatible chat completions with JSON-schema output
//!
//! # Examples
//!
//! ```
//! use rulekeeper_llm::MockProvider;
//! use rulekeeper_domain::{LlmProvider, StructuredRequest};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let provider = MockProvider::new(json!({"rules": []}));
//! let request = StructuredRequest::new("system", vec![], "rules", json!({"type": "object"}));
//! let result = provider.generate_structured(&request).await.unwrap();
//! assert_eq!(result, json!({"rules": []}));
//! # }
//! ```

#![warn(missing_docs)]

pub mod openai;
pub mod schema;

use rulekeeper_domain::{LlmProvider as LlmProviderTrait, StructuredRequest};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub use openai::{OpenAiConfig, OpenAiProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or transport failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// Provider answered with a non-success status
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message reported by the provider
        message: String,
    },

    /// Response envelope was missing or malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model declined to answer
    #[error("Model refused the request: {0}")]
    Refusal(String),

    /// Response content did not conform to the requested schema
    #[error("Response does not match schema: {0}")]
    SchemaViolation(String),

    /// The request schema itself could not be compiled
    #[error("Invalid request schema: {0}")]
    InvalidSchema(String),

    /// Provider is misconfigured
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Mock LLM provider for deterministic testing
///
/// Responses are served from a queue in the order they were pushed; once the
/// queue is empty every call gets the default response. Every response is
/// checked against the request schema, exactly like the real provider.
/// Clones share the queue, call count and request log.
///
/// # Examples
///
/// ```
/// use rulekeeper_llm::MockProvider;
/// use serde_json::json;
///
/// let provider = MockProvider::new(json!({"edits": []}));
/// provider.push_response(json!({"edits": [{"operation": "delete"}]}));
/// provider.push_error("rate limited");
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: Value,
    queue: Arc<Mutex<VecDeque<Result<Value, String>>>>,
    requests: Arc<Mutex<Vec<StructuredRequest>>>,
    call_count: Arc<Mutex<usize>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockProvider {
    /// Create a new MockProvider with a fixed default response
    pub fn new(response: Value) -> Self {
        Self {
            default_response: response,
            queue: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Queue a response for the next unanswered call
    pub fn push_response(&self, response: Value) {
        lock(&self.queue).push_back(Ok(response));
    }

    /// Queue an API failure for the next unanswered call
    pub fn push_error(&self, message: impl Into<String>) {
        lock(&self.queue).push_back(Err(message.into()));
    }

    /// Get the number of times generate_structured was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<StructuredRequest> {
        lock(&self.requests).clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(Value::Object(Default::default()))
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    async fn generate_structured(&self, request: &StructuredRequest) -> Result<Value, LlmError> {
        *lock(&self.call_count) += 1;
        lock(&self.requests).push(request.clone());

        let next = lock(&self.queue).pop_front();
        let response = match next {
            Some(Ok(value)) => value,
            Some(Err(message)) => {
                return Err(LlmError::Api {
                    status: 500,
                    message,
                })
            }
            None => self.default_response.clone(),
        };

        schema::check(&request.schema, &response)?;
        Ok(response)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(schema: Value) -> StructuredRequest {
        StructuredRequest::new("system", vec![], "test", schema)
    }

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new(json!({"ok": true}));
        let result = provider.generate_structured(&request(json!({}))).await;
        assert_eq!(result.unwrap(), json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_mock_provider_queue_then_default() {
        let provider = MockProvider::new(json!("default"));
        provider.push_response(json!("first"));
        provider.push_response(json!("second"));

        let req = request(json!({}));
        assert_eq!(provider.generate_structured(&req).await.unwrap(), json!("first"));
        assert_eq!(provider.generate_structured(&req).await.unwrap(), json!("second"));
        assert_eq!(provider.generate_structured(&req).await.unwrap(), json!("default"));
    }

    #[tokio::test]
    async fn test_mock_provider_call_count_and_requests() {
        let provider = MockProvider::default();
        let req = request(json!({}));

        assert_eq!(provider.call_count(), 0);
        provider.generate_structured(&req).await.unwrap();
        provider.generate_structured(&req).await.unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.requests().len(), 2);
        assert_eq!(provider.requests()[0].schema_name, "test");

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let provider = MockProvider::default();
        provider.push_error("quota exceeded");

        let result = provider.generate_structured(&request(json!({}))).await;
        match result {
            Err(LlmError::Api { message, .. }) => assert_eq!(message, "quota exceeded"),
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mock_provider_enforces_schema() {
        let provider = MockProvider::new(json!({"count": "three"}));
        let schema = json!({
            "type": "object",
            "properties": {"count": {"type": "integer"}},
            "required": ["count"]
        });

        let result = provider.generate_structured(&request(schema)).await;
        assert!(matches!(result, Err(LlmError::SchemaViolation(_))));
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::default();
        let provider2 = provider1.clone();

        provider1.generate_structured(&request(json!({}))).await.unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
