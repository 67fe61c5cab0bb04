//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::ContentPart;
use serde_json::Value;
use std::future::Future;

/// A request for schema-constrained JSON output
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    /// System instructions
    pub system: String,

    /// User content, in order
    pub content: Vec<ContentPart>,

    /// Name of the response schema (letters, digits, `_` and `-`)
    pub schema_name: String,

    /// JSON Schema the response must conform to
    pub schema: Value,
}

impl StructuredRequest {
    /// Create a new request
    pub fn new(
        system: impl Into<String>,
        content: Vec<ContentPart>,
        schema_name: impl Into<String>,
        schema: Value,
    ) -> Self {
        Self {
            system: system.into(),
            content,
            schema_name: schema_name.into(),
            schema,
        }
    }
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (rulekeeper-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Issue a single request and return JSON conforming to `request.schema`
    fn generate_structured(
        &self,
        request: &StructuredRequest,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send;

    /// Name of the model answering requests
    fn model_name(&self) -> &str;
}
