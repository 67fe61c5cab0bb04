//! OpenAI-compatible Provider Implementation
//!
//! Talks to any endpoint implementing the `/chat/completions` API with
//! `response_format: json_schema` (OpenAI, Azure-style gateways, local
//! servers such as vLLM or LM Studio).
//!
//! # Features
//!
//! - Async HTTP communication via reqwest
//! - Configurable endpoint, model and timeout
//! - PDFs and images sent inline as base64 data URLs
//! - Strict JSON-schema output, re-checked locally
//!
//! Exactly one request is issued per call. Failures are returned to the
//! caller as-is; nothing is retried here.
//!
//! # Examples
//!
//! ```no_run
//! use rulekeeper_llm::{OpenAiConfig, OpenAiProvider};
//!
//! let config = OpenAiConfig::new("sk-...", "gpt-4.1");
//! let provider = OpenAiProvider::new(config).unwrap();
//! ```

use crate::{schema, LlmError};
use rulekeeper_domain::{ContentPart, LlmProvider as LlmProviderTrait, StructuredRequest};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4.1";

/// Default timeout for a single request (5 minutes; PDFs are slow)
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Connection settings for an OpenAI-compatible endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiConfig {
    /// Base URL, without the `/chat/completions` suffix
    pub base_url: String,

    /// Bearer token
    pub api_key: String,

    /// Model name
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    /// Create a config for the default endpoint
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Use a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.api_key.trim().is_empty() {
            return Err(LlmError::Config("API key is empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(LlmError::Config("model name is empty".to_string()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(LlmError::Config(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(LlmError::Config("timeout must be greater than 0".to_string()));
        }
        Ok(())
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// OpenAI-compatible chat completions provider
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: reqwest::Client,
}

/// Response from the chat completions API
#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// Error envelope returned with non-success statuses
#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAiProvider {
    /// Create a new provider
    ///
    /// # Errors
    ///
    /// Returns `Config` if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// The configuration this provider was built with
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// Issue one structured-output request
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The endpoint is unreachable or times out (`Communication`)
    /// - The endpoint answers with a non-success status (`Api`)
    /// - The response envelope is malformed or empty (`InvalidResponse`)
    /// - The model refuses (`Refusal`)
    /// - The content is not JSON matching the schema (`SchemaViolation`)
    pub async fn generate_structured(
        &self,
        request: &StructuredRequest,
    ) -> Result<Value, LlmError> {
        let body = build_request_body(&self.config.model, request);
        debug!(
            "Sending '{}' request to {} ({} content parts)",
            request.schema_name,
            self.config.model,
            request.content.len()
        );

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Communication(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &text));
        }

        debug!("Response length: {} chars", text.len());
        let value = parse_completion(&text)?;
        schema::check(&request.schema, &value)?;
        Ok(value)
    }
}

impl LlmProviderTrait for OpenAiProvider {
    type Error = LlmError;

    async fn generate_structured(&self, request: &StructuredRequest) -> Result<Value, LlmError> {
        OpenAiProvider::generate_structured(self, request).await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Build the JSON body for a chat completions request
fn build_request_body(model: &str, request: &StructuredRequest) -> Value {
    let content: Vec<Value> = request.content.iter().map(content_part_json).collect();

    json!({
        "model": model,
        "messages": [
            {"role": "system", "content": request.system},
            {"role": "user", "content": content},
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": request.schema_name,
                "strict": true,
                "schema": request.schema,
            }
        }
    })
}

fn content_part_json(part: &ContentPart) -> Value {
    match part {
        ContentPart::Text(text) => json!({"type": "text", "text": text}),
        ContentPart::File {
            filename,
            media_type,
            data,
        } => json!({
            "type": "file",
            "file": {
                "filename": filename,
                "file_data": format!("data:{};base64,{}", media_type, data),
            }
        }),
        ContentPart::Image { media_type, data } => json!({
            "type": "image_url",
            "image_url": {"url": format!("data:{};base64,{}", media_type, data)}
        }),
    }
}

/// Extract the JSON payload from a chat completions response body
fn parse_completion(body: &str) -> Result<Value, LlmError> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("Response has no choices".to_string()))?;

    if let Some(refusal) = choice.message.refusal.filter(|r| !r.is_empty()) {
        return Err(LlmError::Refusal(refusal));
    }

    let content = choice.message.content.unwrap_or_default();
    if content.trim().is_empty() {
        return Err(LlmError::InvalidResponse(format!(
            "Response has no content (finish reason: {})",
            choice.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    serde_json::from_str(&content).map_err(|e| {
        LlmError::SchemaViolation(format!("Content is not valid JSON: {}", e))
    })
}

/// Map a non-success response to an `Api` error, preferring the provider's message
fn api_error(status: u16, body: &str) -> LlmError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no error message".to_string()
            } else {
                trimmed.to_string()
            }
        });

    LlmError::Api { status, message }
}
