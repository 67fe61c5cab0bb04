//! Configuration for the pipeline stages

use crate::prompt::{
    CONSOLIDATION_INSTRUCTIONS, EXTRACTION_INSTRUCTIONS, VALIDATION_INSTRUCTIONS,
};
use serde::{Deserialize, Serialize};

/// Default document size limit: 20 MiB
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 20 * 1024 * 1024;

/// Configuration shared by the extract, consolidate and validate stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum size of a single input document (bytes)
    pub max_document_bytes: u64,

    /// Replacement system instructions for extraction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_prompt: Option<String>,

    /// Replacement system instructions for consolidation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consolidation_prompt: Option<String>,

    /// Replacement system instructions for validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_prompt: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            extraction_prompt: None,
            consolidation_prompt: None,
            validation_prompt: None,
        }
    }
}

impl PipelineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_document_bytes == 0 {
            return Err("max_document_bytes must be greater than 0".to_string());
        }
        let prompts = [
            ("extraction_prompt", &self.extraction_prompt),
            ("consolidation_prompt", &self.consolidation_prompt),
            ("validation_prompt", &self.validation_prompt),
        ];
        for (name, prompt) in prompts {
            if matches!(prompt, Some(p) if p.trim().is_empty()) {
                return Err(format!("{} must not be empty when set", name));
            }
        }
        Ok(())
    }

    /// Replace the extraction instructions
    pub fn with_extraction_prompt(mut self, prompt: Option<String>) -> Self {
        self.extraction_prompt = prompt;
        self
    }

    /// Replace the consolidation instructions
    pub fn with_consolidation_prompt(mut self, prompt: Option<String>) -> Self {
        self.consolidation_prompt = prompt;
        self
    }

    /// Replace the validation instructions
    pub fn with_validation_prompt(mut self, prompt: Option<String>) -> Self {
        self.validation_prompt = prompt;
        self
    }

    /// System instructions for extraction
    pub fn extraction_instructions(&self) -> &str {
        self.extraction_prompt
            .as_deref()
            .unwrap_or(EXTRACTION_INSTRUCTIONS)
    }

    /// System instructions for consolidation
    pub fn consolidation_instructions(&self) -> &str {
        self.consolidation_prompt
            .as_deref()
            .unwrap_or(CONSOLIDATION_INSTRUCTIONS)
    }

    /// System instructions for validation
    pub fn validation_instructions(&self) -> &str {
        self.validation_prompt
            .as_deref()
            .unwrap_or(VALIDATION_INSTRUCTIONS)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
