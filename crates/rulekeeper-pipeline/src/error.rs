//! Error types for the pipeline

use rulekeeper_domain::ReconcileError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running a pipeline stage
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input file does not exist
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Input file exceeds the configured size limit
    #[error("File too large: {} is {} bytes (max: {})", .path.display(), .size, .max)]
    TooLarge {
        /// Offending file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        max: u64,
    },

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider error (transport, provider status, or schema violation)
    #[error("API error: {0}")]
    Api(String),

    /// Response or document had an unexpected shape
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Edits could not be reconciled with the rule store
    #[error("Reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::JsonParse(e.to_string())
    }
}
