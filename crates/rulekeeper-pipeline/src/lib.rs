//! Rulekeeper Pipeline
//!
//! Loads policy documents, asks a model for structured output, and turns the
//! answers into rules, edits and verdicts.
//!
//! # Architecture
//!
//! ```text
//! Files → Loader → Prompt + Schema → LlmProvider → Parser → RuleStore
//! ```
//!
//! # Stages
//!
//! - **Extraction**: every file yields rules stamped with the file's name
//! - **Consolidation**: the model proposes merge/delete edits over the whole
//!   rule set, which the store applies in one pass
//! - **Validation**: every file is checked against the rules that came from it
//!
//! Files are processed one at a time. A file that fails is reported and the
//! run moves on.
//!
//! # Example Usage
//!
//! ```no_run
//! use rulekeeper_domain::RuleStore;
//! use rulekeeper_llm::MockProvider;
//! use rulekeeper_pipeline::{Extractor, PipelineConfig};
//! use serde_json::json;
//! use std::path::PathBuf;
//!
//! # async fn example() {
//! let llm = MockProvider::new(json!({"rules": []}));
//! let extractor = Extractor::new(llm, PipelineConfig::default());
//!
//! let mut store = RuleStore::new();
//! let result = extractor
//!     .extract_files(&[PathBuf::from("policy.pdf")], &mut store)
//!     .await;
//!
//! println!("Extracted: {} rules", result.total_rules());
//! println!("Failures: {} files", result.failures.len());
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod config;
mod types;
mod prompt;
mod schema;
mod parser;
mod loader;
mod documents;
mod extractor;
mod consolidator;
mod validator;


pub use error::PipelineError;
pub use config::{PipelineConfig, DEFAULT_MAX_DOCUMENT_BYTES};
pub use types::{
    ConsolidationResult, ExtractionResult, FileExtraction, FileFailure, RunMetadata,
    ValidationReport, VerdictCounts,
};
pub use loader::{file_name, load_document, LoadedDocument};
pub use documents::{
    read_document, read_rules, read_validations, write_rules, write_validations,
    PersistedDocument, RulesDocument, ValidationsDocument,
};
pub use prompt::{
    PromptBuilder, CONSOLIDATION_INSTRUCTIONS, EXTRACTION_INSTRUCTIONS, VALIDATION_INSTRUCTIONS,
};
pub use schema::{consolidation_schema, extraction_schema, validation_schema};
pub use parser::{parse_edits, parse_extraction, parse_verdicts, RawVerdict};
pub use extractor::Extractor;
pub use consolidator::Consolidator;
pub use validator::{FileValidation, Validator};
