//! Rule extraction stage

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::loader::{file_name, load_document};
use crate::parser::parse_extraction;
use crate::prompt::PromptBuilder;
use crate::schema::{extraction_schema, EXTRACTION_SCHEMA_NAME};
use crate::types::{ExtractionResult, FileExtraction, FileFailure, RunMetadata};
use rulekeeper_domain::{LlmProvider, RuleCandidate, RuleStore};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// The Extractor turns documents into rules
pub struct Extractor<L> {
    llm: L,
    config: PipelineConfig,
}

impl<L> Extractor<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Create a new Extractor
    pub fn new(llm: L, config: PipelineConfig) -> Self {
        Self { llm, config }
    }

    /// The underlying provider
    pub fn llm(&self) -> &L {
        &self.llm
    }

    /// Extract rules from one file without touching any store
    ///
    /// Returns the file's base name with the parsed candidates.
    pub async fn extract_file(
        &self,
        path: &Path,
    ) -> Result<(String, Vec<RuleCandidate>), PipelineError> {
        let document = load_document(path, self.config.max_document_bytes)?;

        let request = PromptBuilder::new(self.config.extraction_instructions())
            .with_document(&document)
            .build(EXTRACTION_SCHEMA_NAME, extraction_schema());

        debug!("Requesting extraction for {}", document.name);
        let response = self
            .llm
            .generate_structured(&request)
            .await
            .map_err(|e| PipelineError::Api(e.to_string()))?;

        let candidates = parse_extraction(&response)?;
        debug!("Parsed {} rule candidates from {}", candidates.len(), document.name);

        Ok((document.name, candidates))
    }

    /// Extract rules from each file in order, appending them to `store`
    ///
    /// A file that fails is logged, recorded in the result and skipped; the
    /// rest are still processed.
    pub async fn extract_files(&self, paths: &[PathBuf], store: &mut RuleStore) -> ExtractionResult {
        let started = SystemTime::now();
        let mut extracted = Vec::new();
        let mut failures = Vec::new();

        for (idx, path) in paths.iter().enumerate() {
            info!("Extracting rules from {} ({}/{})", path.display(), idx + 1, paths.len());

            match self.extract_file(path).await {
                Ok((name, candidates)) => {
                    let rule_ids = store.append_extracted(&name, candidates);
                    info!("Extracted {} rules from {}", rule_ids.len(), name);
                    extracted.push(FileExtraction {
                        file: name,
                        rule_ids,
                    });
                }
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    failures.push(FileFailure {
                        file: file_name(path),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let result = ExtractionResult {
            extracted,
            failures,
            metadata: RunMetadata::finish(self.llm.model_name(), started),
        };

        info!(
            "Extraction complete: {} rules from {} files, {} failed",
            result.total_rules(),
            result.extracted.len(),
            result.failures.len()
        );

        result
    }
}
