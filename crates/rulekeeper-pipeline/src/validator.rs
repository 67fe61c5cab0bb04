//! Validation stage
//!
//! Each document is checked only against the rules that originated from it.
//! Documents no rule came from are skipped without a model call.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::loader::{file_name, load_document};
use crate::parser::{parse_verdicts, RawVerdict};
use crate::prompt::PromptBuilder;
use crate::schema::{validation_schema, VALIDATION_SCHEMA_NAME};
use crate::types::{FileFailure, RunMetadata, ValidationReport};
use rulekeeper_domain::{LlmProvider, Rule, RuleId, RuleStore, ValidationResult, Verdict};
use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

const NO_VERDICT_REASON: &str = "no verdict returned";

/// Outcome for one file
#[derive(Debug, Clone, PartialEq)]
pub enum FileValidation {
    /// Verdicts for every applicable rule, in store order
    Validated(Vec<ValidationResult>),
    /// No rule originated from the file
    Skipped,
}

/// The Validator checks documents against the rules extracted from them
pub struct Validator<L> {
    llm: L,
    config: PipelineConfig,
}

impl<L> Validator<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Create a new Validator
    pub fn new(llm: L, config: PipelineConfig) -> Self {
        Self { llm, config }
    }

    /// The underlying provider
    pub fn llm(&self) -> &L {
        &self.llm
    }

    /// Validate one file against its applicable rules
    pub async fn validate_file(
        &self,
        store: &RuleStore,
        path: &Path,
    ) -> Result<FileValidation, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::NotFound(path.to_path_buf()));
        }

        let name = file_name(path);
        let applicable = store.applicable_to(&name);
        if applicable.is_empty() {
            return Ok(FileValidation::Skipped);
        }

        let document = load_document(path, self.config.max_document_bytes)?;
        let ids: Vec<&RuleId> = applicable.iter().map(|r| &r.id).collect();

        let request = PromptBuilder::new(self.config.validation_instructions())
            .with_rules(applicable.iter().copied())
            .with_document(&document)
            .build(VALIDATION_SCHEMA_NAME, validation_schema(&ids));

        debug!("Validating {} against {} rules", name, applicable.len());
        let response = self
            .llm
            .generate_structured(&request)
            .await
            .map_err(|e| PipelineError::Api(e.to_string()))?;

        let verdicts = parse_verdicts(&response)?;
        Ok(FileValidation::Validated(stamp_verdicts(&name, &applicable, verdicts)))
    }

    /// Validate each file in order
    ///
    /// Failed files are logged and recorded; the others still produce
    /// verdicts.
    pub async fn validate_files(&self, store: &RuleStore, paths: &[PathBuf]) -> ValidationReport {
        let started = SystemTime::now();
        let mut validations = Vec::new();
        let mut validated = Vec::new();
        let mut skipped = Vec::new();
        let mut failures = Vec::new();

        for (idx, path) in paths.iter().enumerate() {
            info!("Validating {} ({}/{})", path.display(), idx + 1, paths.len());
            let name = file_name(path);

            match self.validate_file(store, path).await {
                Ok(FileValidation::Validated(results)) => {
                    info!("Recorded {} verdicts for {}", results.len(), name);
                    validations.extend(results);
                    validated.push(name);
                }
                Ok(FileValidation::Skipped) => {
                    warn!("No rules originated from {}, skipping", name);
                    skipped.push(name);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    failures.push(FileFailure {
                        file: name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let report = ValidationReport {
            validations,
            validated,
            skipped,
            failures,
            metadata: RunMetadata::finish(self.llm.model_name(), started),
        };

        info!(
            "Validation complete: {} verdicts across {} files, {} skipped, {} failed",
            report.validations.len(),
            report.validated.len(),
            report.skipped.len(),
            report.failures.len()
        );

        report
    }
}

/// Tie verdicts to `file`, keeping exactly one per applicable rule
///
/// Verdicts for other ids are dropped. When a rule is answered twice the
/// first answer wins; unanswered rules get `unknown`.
fn stamp_verdicts(
    file: &str,
    applicable: &[&Rule],
    verdicts: Vec<RawVerdict>,
) -> Vec<ValidationResult> {
    let mut answers: HashMap<RuleId, RawVerdict> = HashMap::new();
    for verdict in verdicts {
        if !applicable.iter().any(|r| r.id == verdict.rule_id) {
            warn!("Dropping verdict for rule {} which does not apply to {}", verdict.rule_id, file);
            continue;
        }
        if answers.contains_key(&verdict.rule_id) {
            debug!("Ignoring repeated verdict for rule {}", verdict.rule_id);
            continue;
        }
        answers.insert(verdict.rule_id.clone(), verdict);
    }

    applicable
        .iter()
        .map(|rule| match answers.remove(&rule.id) {
            Some(answer) => ValidationResult {
                rule_id: answer.rule_id,
                file: file.to_string(),
                result: answer.result,
                reason: answer.reason,
            },
            None => {
                warn!("No verdict returned for rule {} on {}", rule.id, file);
                ValidationResult {
                    rule_id: rule.id.clone(),
                    file: file.to_string(),
                    result: Verdict::Unknown,
                    reason: NO_VERDICT_REASON.to_string(),
                }
            }
        })
        .collect()
}
