//! Rule consolidation stage

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::parser::parse_edits;
use crate::prompt::PromptBuilder;
use crate::schema::{consolidation_schema, CONSOLIDATION_SCHEMA_NAME};
use crate::types::{ConsolidationResult, RunMetadata};
use rulekeeper_domain::{Edit, EditReport, LlmProvider, RuleStore, UnknownIdPolicy};
use std::fmt::Display;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// The Consolidator asks the model for merge/delete edits and applies them
pub struct Consolidator<L> {
    llm: L,
    config: PipelineConfig,
}

impl<L> Consolidator<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Create a new Consolidator
    pub fn new(llm: L, config: PipelineConfig) -> Self {
        Self { llm, config }
    }

    /// The underlying provider
    pub fn llm(&self) -> &L {
        &self.llm
    }

    /// Ask the model for edits without applying them
    ///
    /// An empty store yields no edits and makes no call.
    pub async fn propose(&self, store: &RuleStore) -> Result<Vec<Edit>, PipelineError> {
        if store.is_empty() {
            debug!("Rule store is empty, nothing to consolidate");
            return Ok(Vec::new());
        }

        let request = PromptBuilder::new(self.config.consolidation_instructions())
            .with_rules(store.rules())
            .build(CONSOLIDATION_SCHEMA_NAME, consolidation_schema());

        info!("Requesting consolidation of {} rules", store.len());
        let response = self
            .llm
            .generate_structured(&request)
            .await
            .map_err(|e| PipelineError::Api(e.to_string()))?;

        let edits = parse_edits(&response)?;
        debug!("Model proposed {} edits", edits.len());
        Ok(edits)
    }

    /// Propose edits and apply them to `store`
    ///
    /// With `UnknownIdPolicy::Reject`, an edit naming an id outside the store
    /// fails the run and leaves the store untouched.
    pub async fn consolidate(
        &self,
        store: &mut RuleStore,
        policy: UnknownIdPolicy,
    ) -> Result<ConsolidationResult, PipelineError> {
        let started = SystemTime::now();
        let rules_before = store.len();

        let proposed = self.propose(store).await?;
        let report = if proposed.is_empty() {
            EditReport::default()
        } else {
            store.apply_edits(&proposed, policy)?
        };

        if !report.unknown_ids.is_empty() {
            warn!("Ignored {} unknown rule ids in proposed edits", report.unknown_ids.len());
        }
        if report.skipped_merges > 0 {
            warn!("Skipped {} merges with no known rules", report.skipped_merges);
        }

        let result = ConsolidationResult {
            proposed,
            report,
            rules_before,
            rules_after: store.len(),
            metadata: RunMetadata::finish(self.llm.model_name(), started),
        };

        if result.report.is_noop() {
            info!("No edits applied");
        } else {
            info!(
                "Consolidation complete: {} -> {} rules ({} removed, {} merged)",
                result.rules_before,
                result.rules_after,
                result.report.deleted.len(),
                result.report.created.len()
            );
        }

        Ok(result)
    }
}
