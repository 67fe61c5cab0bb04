//! Result types for the pipeline stages

use rulekeeper_domain::{Edit, EditReport, RuleId, ValidationResult, Verdict};
use std::time::{SystemTime, UNIX_EPOCH};

/// A file whose processing was abandoned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// File name (or path, if it had no name)
    pub file: String,

    /// Why it failed
    pub reason: String,
}

/// Metadata about a stage run
#[derive(Debug, Clone)]
pub struct RunMetadata {
    /// Name of the LLM model used
    pub model_name: String,

    /// Unix timestamp (seconds) when the run finished
    pub timestamp: u64,

    /// Total processing time in milliseconds
    pub processing_time_ms: u64,
}

impl RunMetadata {
    pub(crate) fn finish(model_name: &str, started: SystemTime) -> Self {
        let processing_time_ms = started
            .elapsed()
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            model_name: model_name.to_string(),
            timestamp,
            processing_time_ms,
        }
    }
}

/// Rules extracted from one file
#[derive(Debug, Clone)]
pub struct FileExtraction {
    /// File name stamped on the rules
    pub file: String,

    /// Ids of the rules appended to the store
    pub rule_ids: Vec<RuleId>,
}

/// Result of an extraction run
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Files that succeeded, in processing order
    pub extracted: Vec<FileExtraction>,

    /// Files that were skipped
    pub failures: Vec<FileFailure>,

    /// Metadata about the run
    pub metadata: RunMetadata,
}

impl ExtractionResult {
    /// Number of rules appended across all files
    pub fn total_rules(&self) -> usize {
        self.extracted.iter().map(|f| f.rule_ids.len()).sum()
    }
}

/// Result of a consolidation run
#[derive(Debug, Clone)]
pub struct ConsolidationResult {
    /// Edits proposed by the model, as parsed
    pub proposed: Vec<Edit>,

    /// What applying them did
    pub report: EditReport,

    /// Rule count before the edits
    pub rules_before: usize,

    /// Rule count after the edits
    pub rules_after: usize,

    /// Metadata about the run
    pub metadata: RunMetadata,
}

/// Verdict tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerdictCounts {
    /// `pass` verdicts
    pub pass: usize,
    /// `fail` verdicts
    pub fail: usize,
    /// `n/a` verdicts
    pub not_applicable: usize,
    /// `unknown` verdicts
    pub unknown: usize,
}

impl VerdictCounts {
    /// Tally a set of results
    pub fn tally<'a>(results: impl IntoIterator<Item = &'a ValidationResult>) -> Self {
        let mut counts = Self::default();
        for result in results {
            match result.result {
                Verdict::Pass => counts.pass += 1,
                Verdict::Fail => counts.fail += 1,
                Verdict::NotApplicable => counts.not_applicable += 1,
                Verdict::Unknown => counts.unknown += 1,
            }
        }
        counts
    }

    /// Total number of verdicts
    pub fn total(&self) -> usize {
        self.pass + self.fail + self.not_applicable + self.unknown
    }
}

/// Result of a validation run
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// All verdicts, grouped by file in processing order
    pub validations: Vec<ValidationResult>,

    /// Files that produced verdicts
    pub validated: Vec<String>,

    /// Files skipped because no rule originated from them
    pub skipped: Vec<String>,

    /// Files whose validation was abandoned
    pub failures: Vec<FileFailure>,

    /// Metadata about the run
    pub metadata: RunMetadata,
}

impl ValidationReport {
    /// Tallies across all files
    pub fn counts(&self) -> VerdictCounts {
        VerdictCounts::tally(&self.validations)
    }

    /// Tallies for one file
    pub fn counts_for(&self, file: &str) -> VerdictCounts {
        VerdictCounts::tally(self.validations.iter().filter(|v| v.file == file))
    }
}
