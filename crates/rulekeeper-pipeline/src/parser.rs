//! Parse structured LLM output into domain values
//!
//! Responses have already been checked against their schema by the provider,
//! so a wrong top-level shape is an error. Individual items that are unusable
//! (empty text, merges with a single id) are skipped with a warning.

use crate::error::PipelineError;
use rulekeeper_domain::{Edit, Priority, RuleCandidate, RuleDraft, RuleId, Verdict};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct ExtractedRule {
    title: String,
    body: String,
    priority: Priority,
    #[serde(default)]
    rationale: String,
    #[serde(default)]
    quotes: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Operation {
    Delete,
    Merge,
}

#[derive(Debug, Deserialize)]
struct ProposedEdit {
    operation: Operation,
    ids: Vec<RuleId>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    priority: Option<Priority>,
    #[serde(default)]
    rationale: Option<String>,
}

/// A verdict as returned by the model, before it is tied to a file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawVerdict {
    /// Rule the verdict is for
    pub rule_id: RuleId,
    /// The verdict
    pub result: Verdict,
    /// Why
    #[serde(default)]
    pub reason: String,
}

fn items<'a>(response: &'a Value, key: &str) -> Result<&'a [Value], PipelineError> {
    response
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| PipelineError::InvalidFormat(format!("Expected '{}' array", key)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse an extraction response: `{"rules": [...]}`
pub fn parse_extraction(response: &Value) -> Result<Vec<RuleCandidate>, PipelineError> {
    let mut candidates = Vec::new();

    for (idx, item) in items(response, "rules")?.iter().enumerate() {
        let rule: ExtractedRule = match serde_json::from_value(item.clone()) {
            Ok(rule) => rule,
            Err(e) => {
                warn!("Failed to parse rule {}: {}", idx, e);
                continue;
            }
        };

        let (Some(title), Some(body)) = (non_empty(Some(rule.title)), non_empty(Some(rule.body)))
        else {
            warn!("Rule {} has an empty title or body, skipping", idx);
            continue;
        };

        let quotes = rule
            .quotes
            .into_iter()
            .filter(|q| !q.trim().is_empty())
            .collect();

        candidates.push(RuleCandidate {
            draft: RuleDraft {
                title,
                body,
                priority: rule.priority,
                rationale: rule.rationale.trim().to_string(),
            },
            quotes,
        });
    }

    Ok(candidates)
}

/// Parse a consolidation response: `{"edits": [...]}`
pub fn parse_edits(response: &Value) -> Result<Vec<Edit>, PipelineError> {
    let mut edits = Vec::new();

    for (idx, item) in items(response, "edits")?.iter().enumerate() {
        let proposed: ProposedEdit = match serde_json::from_value(item.clone()) {
            Ok(edit) => edit,
            Err(e) => {
                warn!("Failed to parse edit {}: {}", idx, e);
                continue;
            }
        };

        if proposed.ids.is_empty() {
            warn!("Edit {} references no rules, skipping", idx);
            continue;
        }

        match proposed.operation {
            Operation::Delete => edits.push(Edit::Delete { ids: proposed.ids }),
            Operation::Merge => {
                if proposed.ids.len() < 2 {
                    warn!("Merge {} names fewer than two rules, skipping", idx);
                    continue;
                }
                let (Some(title), Some(body)) =
                    (non_empty(proposed.title), non_empty(proposed.body))
                else {
                    warn!("Merge {} has no replacement title or body, skipping", idx);
                    continue;
                };
                edits.push(Edit::Merge {
                    ids: proposed.ids,
                    replacement: RuleDraft {
                        title,
                        body,
                        priority: proposed.priority.unwrap_or_default(),
                        rationale: non_empty(proposed.rationale).unwrap_or_default(),
                    },
                });
            }
        }
    }

    Ok(edits)
}

/// Parse a validation response: `{"validations": [...]}`
pub fn parse_verdicts(response: &Value) -> Result<Vec<RawVerdict>, PipelineError> {
    let mut verdicts = Vec::new();

    for (idx, item) in items(response, "validations")?.iter().enumerate() {
        match serde_json::from_value::<RawVerdict>(item.clone()) {
            Ok(verdict) => verdicts.push(verdict),
            Err(e) => warn!("Failed to parse verdict {}: {}", idx, e),
        }
    }

    Ok(verdicts)
}
