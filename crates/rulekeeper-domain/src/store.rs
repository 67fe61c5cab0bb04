//! Rule store and reconciliation
//!
//! The `RuleStore` is the single authoritative rule collection for a run.
//! Extraction appends to it file by file; consolidation applies the edit list
//! proposed by the model in one pass.
//!
//! # Applying edits
//!
//! 1. Every rule referenced by any `delete` or `merge` edit is removed.
//! 2. Each `merge` edit appends one replacement rule with a fresh id. Its
//!    source files are the union of the merged rules' source files and its
//!    quotes are their concatenation, in the order the edit lists the ids.
//!
//! Merge inputs are read from the collection as it was before the edits, so
//! a rule named by two edits contributes to both.

use crate::{Edit, Quote, Rule, RuleDraft, RuleId};
use std::collections::{BTreeSet, HashMap, HashSet};
use thiserror::Error;

/// What to do when an edit references an id that is not in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownIdPolicy {
    /// Skip unknown ids and report them
    #[default]
    Ignore,

    /// Fail without modifying the store
    Reject,
}

/// Errors raised while reconciling edits
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// Edits referenced ids that are not in the store
    #[error("Unknown rule ids: {}", join_ids(.0))]
    UnknownRuleIds(Vec<RuleId>),
}

fn join_ids(ids: &[RuleId]) -> String {
    ids.iter()
        .map(RuleId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Outcome of applying an edit list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditReport {
    /// Ids removed from the store (by delete or merge), in store order
    pub deleted: Vec<RuleId>,

    /// Ids of the replacement rules created by merges, in edit order
    pub created: Vec<RuleId>,

    /// Referenced ids that were not in the store
    pub unknown_ids: Vec<RuleId>,

    /// Merge edits that referenced no known rule and produced nothing
    pub skipped_merges: usize,
}

impl EditReport {
    /// True when the store was left unchanged
    pub fn is_noop(&self) -> bool {
        self.deleted.is_empty() && self.created.is_empty()
    }
}

/// A rule as returned by extraction, before it has an id or provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCandidate {
    /// Authored content
    pub draft: RuleDraft,

    /// Supporting excerpts from the source document
    pub quotes: Vec<String>,
}

/// Insertion-ordered rule collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleStore {
    rules: Vec<Rule>,
}

impl RuleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `rules` in the given order
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// All rules, in insertion order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Consume the store, returning its rules
    pub fn into_rules(self) -> Vec<Rule> {
        self.rules
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when the store holds no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up a rule by id
    pub fn get(&self, id: &RuleId) -> Option<&Rule> {
        self.rules.iter().find(|r| &r.id == id)
    }

    /// Whether a rule with `id` exists
    pub fn contains(&self, id: &RuleId) -> bool {
        self.get(id).is_some()
    }

    /// Every file name any rule originated from
    pub fn source_files(&self) -> BTreeSet<&str> {
        self.rules
            .iter()
            .flat_map(|r| r.source_files.iter().map(String::as_str))
            .collect()
    }

    /// Append rules extracted from `file_name`
    ///
    /// Each candidate gets a fresh id, `file_name` as its only source file,
    /// and every quote tied to `file_name`. Returns the new ids in order.
    pub fn append_extracted(
        &mut self,
        file_name: &str,
        candidates: Vec<RuleCandidate>,
    ) -> Vec<RuleId> {
        let mut ids = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let id = RuleId::generate();
            let quotes = candidate
                .quotes
                .into_iter()
                .map(|text| Quote::new(text, file_name))
                .collect();
            let source_files = std::iter::once(file_name.to_string()).collect();
            self.rules
                .push(Rule::from_draft(id.clone(), candidate.draft, quotes, source_files));
            ids.push(id);
        }
        ids
    }

    /// Apply a consolidation edit list
    ///
    /// An empty list leaves the store untouched and returns a no-op report.
    pub fn apply_edits(
        &mut self,
        edits: &[Edit],
        policy: UnknownIdPolicy,
    ) -> Result<EditReport, ReconcileError> {
        let known: HashSet<&RuleId> = self.rules.iter().map(|r| &r.id).collect();
        let mut unknown_ids: Vec<RuleId> = Vec::new();
        for id in edits.iter().flat_map(Edit::ids) {
            if !known.contains(id) && !unknown_ids.contains(id) {
                unknown_ids.push(id.clone());
            }
        }

        if policy == UnknownIdPolicy::Reject && !unknown_ids.is_empty() {
            return Err(ReconcileError::UnknownRuleIds(unknown_ids));
        }

        let mut report = EditReport {
            unknown_ids,
            ..EditReport::default()
        };
        if edits.is_empty() {
            return Ok(report);
        }

        let doomed: HashSet<&RuleId> = edits.iter().flat_map(Edit::ids).collect();
        let (removed, kept): (Vec<Rule>, Vec<Rule>) = std::mem::take(&mut self.rules)
            .into_iter()
            .partition(|r| doomed.contains(&r.id));
        self.rules = kept;
        report.deleted = removed.iter().map(|r| r.id.clone()).collect();

        let mut previous: HashMap<&RuleId, &Rule> = HashMap::new();
        for rule in &removed {
            previous.entry(&rule.id).or_insert(rule);
        }

        for edit in edits {
            let Edit::Merge { ids, replacement } = edit else {
                continue;
            };

            let mut seen = HashSet::new();
            let merged: Vec<&Rule> = ids
                .iter()
                .filter(|id| seen.insert(*id))
                .filter_map(|id| previous.get(id).copied())
                .collect();
            if merged.is_empty() {
                report.skipped_merges += 1;
                continue;
            }

            let source_files = merged
                .iter()
                .flat_map(|r| r.source_files.iter().cloned())
                .collect();
            let quotes = merged.iter().flat_map(|r| r.quotes.iter().cloned()).collect();

            let id = RuleId::generate();
            self.rules.push(Rule::from_draft(
                id.clone(),
                replacement.clone(),
                quotes,
                source_files,
            ));
            report.created.push(id);
        }

        Ok(report)
    }

    /// Rules whose source files include `file_name` (exact match)
    pub fn applicable_to(&self, file_name: &str) -> Vec<&Rule> {
        self.rules.iter().filter(|r| r.applies_to(file_name)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Priority;

    fn draft(title: &str) -> RuleDraft {
        RuleDraft {
            title: title.to_string(),
            body: format!("{} body", title),
            priority: Priority::Medium,
            rationale: format!("{} rationale", title),
        }
    }

    fn rule(id: &str, files: &[&str], quotes: &[&str]) -> Rule {
        Rule::from_draft(
            RuleId::new(id),
            draft(id),
            quotes.iter().map(|q| Quote::new(*q, files[0])).collect(),
            files.iter().map(|f| f.to_string()).collect(),
        )
    }

    fn sample_store() -> RuleStore {
        RuleStore::from_rules(vec![
            rule("r1", &["a.md"], &["a-quote"]),
            rule("r2", &["b.md"], &["b-quote"]),
            rule("r3", &["c.md"], &["c-quote-1", "c-quote-2"]),
        ])
    }

    fn ids(store: &RuleStore) -> Vec<&str> {
        store.rules().iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_append_extracted_stamps_file() {
        let mut store = RuleStore::new();
        let new_ids = store.append_extracted(
            "policy.pdf",
            vec![RuleCandidate {
                draft: draft("Encrypt"),
                quotes: vec!["must be encrypted".to_string()],
            }],
        );

        assert_eq!(new_ids.len(), 1);
        let rule = store.get(&new_ids[0]).unwrap();
        assert!(rule.applies_to("policy.pdf"));
        assert_eq!(rule.source_files.len(), 1);
        assert_eq!(rule.quotes, vec![Quote::new("must be encrypted", "policy.pdf")]);
    }

    #[test]
    fn test_append_extracted_accumulates_across_files() {
        let mut store = RuleStore::new();
        store.append_extracted("a.md", vec![RuleCandidate { draft: draft("A"), quotes: vec![] }]);
        store.append_extracted(
            "b.md",
            vec![
                RuleCandidate { draft: draft("B1"), quotes: vec![] },
                RuleCandidate { draft: draft("B2"), quotes: vec![] },
            ],
        );

        assert_eq!(store.len(), 3);
        assert_eq!(store.rules()[0].title, "A");
        assert_eq!(store.applicable_to("b.md").len(), 2);
        assert_eq!(store.source_files().into_iter().collect::<Vec<_>>(), vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_empty_edit_list_is_noop() {
        let mut store = sample_store();
        let before = store.clone();

        let report = store.apply_edits(&[], UnknownIdPolicy::Ignore).unwrap();

        assert!(report.is_noop());
        assert_eq!(store, before);
    }

    #[test]
    fn test_delete_removes_only_listed_ids() {
        let mut store = sample_store();
        let untouched = store.get(&RuleId::new("r3")).unwrap().clone();

        let report = store
            .apply_edits(
                &[Edit::Delete { ids: vec![RuleId::new("r1"), RuleId::new("r2")] }],
                UnknownIdPolicy::Ignore,
            )
            .unwrap();

        assert_eq!(ids(&store), vec!["r3"]);
        assert_eq!(store.get(&RuleId::new("r3")), Some(&untouched));
        assert_eq!(report.deleted, vec![RuleId::new("r1"), RuleId::new("r2")]);
        assert!(report.created.is_empty());
    }

    #[test]
    fn test_merge_unions_sources_and_concatenates_quotes() {
        let mut store = sample_store();
        let report = store
            .apply_edits(
                &[Edit::Merge {
                    ids: vec![RuleId::new("r3"), RuleId::new("r1")],
                    replacement: draft("Merged"),
                }],
                UnknownIdPolicy::Ignore,
            )
            .unwrap();

        assert_eq!(report.created.len(), 1);
        assert!(store.get(&RuleId::new("r1")).is_none());
        assert!(store.get(&RuleId::new("r3")).is_none());

        let merged = store.get(&report.created[0]).unwrap();
        assert_eq!(merged.title, "Merged");
        assert_eq!(
            merged.source_files,
            ["a.md", "c.md"].iter().map(|s| s.to_string()).collect()
        );
        let quote_texts: Vec<&str> = merged.quotes.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(quote_texts, vec!["c-quote-1", "c-quote-2", "a-quote"]);

        // Merged rules are appended after the survivors
        assert_eq!(store.rules()[0].id.as_str(), "r2");
        assert_eq!(store.rules()[1].id, report.created[0]);
    }

    #[test]
    fn test_unknown_ids_are_ignored_by_default() {
        let mut store = sample_store();
        let report = store
            .apply_edits(
                &[Edit::Delete { ids: vec![RuleId::new("r1"), RuleId::new("ghost")] }],
                UnknownIdPolicy::Ignore,
            )
            .unwrap();

        assert_eq!(ids(&store), vec!["r2", "r3"]);
        assert_eq!(report.unknown_ids, vec![RuleId::new("ghost")]);
    }

    #[test]
    fn test_unknown_ids_rejected_leaves_store_untouched() {
        let mut store = sample_store();
        let before = store.clone();

        let result = store.apply_edits(
            &[
                Edit::Delete { ids: vec![RuleId::new("r1")] },
                Edit::Merge {
                    ids: vec![RuleId::new("r2"), RuleId::new("ghost")],
                    replacement: draft("Merged"),
                },
            ],
            UnknownIdPolicy::Reject,
        );

        assert_eq!(
            result,
            Err(ReconcileError::UnknownRuleIds(vec![RuleId::new("ghost")]))
        );
        assert_eq!(store, before);
    }

    #[test]
    fn test_merge_of_only_unknown_ids_is_skipped() {
        let mut store = sample_store();
        let report = store
            .apply_edits(
                &[Edit::Merge {
                    ids: vec![RuleId::new("x"), RuleId::new("y")],
                    replacement: draft("Nothing"),
                }],
                UnknownIdPolicy::Ignore,
            )
            .unwrap();

        assert_eq!(report.skipped_merges, 1);
        assert!(report.is_noop());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_rule_in_two_merges_contributes_to_both() {
        let mut store = sample_store();
        let report = store
            .apply_edits(
                &[
                    Edit::Merge {
                        ids: vec![RuleId::new("r1"), RuleId::new("r2")],
                        replacement: draft("First"),
                    },
                    Edit::Merge {
                        ids: vec![RuleId::new("r2"), RuleId::new("r3")],
                        replacement: draft("Second"),
                    },
                ],
                UnknownIdPolicy::Ignore,
            )
            .unwrap();

        assert_eq!(report.deleted.len(), 3);
        assert_eq!(report.created.len(), 2);
        let second = store.get(&report.created[1]).unwrap();
        assert!(second.applies_to("b.md"));
        assert!(second.applies_to("c.md"));
        assert!(!second.applies_to("a.md"));
    }

    #[test]
    fn test_duplicate_ids_in_merge_do_not_duplicate_quotes() {
        let mut store = sample_store();
        let report = store
            .apply_edits(
                &[Edit::Merge {
                    ids: vec![RuleId::new("r1"), RuleId::new("r1"), RuleId::new("r2")],
                    replacement: draft("Merged"),
                }],
                UnknownIdPolicy::Ignore,
            )
            .unwrap();

        let merged = store.get(&report.created[0]).unwrap();
        assert_eq!(merged.quotes.len(), 2);
    }

    #[test]
    fn test_applicable_to_matches_example() {
        let store = RuleStore::from_rules(vec![
            rule("r1", &["a.md"], &[]),
            rule("r2", &["b.md"], &[]),
        ]);

        let applicable: Vec<&str> = store
            .applicable_to("a.md")
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(applicable, vec!["r1"]);
        assert!(store.applicable_to("c.md").is_empty());
    }
}
