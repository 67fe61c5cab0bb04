//! Rule module - the fundamental unit of a policy rule set

use crate::Priority;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Unique identifier for a rule
///
/// Freshly generated ids are UUIDv7 strings:
/// - Chronologically sortable, so extraction order survives a round-trip
/// - No coordination required, so ids from separate runs never collide
///
/// Ids read back from a rules document are kept verbatim, whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    /// Generate a new UUIDv7-based RuleId
    ///
    /// # Examples
    ///
    /// ```
    /// use rulekeeper_domain::RuleId;
    ///
    /// let a = RuleId::generate();
    /// let b = RuleId::generate();
    /// assert_ne!(a, b);
    /// assert_eq!(a.as_str().len(), 36);
    /// ```
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Wrap an existing identifier
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RuleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A verbatim excerpt supporting a rule, tied to the document it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Excerpt text
    pub text: String,

    /// File name of the document the excerpt was taken from
    pub source_file: String,
}

impl Quote {
    /// Create a new quote
    pub fn new(text: impl Into<String>, source_file: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_file: source_file.into(),
        }
    }
}

/// The authored content of a rule, without identity or provenance
///
/// This is what the model produces for a merge edit and what extraction
/// candidates carry before they are stamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDraft {
    /// Short title
    pub title: String,

    /// The testable statement itself
    pub body: String,

    /// How much the rule matters
    pub priority: Priority,

    /// Why the rule exists
    pub rationale: String,
}

/// A policy rule
///
/// Rules are created during extraction and only change during consolidation,
/// where merges replace several rules with one new rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRule")]
pub struct Rule {
    /// Unique identifier
    pub id: RuleId,

    /// Short title
    pub title: String,

    /// The testable statement itself
    pub body: String,

    /// How much the rule matters
    pub priority: Priority,

    /// Why the rule exists
    pub rationale: String,

    /// Supporting excerpts
    pub quotes: Vec<Quote>,

    /// File names of the documents this rule originated from (never empty)
    pub source_files: BTreeSet<String>,
}

impl Rule {
    /// Create a rule from a draft
    pub fn from_draft(
        id: RuleId,
        draft: RuleDraft,
        quotes: Vec<Quote>,
        source_files: BTreeSet<String>,
    ) -> Self {
        Self {
            id,
            title: draft.title,
            body: draft.body,
            priority: draft.priority,
            rationale: draft.rationale,
            quotes,
            source_files,
        }
    }

    /// Whether the rule originated from `file_name`
    pub fn applies_to(&self, file_name: &str) -> bool {
        self.source_files.contains(file_name)
    }
}

/// Wire shape accepted when reading rules back from disk
///
/// Older documents carry a single `source_file` string and bare-string quotes.
#[derive(Deserialize)]
struct RawRule {
    id: RuleId,
    title: String,
    body: String,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    rationale: String,
    #[serde(default, alias = "sources")]
    quotes: Vec<RawQuote>,
    #[serde(default, alias = "source_file")]
    source_files: OneOrMany,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuote {
    Tied(Quote),
    Bare(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl TryFrom<RawRule> for Rule {
    type Error = String;

    fn try_from(raw: RawRule) -> Result<Self, Self::Error> {
        let source_files: BTreeSet<String> = match raw.source_files {
            OneOrMany::One(file) => std::iter::once(file).collect(),
            OneOrMany::Many(files) => files.into_iter().collect(),
        };
        let source_files: BTreeSet<String> = source_files
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();

        let Some(first_source) = source_files.iter().next().cloned() else {
            return Err(format!("rule '{}' has no source files", raw.id));
        };

        let quotes = raw
            .quotes
            .into_iter()
            .map(|q| match q {
                RawQuote::Tied(quote) => quote,
                RawQuote::Bare(text) => Quote::new(text, first_source.clone()),
            })
            .collect();

        Ok(Rule {
            id: raw.id,
            title: raw.title,
            body: raw.body,
            priority: raw.priority,
            rationale: raw.rationale,
            quotes,
            source_files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> RuleDraft {
        RuleDraft {
            title: "Encrypt backups".to_string(),
            body: "All backups must be encrypted at rest.".to_string(),
            priority: Priority::High,
            rationale: "Backups contain customer data.".to_string(),
        }
    }

    #[test]
    fn test_rule_id_generate_is_unique() {
        let ids: BTreeSet<RuleId> = (0..100).map(|_| RuleId::generate()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_rule_id_generate_is_chronological() {
        let id1 = RuleId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = RuleId::generate();
        assert!(id1 < id2, "Earlier UUIDv7 should sort before later UUIDv7");
    }

    #[test]
    fn test_rule_serializes_source_files_as_list() {
        let rule = Rule::from_draft(
            RuleId::new("r1"),
            draft(),
            vec![Quote::new("backups are encrypted", "a.md")],
            ["a.md".to_string()].into_iter().collect(),
        );

        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["id"], "r1");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["source_files"], serde_json::json!(["a.md"]));
        assert_eq!(json["quotes"][0]["source_file"], "a.md");

        let parsed: Rule = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, rule);
    }

    #[test]
    fn test_rule_accepts_legacy_single_source_file() {
        let json = r#"{
            "id": "r1",
            "title": "Encrypt backups",
            "body": "All backups must be encrypted.",
            "priority": "medium",
            "rationale": "",
            "quotes": ["backups are encrypted"],
            "source_file": "a.md"
        }"#;

        let rule: Rule = serde_json::from_str(json).unwrap();
        assert!(rule.applies_to("a.md"));
        assert_eq!(rule.quotes, vec![Quote::new("backups are encrypted", "a.md")]);
    }

    #[test]
    fn test_rule_without_source_files_is_rejected() {
        let json = r#"{"id": "r1", "title": "t", "body": "b"}"#;
        let result: Result<Rule, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_applies_to_is_exact_membership() {
        let json = r#"{"id": "r1", "title": "t", "body": "b", "source_files": ["policy-a.md"]}"#;
        let rule: Rule = serde_json::from_str(json).unwrap();

        assert!(rule.applies_to("policy-a.md"));
        assert!(!rule.applies_to("a.md"));
        assert!(!rule.applies_to("policy-a"));
    }
}
