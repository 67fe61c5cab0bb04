//! Validation verdicts

use crate::RuleId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of checking one rule against one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// The document complies with the rule
    #[serde(rename = "pass")]
    Pass,

    /// The document violates the rule
    #[serde(rename = "fail")]
    Fail,

    /// The rule does not apply to this document
    #[serde(rename = "n/a")]
    NotApplicable,

    /// Compliance could not be determined
    #[serde(rename = "unknown")]
    Unknown,
}

impl Verdict {
    /// All verdicts, in report order
    pub const ALL: [Verdict; 4] = [
        Verdict::Pass,
        Verdict::Fail,
        Verdict::NotApplicable,
        Verdict::Unknown,
    ];

    /// Get the verdict as it is serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Fail => "fail",
            Verdict::NotApplicable => "n/a",
            Verdict::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verdict for one rule against one document
///
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Rule that was checked
    #[serde(alias = "id")]
    pub rule_id: RuleId,

    /// File name of the document that was checked
    pub file: String,

    /// The verdict
    pub result: Verdict,

    /// Explanation for the verdict
    #[serde(default)]
    pub reason: String,
}
