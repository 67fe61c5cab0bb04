//! Edits proposed by the consolidation stage

use crate::{RuleDraft, RuleId};
use serde::{Deserialize, Serialize};

/// A proposed change to the rule store
///
/// Edits are transient: they are produced by an external consolidation
/// judgment, applied once, and never persisted alongside the rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum Edit {
    /// Remove the listed rules
    Delete {
        /// Rules to remove
        ids: Vec<RuleId>,
    },

    /// Replace the listed rules with one new rule
    Merge {
        /// Rules to combine (at least two)
        ids: Vec<RuleId>,

        /// Content of the replacement rule
        #[serde(flatten)]
        replacement: RuleDraft,
    },
}

impl Edit {
    /// Ids referenced by this edit
    pub fn ids(&self) -> &[RuleId] {
        match self {
            Edit::Delete { ids } | Edit::Merge { ids, .. } => ids,
        }
    }

    /// Name of the operation, as serialized
    pub fn operation(&self) -> &'static str {
        match self {
            Edit::Delete { .. } => "delete",
            Edit::Merge { .. } => "merge",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Priority;

    #[test]
    fn test_delete_serialization() {
        let edit = Edit::Delete {
            ids: vec![RuleId::new("r1"), RuleId::new("r2")],
        };
        let json = serde_json::to_value(&edit).unwrap();
        assert_eq!(json, serde_json::json!({"operation": "delete", "ids": ["r1", "r2"]}));
    }

    #[test]
    fn test_merge_serialization_flattens_replacement() {
        let edit = Edit::Merge {
            ids: vec![RuleId::new("r1"), RuleId::new("r2")],
            replacement: RuleDraft {
                title: "Combined".to_string(),
                body: "Body".to_string(),
                priority: Priority::Low,
                rationale: "Same requirement".to_string(),
            },
        };
        let json = serde_json::to_value(&edit).unwrap();
        assert_eq!(json["operation"], "merge");
        assert_eq!(json["title"], "Combined");
        assert_eq!(json["priority"], "low");

        let parsed: Edit = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, edit);
        assert_eq!(parsed.ids().len(), 2);
        assert_eq!(parsed.operation(), "merge");
    }
}
