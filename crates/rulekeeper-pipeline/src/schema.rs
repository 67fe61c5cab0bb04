//! Response schemas for the three stages
//!
//! Written for strict structured output: every object closes
//! `additionalProperties` and lists all of its properties as required.
//! Optional values are expressed as nullable types instead.

use rulekeeper_domain::{Priority, RuleId, Verdict};
use serde_json::{json, Value};

/// Schema name for extraction responses
pub const EXTRACTION_SCHEMA_NAME: &str = "policy_rules";

/// Schema name for consolidation responses
pub const CONSOLIDATION_SCHEMA_NAME: &str = "rule_edits";

/// Schema name for validation responses
pub const VALIDATION_SCHEMA_NAME: &str = "rule_validations";

fn priority_values() -> Vec<&'static str> {
    Priority::ALL.iter().map(Priority::as_str).collect()
}

/// `{"rules": [{title, body, priority, rationale, quotes}]}`
pub fn extraction_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "rules": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": {"type": "string"},
                        "body": {"type": "string"},
                        "priority": {"type": "string", "enum": priority_values()},
                        "rationale": {"type": "string"},
                        "quotes": {"type": "array", "items": {"type": "string"}}
                    },
                    "required": ["title", "body", "priority", "rationale", "quotes"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["rules"],
        "additionalProperties": false
    })
}

/// `{"edits": [{operation, ids, title, body, priority, rationale}]}`
///
/// Replacement fields are nullable because delete edits carry none.
pub fn consolidation_schema() -> Value {
    let mut nullable_priorities: Vec<Value> =
        priority_values().into_iter().map(Value::from).collect();
    nullable_priorities.push(Value::Null);

    json!({
        "type": "object",
        "properties": {
            "edits": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "operation": {"type": "string", "enum": ["delete", "merge"]},
                        "ids": {"type": "array", "items": {"type": "string"}},
                        "title": {"type": ["string", "null"]},
                        "body": {"type": ["string", "null"]},
                        "priority": {"type": ["string", "null"], "enum": nullable_priorities},
                        "rationale": {"type": ["string", "null"]}
                    },
                    "required": ["operation", "ids", "title", "body", "priority", "rationale"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["edits"],
        "additionalProperties": false
    })
}

/// `{"validations": [{rule_id, result, reason}]}`
///
/// `rule_id` is restricted to the ids of the rules under test.
pub fn validation_schema(rule_ids: &[&RuleId]) -> Value {
    let ids: Vec<&str> = rule_ids.iter().map(|id| id.as_str()).collect();
    let verdicts: Vec<&str> = Verdict::ALL.iter().map(Verdict::as_str).collect();

    json!({
        "type": "object",
        "properties": {
            "validations": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "rule_id": {"type": "string", "enum": ids},
                        "result": {"type": "string", "enum": verdicts},
                        "reason": {"type": "string"}
                    },
                    "required": ["rule_id", "result", "reason"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["validations"],
        "additionalProperties": false
    })
}
