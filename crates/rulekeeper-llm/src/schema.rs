//! Local JSON-schema enforcement
//!
//! Providers are asked for strict structured output, but a response is only
//! handed back to callers after it has been checked here as well.

use crate::LlmError;
use jsonschema::Draft;
use serde_json::Value;

/// Maximum number of violations quoted in a `SchemaViolation` message
const MAX_REPORTED_ERRORS: usize = 5;

/// Check `instance` against `schema`
///
/// # Errors
///
/// - `InvalidSchema` if the schema does not compile
/// - `SchemaViolation` listing the first few violations otherwise
pub fn check(schema: &Value, instance: &Value) -> Result<(), LlmError> {
    let validator = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(schema)
        .map_err(|e| LlmError::InvalidSchema(e.to_string()))?;

    let errors: Vec<String> = validator
        .iter_errors(instance)
        .take(MAX_REPORTED_ERRORS)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(LlmError::SchemaViolation(errors.join("; ")))
    }
}
