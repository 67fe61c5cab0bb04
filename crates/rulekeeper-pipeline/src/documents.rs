//! Reading and writing the persisted JSON documents

use crate::error::PipelineError;
use rulekeeper_domain::{Rule, ValidationResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// `{"rules": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesDocument {
    /// Rules in store order
    pub rules: Vec<Rule>,
}

/// `{"validations": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationsDocument {
    /// Verdicts grouped by file
    pub validations: Vec<ValidationResult>,
}

/// Either persisted document, distinguished by its top-level key
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PersistedDocument {
    /// A rules document
    Rules(RulesDocument),
    /// A validations document
    Validations(ValidationsDocument),
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PipelineError::NotFound(path.to_path_buf()),
        _ => PipelineError::Io(e),
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        PipelineError::JsonParse(format!("{}: {}", path.display(), e))
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut contents = serde_json::to_string_pretty(value)?;
    contents.push('\n');
    fs::write(path, contents)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Read a rules document
pub fn read_rules(path: &Path) -> Result<Vec<Rule>, PipelineError> {
    read_json::<RulesDocument>(path).map(|doc| doc.rules)
}

/// Write a rules document, creating parent directories as needed
pub fn write_rules(path: &Path, rules: &[Rule]) -> Result<(), PipelineError> {
    #[derive(Serialize)]
    struct Borrowed<'a> {
        rules: &'a [Rule],
    }
    write_json(path, &Borrowed { rules })
}

/// Read a validations document
pub fn read_validations(path: &Path) -> Result<Vec<ValidationResult>, PipelineError> {
    read_json::<ValidationsDocument>(path).map(|doc| doc.validations)
}

/// Write a validations document, creating parent directories as needed
pub fn write_validations(
    path: &Path,
    validations: &[ValidationResult],
) -> Result<(), PipelineError> {
    #[derive(Serialize)]
    struct Borrowed<'a> {
        validations: &'a [ValidationResult],
    }
    write_json(path, &Borrowed { validations })
}

/// Read whichever document `path` holds
pub fn read_document(path: &Path) -> Result<PersistedDocument, PipelineError> {
    read_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulekeeper_domain::{Priority, Quote, RuleDraft, RuleId, Verdict};
    use tempfile::TempDir;

    fn rule(id: &str) -> Rule {
        Rule::from_draft(
            RuleId::new(id),
            RuleDraft {
                title: "Encrypt laptops".to_string(),
                body: "Laptops must be encrypted.".to_string(),
                priority: Priority::High,
                rationale: "Lost devices".to_string(),
            },
            vec![Quote::new("Laptops shall be encrypted.", "a.md")],
            ["a.md".to_string()].into_iter().collect(),
        )
    }

    #[test]
    fn test_rules_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("rules.json");

        write_rules(&path, &[rule("r1"), rule("r2")]).unwrap();
        let rules = read_rules(&path).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].id, RuleId::new("r2"));

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["rules"][0]["source_files"], serde_json::json!(["a.md"]));
    }

    #[test]
    fn test_legacy_rules_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.json");
        fs::write(
            &path,
            r#"{"rules": [{"id": "r1", "title": "T", "body": "B", "priority": "low",
                "rationale": "", "sources": ["quoted"], "source_file": "a.md"}]}"#,
        )
        .unwrap();

        let rules = read_rules(&path).unwrap();
        assert!(rules[0].applies_to("a.md"));
        assert_eq!(rules[0].quotes, vec![Quote::new("quoted", "a.md")]);
    }

    #[test]
    fn test_validations_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("validations.json");
        let results = vec![ValidationResult {
            rule_id: RuleId::new("r1"),
            file: "a.md".to_string(),
            result: Verdict::NotApplicable,
            reason: "Not relevant".to_string(),
        }];

        write_validations(&path, &results).unwrap();
        assert_eq!(read_validations(&path).unwrap(), results);
        assert!(fs::read_to_string(&path).unwrap().contains("\"n/a\""));
    }

    #[test]
    fn test_read_document_detects_kind() {
        let dir = TempDir::new().unwrap();
        let rules_path = dir.path().join("rules.json");
        let validations_path = dir.path().join("validations.json");
        write_rules(&rules_path, &[rule("r1")]).unwrap();
        write_validations(&validations_path, &[]).unwrap();

        assert!(matches!(
            read_document(&rules_path).unwrap(),
            PersistedDocument::Rules(_)
        ));
        assert!(matches!(
            read_document(&validations_path).unwrap(),
            PersistedDocument::Validations(_)
        ));
    }

    #[test]
    fn test_missing_and_malformed() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(read_rules(&missing), Err(PipelineError::NotFound(_))));

        let malformed = dir.path().join("bad.json");
        fs::write(&malformed, "{not json").unwrap();
        assert!(matches!(read_rules(&malformed), Err(PipelineError::JsonParse(_))));
    }
}
