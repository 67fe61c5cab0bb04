//! Validate command implementation.

use super::ensure_progress;
use crate::cli::ValidateArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use rulekeeper_domain::{LlmProvider, RuleStore};
use rulekeeper_pipeline::{read_rules, write_validations, PipelineConfig, Validator};
use std::fmt::Display;

/// Execute the validate command.
pub async fn execute_validate<L>(
    args: ValidateArgs,
    llm: L,
    pipeline: PipelineConfig,
    formatter: &Formatter,
) -> Result<()>
where
    L: LlmProvider,
    L::Error: Display,
{
    let store = RuleStore::from_rules(read_rules(&args.rules)?);

    let prompt = args.validation_prompt.or_else(|| pipeline.validation_prompt.clone());
    let config = pipeline.with_validation_prompt(prompt);
    config.validate().map_err(CliError::InvalidInput)?;
    let validator = Validator::new(llm, config);
    let report = validator.validate_files(&store, &args.files).await;

    ensure_progress(args.files.len(), &report.failures, formatter)?;

    write_validations(&args.output, &report.validations)?;
    println!("{}", formatter.validation_summary(&report, &args.output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use rulekeeper_domain::{Priority, Quote, Rule, RuleDraft, RuleId, Verdict};
    use rulekeeper_llm::MockProvider;
    use rulekeeper_pipeline::{read_validations, write_rules};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn rule(id: &str, file: &str) -> Rule {
        Rule::from_draft(
            RuleId::new(id),
            RuleDraft {
                title: id.to_string(),
                body: format!("{} body", id),
                priority: Priority::Medium,
                rationale: String::new(),
            },
            vec![Quote::new("q", file)],
            [file.to_string()].into_iter().collect(),
        )
    }

    #[tokio::test]
    async fn test_validate_writes_verdicts() {
        let dir = TempDir::new().unwrap();
        let rules = dir.path().join("rules.json");
        let output = dir.path().join("validations.json");
        let doc = dir.path().join("a.md");
        let other = dir.path().join("c.md");
        fs::write(&doc, "Policy").unwrap();
        fs::write(&other, "Other").unwrap();
        write_rules(&rules, &[rule("r1", "a.md"), rule("r2", "b.md")]).unwrap();

        let llm = MockProvider::new(json!({
            "validations": [{"rule_id": "r1", "result": "fail", "reason": "Missing"}]
        }));
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let args = ValidateArgs {
            files: vec![doc, other],
            rules,
            output: output.clone(),
            validation_prompt: None,
        };
        execute_validate(args, llm, PipelineConfig::default(), &formatter).await.unwrap();

        let validations = read_validations(&output).unwrap();
        assert_eq!(validations.len(), 1);
        assert_eq!(validations[0].file, "a.md");
        assert_eq!(validations[0].result, Verdict::Fail);
    }

    #[tokio::test]
    async fn test_all_files_missing() {
        let dir = TempDir::new().unwrap();
        let rules = dir.path().join("rules.json");
        write_rules(&rules, &[rule("r1", "a.md")]).unwrap();

        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let args = ValidateArgs {
            files: vec![dir.path().join("a.md")],
            rules,
            output: dir.path().join("validations.json"),
            validation_prompt: None,
        };
        let result =
            execute_validate(args, MockProvider::default(), PipelineConfig::default(), &formatter)
                .await;
        assert!(matches!(result, Err(CliError::NothingProcessed(1))));
    }

    #[tokio::test]
    async fn test_prompt_flag_overrides_config_file() {
        let dir = TempDir::new().unwrap();
        let rules = dir.path().join("rules.json");
        let doc = dir.path().join("a.md");
        fs::write(&doc, "Policy").unwrap();
        write_rules(&rules, &[rule("r1", "a.md")]).unwrap();

        let pipeline = PipelineConfig {
            validation_prompt: Some("From config.".to_string()),
            ..PipelineConfig::default()
        };
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let llm = MockProvider::new(json!({"validations": []}));

        let from_file = ValidateArgs {
            files: vec![doc.clone()],
            rules: rules.clone(),
            output: dir.path().join("v1.json"),
            validation_prompt: None,
        };
        execute_validate(from_file, llm.clone(), pipeline.clone(), &formatter)
            .await
            .unwrap();

        let from_flag = ValidateArgs {
            files: vec![doc],
            rules,
            output: dir.path().join("v2.json"),
            validation_prompt: Some("From flag.".to_string()),
        };
        execute_validate(from_flag, llm.clone(), pipeline, &formatter)
            .await
            .unwrap();

        let requests = llm.requests();
        assert_eq!(requests[0].system, "From config.");
        assert_eq!(requests[1].system, "From flag.");
    }
}
