//! Extract command implementation.

use super::ensure_progress;
use crate::cli::ExtractArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use rulekeeper_domain::{LlmProvider, RuleStore};
use rulekeeper_pipeline::{read_rules, write_rules, Extractor, PipelineConfig};
use std::fmt::Display;
use tracing::info;

/// Execute the extract command.
pub async fn execute_extract<L>(
    args: ExtractArgs,
    llm: L,
    pipeline: PipelineConfig,
    formatter: &Formatter,
) -> Result<()>
where
    L: LlmProvider,
    L::Error: Display,
{
    let mut store = if args.append && args.output.exists() {
        let rules = read_rules(&args.output)?;
        info!("Appending to {} existing rules in {}", rules.len(), args.output.display());
        RuleStore::from_rules(rules)
    } else {
        RuleStore::new()
    };

    let prompt = args.extraction_prompt.or_else(|| pipeline.extraction_prompt.clone());
    let config = pipeline.with_extraction_prompt(prompt);
    config.validate().map_err(CliError::InvalidInput)?;
    let extractor = Extractor::new(llm, config);
    let result = extractor.extract_files(&args.files, &mut store).await;

    ensure_progress(args.files.len(), &result.failures, formatter)?;

    write_rules(&args.output, store.rules())?;
    println!("{}", formatter.extraction_summary(&result, &args.output)?);
    Ok(())
}
