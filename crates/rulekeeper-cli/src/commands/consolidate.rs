//! Consolidate command implementation.

use crate::cli::ConsolidateArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use rulekeeper_domain::{LlmProvider, RuleStore, UnknownIdPolicy};
use rulekeeper_pipeline::{read_rules, write_rules, Consolidator, PipelineConfig};
use std::fmt::Display;

/// Execute the consolidate command.
pub async fn execute_consolidate<L>(
    args: ConsolidateArgs,
    llm: L,
    pipeline: PipelineConfig,
    formatter: &Formatter,
) -> Result<()>
where
    L: LlmProvider,
    L::Error: Display,
{
    let mut store = RuleStore::from_rules(read_rules(&args.input)?);
    let policy = if args.strict {
        UnknownIdPolicy::Reject
    } else {
        UnknownIdPolicy::Ignore
    };

    let prompt = args.consolidation_prompt.or_else(|| pipeline.consolidation_prompt.clone());
    let config = pipeline.with_consolidation_prompt(prompt);
    config.validate().map_err(CliError::InvalidInput)?;
    let consolidator = Consolidator::new(llm, config);

    if args.dry_run {
        let edits = consolidator.propose(&store).await?;
        println!("{}", formatter.format_edits(&edits)?);

        // Apply to a copy so strict mode and the resulting count are reported
        let mut preview = store.clone();
        preview.apply_edits(&edits, policy).map_err(rulekeeper_pipeline::PipelineError::from)?;
        println!(
            "{}",
            formatter.info(&format!(
                "Dry run: {} rule(s) would become {}; nothing written",
                store.len(),
                preview.len()
            ))
        );
        return Ok(());
    }

    let result = consolidator.consolidate(&mut store, policy).await?;
    write_rules(&args.output, store.rules())?;
    println!("{}", formatter.consolidation_summary(&result, &args.output)?);
    Ok(())
}
