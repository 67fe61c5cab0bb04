//! Config command implementation.

use crate::cli::ConfigArgs;
use crate::config::{mask_secret, Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use rulekeeper_llm::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use serde_json::json;
use std::path::Path;

/// Execute the config command.
pub fn execute_config(
    args: ConfigArgs,
    config: &mut Config,
    path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    let updated = apply_updates(&args, config)?;

    if !updated.is_empty() {
        config.save_to(path)?;
        println!(
            "{}",
            formatter.success(&format!("Saved {} to {}", updated.join(", "), path.display()))
        );
    }

    if args.show || updated.is_empty() {
        println!("{}", render(config, path, formatter)?);
    }

    Ok(())
}

/// Copy the given values into `config`, returning the names of the fields set.
fn apply_updates(args: &ConfigArgs, config: &mut Config) -> Result<Vec<&'static str>> {
    let mut updated = Vec::new();

    if let Some(key) = &args.api_key {
        if key.trim().is_empty() {
            return Err(CliError::InvalidInput("API key cannot be empty".to_string()));
        }
        config.api.api_key = Some(key.trim().to_string());
        updated.push("api_key");
    }
    if let Some(url) = &args.base_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CliError::InvalidInput(format!(
                "Base URL must start with http:// or https://, got '{}'",
                url
            )));
        }
        config.api.base_url = Some(url.clone());
        updated.push("base_url");
    }
    if let Some(model) = &args.model {
        if model.trim().is_empty() {
            return Err(CliError::InvalidInput("Model cannot be empty".to_string()));
        }
        config.api.model = Some(model.trim().to_string());
        updated.push("model");
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err(CliError::InvalidInput("Timeout must be greater than 0".to_string()));
        }
        config.api.timeout_secs = Some(timeout);
        updated.push("timeout_secs");
    }

    Ok(updated)
}

fn render(config: &Config, path: &Path, formatter: &Formatter) -> Result<String> {
    let api_key = config.api.api_key.as_deref().map(mask_secret);
    let base_url = config.api.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    let model = config.api.model.as_deref().unwrap_or(DEFAULT_MODEL);
    let timeout = config.api.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
    let format = match config.settings.format {
        OutputFormat::Table => "table",
        OutputFormat::Json => "json",
        OutputFormat::Quiet => "quiet",
    };
    let pipeline = &config.pipeline;
    let custom_prompts: Vec<&str> = [
        ("extraction", &pipeline.extraction_prompt),
        ("consolidation", &pipeline.consolidation_prompt),
        ("validation", &pipeline.validation_prompt),
    ]
    .into_iter()
    .filter(|(_, prompt)| prompt.is_some())
    .map(|(name, _)| name)
    .collect();

    if formatter.format() == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&json!({
            "path": path.display().to_string(),
            "api": {
                "api_key": api_key,
                "base_url": base_url,
                "model": model,
                "timeout_secs": timeout,
            },
            "settings": {
                "color": config.settings.color,
                "format": format,
            },
            "pipeline": {
                "max_document_bytes": pipeline.max_document_bytes,
                "custom_prompts": custom_prompts,
            }
        }))?);
    }

    let lines = [
        format!("Config file: {}", path.display()),
        format!(
            "  API key:  {}",
            api_key.unwrap_or_else(|| "(not set)".to_string())
        ),
        format!("  Base URL: {}", base_url),
        format!("  Model:    {}", model),
        format!("  Timeout:  {}s", timeout),
        format!("  Color:    {}", config.settings.color),
        format!("  Format:   {}", format),
        format!("  Max doc:  {} bytes", pipeline.max_document_bytes),
        format!(
            "  Prompts:  {}",
            if custom_prompts.is_empty() {
                "built-in".to_string()
            } else {
                format!("custom ({})", custom_prompts.join(", "))
            }
        ),
    ];
    Ok(lines.join("\n"))
}
