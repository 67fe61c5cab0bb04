//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Rulekeeper - Extract, consolidate and validate policy rules with an LLM.
#[derive(Debug, Parser)]
#[command(name = "rulekeeper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API key for the model provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub base_url: Option<String>,

    /// Model name
    #[arg(long, env = "OPENAI_MODEL")]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (counts and ids only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract rules from documents
    Extract(ExtractArgs),

    /// Merge and prune redundant rules
    Consolidate(ConsolidateArgs),

    /// Check documents against the rules extracted from them
    Validate(ValidateArgs),

    /// Show or update the saved configuration
    Config(ConfigArgs),

    /// Render a rules or validations file
    Show(ShowArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Documents to extract rules from (PDF, images or text)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Rules file to write
    #[arg(short, long, default_value = "rules.json")]
    pub output: PathBuf,

    /// Replacement extraction instructions
    #[arg(long)]
    pub extraction_prompt: Option<String>,

    /// Add to the rules already in the output file
    #[arg(long)]
    pub append: bool,
}

/// Arguments for the consolidate command.
#[derive(Debug, Parser)]
pub struct ConsolidateArgs {
    /// Rules file to read
    #[arg(short, long, default_value = "rules.json")]
    pub input: PathBuf,

    /// Rules file to write
    #[arg(short, long, default_value = "rules_consolidated.json")]
    pub output: PathBuf,

    /// Replacement consolidation instructions
    #[arg(long)]
    pub consolidation_prompt: Option<String>,

    /// Fail if the model references rule ids that do not exist
    #[arg(long)]
    pub strict: bool,

    /// Print the proposed edits without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the validate command.
#[derive(Debug, Parser)]
pub struct ValidateArgs {
    /// Documents to validate
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Rules file to read
    #[arg(short, long, default_value = "rules.json")]
    pub rules: PathBuf,

    /// Validations file to write
    #[arg(short, long, default_value = "validations.json")]
    pub output: PathBuf,

    /// Replacement validation instructions
    #[arg(long)]
    pub validation_prompt: Option<String>,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Save an API key
    #[arg(long)]
    pub api_key: Option<String>,

    /// Save a base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Save a model name
    #[arg(long)]
    pub model: Option<String>,

    /// Save a request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print the current configuration
    #[arg(long)]
    pub show: bool,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Rules or validations file
    pub file: PathBuf,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
