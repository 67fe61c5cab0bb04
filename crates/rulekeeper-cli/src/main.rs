//! Rulekeeper CLI - Extract, consolidate and validate policy rules.

use clap::Parser;
use rulekeeper_cli::commands;
use rulekeeper_cli::{ApiOverrides, Cli, Command, Config, Formatter};
use rulekeeper_llm::OpenAiProvider;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Usage errors exit with status 2 from here
    let cli = Cli::parse();
    init_logging(cli.verbose, !cli.no_color);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `-v` forces debug, otherwise `RUST_LOG` or `info`.
fn init_logging(verbose: bool, ansi: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> rulekeeper_cli::Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::path()?,
    };
    let mut config = Config::load_from(&config_path)?;
    debug!("Loaded configuration from {}", config_path.display());

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;
    if !color_enabled {
        colored::control::set_override(false);
    }

    let formatter = Formatter::new(format, color_enabled);

    let overrides = ApiOverrides {
        api_key: cli.api_key,
        base_url: cli.base_url,
        model: cli.model,
    };

    match cli.command {
        Command::Config(args) => {
            commands::execute_config(args, &mut config, &config_path, &formatter)?;
        }
        Command::Show(args) => {
            commands::execute_show(args, &formatter)?;
        }
        Command::Extract(args) => {
            let provider = connect(&config, &overrides)?;
            commands::execute_extract(args, provider, config.pipeline, &formatter).await?;
        }
        Command::Consolidate(args) => {
            let provider = connect(&config, &overrides)?;
            commands::execute_consolidate(args, provider, config.pipeline, &formatter).await?;
        }
        Command::Validate(args) => {
            let provider = connect(&config, &overrides)?;
            commands::execute_validate(args, provider, config.pipeline, &formatter).await?;
        }
    }

    Ok(())
}

/// Build the provider for commands that call the model.
fn connect(config: &Config, overrides: &ApiOverrides) -> rulekeeper_cli::Result<OpenAiProvider> {
    let provider = OpenAiProvider::new(config.provider_config(overrides)?)?;
    debug!(
        "Using model {} at {}",
        provider.config().model,
        provider.config().base_url
    );
    Ok(provider)
}
