//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use rulekeeper_llm::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use rulekeeper_llm::OpenAiConfig;
use rulekeeper_pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Model provider settings
    #[serde(default)]
    pub api: ApiSettings,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Document limits and default prompt overrides
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Model provider settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Model name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct ApiOverrides {
    /// API key
    pub api_key: Option<String>,
    /// Base URL
    pub base_url: Option<String>,
    /// Model name
    pub model: Option<String>,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".rulekeeper").join("config.toml"))
    }

    /// Load configuration from `path`, or the default when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            config.pipeline.validate().map_err(CliError::Config)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Resolve provider settings: overrides first, then this file, then defaults.
    ///
    /// Fails when no API key is available from any source.
    pub fn provider_config(&self, overrides: &ApiOverrides) -> Result<OpenAiConfig> {
        let api_key = non_empty(&overrides.api_key)
            .or_else(|| non_empty(&self.api.api_key))
            .ok_or_else(|| {
                CliError::Config(
                    "No API key. Set OPENAI_API_KEY, pass --api-key, or run `rulekeeper config --api-key KEY`".into(),
                )
            })?;
        let model = non_empty(&overrides.model)
            .or_else(|| non_empty(&self.api.model))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = non_empty(&overrides.base_url)
            .or_else(|| non_empty(&self.api.base_url))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = self.api.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

        let config = OpenAiConfig::new(api_key, model)
            .with_base_url(base_url)
            .with_timeout_secs(timeout_secs);
        config
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;
        Ok(config)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

/// Mask all but the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn with_key(key: &str) -> Config {
        Config {
            api: ApiSettings {
                api_key: Some(key.to_string()),
                ..ApiSettings::default()
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api.api_key.is_none());
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = with_key("sk-test");
        config.api.model = Some("gpt-4o".to_string());
        config.settings.color = false;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let loaded = Config::load_from(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api]\nmodel = \"gpt-4o-mini\"\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api.model.as_deref(), Some("gpt-4o-mini"));
        assert!(loaded.settings.color);
    }

    #[test]
    fn test_pipeline_section() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[pipeline]\nmax_document_bytes = 1024\nvalidation_prompt = \"Be strict.\"\n",
        )
        .unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.pipeline.max_document_bytes, 1024);
        assert_eq!(loaded.pipeline.validation_instructions(), "Be strict.");

        fs::write(&path, "[pipeline]\nmax_document_bytes = 0\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(CliError::Config(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(CliError::Toml(_))));
    }

    #[test]
    fn test_provider_config_defaults() {
        let provider = with_key("sk-file").provider_config(&ApiOverrides::default()).unwrap();
        assert_eq!(provider.api_key, "sk-file");
        assert_eq!(provider.model, DEFAULT_MODEL);
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(provider.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = with_key("sk-file");
        config.api.model = Some("file-model".to_string());
        let overrides = ApiOverrides {
            api_key: Some("sk-env".to_string()),
            base_url: Some("http://localhost:8000/v1".to_string()),
            model: Some("  ".to_string()),
        };

        let provider = config.provider_config(&overrides).unwrap();
        assert_eq!(provider.api_key, "sk-env");
        assert_eq!(provider.base_url, "http://localhost:8000/v1");
        assert_eq!(provider.model, "file-model");
    }

    #[test]
    fn test_missing_api_key() {
        let result = Config::default().provider_config(&ApiOverrides::default());
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("sk-abcdef1234"), "*********1234");
        assert_eq!(mask_secret("abc"), "***");
    }
}
