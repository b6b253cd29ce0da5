//! # Application Configuration
//!
//! This module defines the configuration structure for the
//! `scriptlens-server` and provides the logic for loading it from a
//! `config.yml` file and environment variables. The vision API secret only
//! ever reaches the configuration through `${VAR}` substitution or the
//! environment; it is never sent to the browser.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Connection settings for the external vision model API.
    pub provider: ProviderConfig,
}

/// Provides a default value for the `port` field if not set in the environment.
fn default_port() -> u16 {
    9090
}

/// Configuration for the vision model provider.
#[derive(Deserialize, Clone)]
pub struct ProviderConfig {
    /// The provider type, either `"local"` (OpenAI-compatible) or `"gemini"`.
    pub provider: String,
    /// The full endpoint URL. Required for `local`; derived from
    /// `model_name` for `gemini` when absent.
    pub api_url: Option<String>,
    /// The server-side API secret.
    pub api_key: Option<String>,
    /// The model to request, where the API supports naming one.
    pub model_name: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .finish()
    }
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}").unwrap();
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_else(|_| "".to_string())
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// The configuration is read from `config.yml` (or the override path), with
/// `${VAR}` placeholders substituted from the environment before parsing.
/// Environment variables are then merged on top:
/// - Top-level keys like `port` are overridden by `PORT`.
/// - Nested keys are overridden by `SCRIPTLENS_...` variables
///   (e.g. `SCRIPTLENS_PROVIDER__API_URL`).
/// - `VISION_API_KEY` is a final fallback for the provider secret.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let base_path = env!("CARGO_MANIFEST_DIR");
    let main_config_path = match config_path_override {
        Some(override_path) => override_path.to_string(),
        None => {
            let path = format!("{base_path}/config.yml");
            info!("Loading configuration from '{path}'.");
            path
        }
    };

    let main_content = read_and_substitute(&main_config_path)?.ok_or_else(|| {
        ConfigError::NotFound(format!(
            "Config file not found at '{main_config_path}'. Please ensure 'config.yml' exists."
        ))
    })?;

    let settings = ConfigBuilder::builder()
        .add_source(File::from_str(&main_content, FileFormat::Yaml))
        // Environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("SCRIPTLENS")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;

    // An unset `${VAR}` placeholder substitutes to an empty string; treat
    // those fields as absent.
    config.provider.api_url = none_if_empty(config.provider.api_url);
    config.provider.model_name = none_if_empty(config.provider.model_name);
    config.provider.api_key = none_if_empty(config.provider.api_key);

    // After all layers, explicitly check for the VISION_API_KEY from the
    // environment if it hasn't been set by file substitution.
    if config.provider.api_key.is_none() {
        if let Ok(key) = env::var("VISION_API_KEY") {
            if !key.is_empty() {
                config.provider.api_key = Some(key);
            }
        }
    }

    Ok(config)
}

fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
