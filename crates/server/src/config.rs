//! # Application Configuration
//!
//! Loads the server configuration from a `config.yml` file with `${VAR}`
//! environment substitution, then applies environment overrides
//! (`PRESSGEN_`-prefixed for nested keys, bare `PORT`/`DB_URL` for the top
//! level). Every field has a default so a minimal file is enough.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::{env, fs};
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    General(String),
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
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
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_url")]
    pub db_url: String,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    /// Default WordPress credentials; the persisted settings override them.
    #[serde(default)]
    pub wordpress: Option<WordPressSettings>,
}

fn default_port() -> u16 {
    9090
}

fn default_db_url() -> String {
    "db/pressgen.db".to_string()
}

/// The AI provider to talk to.
#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    /// "gemini" or "local" (an OpenAI-compatible endpoint).
    #[serde(default = "default_ai_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL override; tests point this at a mock server.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_text_model")]
    pub text_model: String,
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_ai_provider(),
            api_key: None,
            api_url: None,
            text_model: default_text_model(),
            fallback_model: default_fallback_model(),
            image_model: default_image_model(),
        }
    }
}

fn default_ai_provider() -> String {
    "gemini".to_string()
}

fn default_text_model() -> String {
    pressgen::constants::PREFERRED_TEXT_MODEL.to_string()
}

fn default_fallback_model() -> String {
    pressgen::constants::FALLBACK_TEXT_MODEL.to_string()
}

fn default_image_model() -> String {
    pressgen::constants::IMAGE_MODEL.to_string()
}

/// Pipeline tuning exposed to the deployment.
#[derive(Debug, Deserialize, Clone)]
pub struct PipelineSettings {
    #[serde(default = "default_true")]
    pub internal_links: bool,
    #[serde(default = "default_true")]
    pub auto_video: bool,
    #[serde(default = "default_true")]
    pub auto_render_hero: bool,
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            internal_links: true,
            auto_video: true,
            auto_render_hero: true,
            requests_per_minute: default_requests_per_minute(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_requests_per_minute() -> u32 {
    8
}

#[derive(Debug, Deserialize, Clone)]
pub struct WordPressSettings {
    #[serde(default)]
    pub site_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub app_password: String,
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}").expect("env var regex is valid");
    let expanded = re.replace_all(&content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });
    Ok(Some(expanded.to_string()))
}

/// Loads the application configuration from a file and the environment.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let config_path = config_path_override.unwrap_or("config.yml");

    let mut builder = ConfigBuilder::builder();
    if let Some(content) = read_and_substitute(config_path)? {
        info!("Loading configuration from '{config_path}'.");
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    } else if config_path_override.is_some() {
        return Err(ConfigError::NotFound(format!(
            "Config file not found at '{config_path}'."
        )));
    } else {
        info!("No config.yml found, using defaults and environment variables.");
    }

    let settings = builder
        // Top-level keys like PORT and DB_URL.
        .add_source(Environment::default())
        // Nested overrides, e.g. PRESSGEN_AI__API_KEY.
        .add_source(
            Environment::with_prefix("PRESSGEN")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;

    // Make the key robust: fall back to the conventional env var when the
    // file did not provide one.
    if config.ai.api_key.is_none() {
        if let Ok(key) = env::var("AI_API_KEY") {
            if !key.is_empty() {
                config.ai.api_key = Some(key);
            }
        }
    }

    Ok(config)
}
