//! # CLI Configuration
//!
//! Layered configuration for the `faqbot` binary: serde defaults, an
//! optional `config.yml`, then `FAQBOT_*` environment variables (with `__`
//! separating nesting levels, e.g. `FAQBOT_AI__API_KEY`). Values in the
//! YAML file may reference environment variables as `${VAR}`.

use anyhow::{bail, Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use faqbot::session::{DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_HISTORY, DEFAULT_SWEEP_INTERVAL};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use tracing::info;

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Path to the SQLite knowledge base.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// AI collaborator. Absent means the enhancement and generation
    /// branches are skipped.
    #[serde(default)]
    pub ai: Option<AiSection>,
    /// Web-search fallback.
    #[serde(default)]
    pub web: WebSection,
    /// Conversation session tuning.
    #[serde(default)]
    pub session: SessionSection,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiSection {
    /// Model name; `gemini*` selects the Gemini API, anything else an
    /// OpenAI-compatible endpoint.
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Full endpoint URL. Optional for Gemini, required otherwise.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Deadline for each AI call, in seconds.
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            api_url: None,
            timeout_secs: default_ai_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Search base URL; overridable so tests and mirrors can stand in.
    #[serde(default = "default_search_base_url")]
    pub base_url: String,
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            base_url: default_search_base_url(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSection {
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            idle_timeout_secs: default_idle_timeout_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_db_url() -> String {
    "db/faqbot.db".to_string()
}

fn default_model() -> String {
    env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string())
}

fn default_ai_timeout_secs() -> u64 {
    8
}

fn default_true() -> bool {
    true
}

fn default_search_base_url() -> String {
    "https://www.google.com".to_string()
}

fn default_search_timeout_secs() -> u64 {
    4
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

fn default_idle_timeout_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT.as_secs()
}

fn default_sweep_interval_secs() -> u64 {
    DEFAULT_SWEEP_INTERVAL.as_secs()
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read config file '{path}'"))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")?;
    let expanded = re.replace_all(&content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });

    Ok(Some(expanded.to_string()))
}

/// Loads the CLI configuration.
///
/// An explicitly passed path must exist; the default `config.yml` is
/// optional because the serde defaults plus environment variables are a
/// complete configuration on their own.
pub fn get_config(path_override: Option<&str>) -> Result<AppConfig> {
    let mut builder = ConfigBuilder::builder();

    let path = path_override.unwrap_or("config.yml");
    match read_and_substitute(path)? {
        Some(content) => {
            info!("loading configuration from '{path}'");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None if path_override.is_some() => bail!("config file not found at '{path}'"),
        None => {}
    }

    let settings = builder
        .add_source(
            Environment::with_prefix("FAQBOT")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;

    // GEMINI_API_KEY alone is enough to turn the AI branches on, matching
    // the production deployment's environment.
    if config.ai.is_none() {
        if let Ok(key) = env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                config.ai = Some(AiSection {
                    api_key: Some(key),
                    ..Default::default()
                });
            }
        }
    }

    Ok(config)
}
