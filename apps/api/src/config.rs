use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{LlmSettings, RetryPolicy, DEFAULT_API_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Language-model analysis is disabled when no key is configured.
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub openai_model: String,
    pub analysis_timeout_secs: u64,
    pub analysis_retry_base_ms: u64,
    pub vocabulary_path: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            openai_api_key: None,
            openai_api_url: DEFAULT_API_URL.to_string(),
            openai_model: DEFAULT_MODEL.to_string(),
            analysis_timeout_secs: 30,
            analysis_retry_base_ms: 1000,
            vocabulary_path: None,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_api_url: optional_env("OPENAI_API_URL").unwrap_or(defaults.openai_api_url),
            openai_model: optional_env("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            analysis_timeout_secs: parse_env(
                "ANALYSIS_TIMEOUT_SECS",
                defaults.analysis_timeout_secs,
            )?,
            analysis_retry_base_ms: parse_env(
                "ANALYSIS_RETRY_BASE_MS",
                defaults.analysis_retry_base_ms,
            )?,
            vocabulary_path: optional_env("VOCABULARY_PATH").map(PathBuf::from),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        })
    }

    /// Client settings for the analysis service, or `None` when no API key is set.
    pub fn llm_settings(&self) -> Option<LlmSettings> {
        let api_key = self.openai_api_key.clone()?;
        Some(LlmSettings {
            api_key,
            api_url: self.openai_api_url.clone(),
            model: self.openai_model.clone(),
            timeout: Duration::from_secs(self.analysis_timeout_secs),
            retry: RetryPolicy {
                base_delay: Duration::from_millis(self.analysis_retry_base_ms),
                ..RetryPolicy::default()
            },
        })
    }
}

/// Reads a variable, treating unset and blank values alike.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        None => Ok(default),
    }
}
