use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::{LlmProvider, LlmSettings};

/// Application configuration loaded from environment variables.
/// Fails at startup if a value is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub upload_root: PathBuf,
    pub llm: LlmSettings,
    /// Max candidates processed at once within a run. 1 = sequential.
    pub analysis_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider: LlmProvider = lookup("LLM_PROVIDER")
            .unwrap_or_else(|| "ollama".to_string())
            .parse()
            .context("LLM_PROVIDER must be 'ollama' or 'anthropic'")?;

        let api_key = lookup("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty());
        if provider == LlmProvider::Anthropic && api_key.is_none() {
            bail!("Required environment variable 'ANTHROPIC_API_KEY' is not set");
        }

        let analysis_concurrency = parse_or(&lookup, "ANALYSIS_CONCURRENCY", 1usize)?;
        if analysis_concurrency == 0 {
            bail!("ANALYSIS_CONCURRENCY must be at least 1");
        }

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080u16)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            upload_root: lookup("UPLOAD_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            llm: LlmSettings {
                provider,
                base_url: lookup("LLM_BASE_URL")
                    .unwrap_or_else(|| provider.default_base_url().to_string()),
                model: lookup("LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
                api_key,
                timeout: Duration::from_secs(parse_or(&lookup, "LLM_TIMEOUT_SECS", 120u64)?),
                max_retries: parse_or(&lookup, "LLM_MAX_RETRIES", 3u32)?,
            },
            analysis_concurrency,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
