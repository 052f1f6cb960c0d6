/// LLM Client — the single point of entry for all oracle calls in the ranker.
///
/// ARCHITECTURAL RULE: No other module may talk to a model endpoint directly.
/// Analysis code depends only on the `Oracle` trait; `LlmClient` is the
/// production implementation and is constructed once in `main`.
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod coerce;
#[cfg(test)]
pub mod mock;
pub mod prompts;

use prompts::JSON_ONLY_SYSTEM;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_MAX_TOKENS: u32 = 4096;
const OLLAMA_NUM_PREDICT: u32 = 512;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM client misconfigured: {0}")]
    Config(String),
}

/// The scoring oracle: opaque, synchronous-per-call text in, text out.
///
/// Implementations must be re-entrant; the pipeline may issue several calls
/// concurrently against one shared handle.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Which wire protocol the client speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Ollama,
    Anthropic,
}

impl LlmProvider {
    pub fn default_base_url(self) -> &'static str {
        match self {
            LlmProvider::Ollama => "http://localhost:11434",
            LlmProvider::Anthropic => "https://api.anthropic.com",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::Ollama => "llama3.1:8b",
            LlmProvider::Anthropic => "claude-sonnet-4-5",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "anthropic" => Ok(LlmProvider::Anthropic),
            other => Err(LlmError::Config(format!(
                "unknown LLM provider '{other}' (expected 'ollama' or 'anthropic')"
            ))),
        }
    }
}

/// Connection and retry settings for `LlmClient`.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Per-call deadline, applied to each HTTP attempt.
    pub timeout: Duration,
    /// Total attempts on connection errors, 429 and 5xx.
    pub max_retries: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicResponse {
    /// Extracts the text content from the first text block.
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: OllamaOptions,
}

/// Greedy, deterministic decoding so repeated runs score identically.
#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    num_predict: u32,
}

impl Default for OllamaOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_p: 1.0,
            top_k: 1,
            num_predict: OLLAMA_NUM_PREDICT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single LLM client used by the ranker.
/// Wraps either the Ollama generate API or the Anthropic Messages API with retry logic.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        if settings.provider == LlmProvider::Anthropic && settings.api_key.is_none() {
            return Err(LlmError::Config(
                "ANTHROPIC_API_KEY is required for the anthropic provider".to_string(),
            ));
        }

        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    pub fn provider(&self) -> LlmProvider {
        self.settings.provider
    }

    fn endpoint(&self) -> String {
        let base = self.settings.base_url.trim_end_matches('/');
        match self.settings.provider {
            LlmProvider::Ollama => format!("{base}/api/generate"),
            LlmProvider::Anthropic => format!("{base}/v1/messages"),
        }
    }

    fn build_request(&self, prompt: &str, system: &str) -> RequestBuilder {
        let request = self.client.post(self.endpoint());
        match self.settings.provider {
            LlmProvider::Ollama => request.json(&OllamaRequest {
                model: &self.settings.model,
                prompt,
                system,
                stream: false,
                options: OllamaOptions::default(),
            }),
            LlmProvider::Anthropic => request
                .header("x-api-key", self.settings.api_key.as_deref().unwrap_or_default())
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&AnthropicRequest {
                    model: &self.settings.model,
                    max_tokens: ANTHROPIC_MAX_TOKENS,
                    system,
                    messages: vec![AnthropicMessage {
                        role: "user",
                        content: prompt,
                    }],
                }),
        }
    }

    /// Makes a raw call to the model, returning the generated text.
    /// Retries on connection errors, 429 and 5xx with exponential backoff.
    ///
    /// Empty text is returned as-is: deciding what an empty answer means is
    /// the caller's job, not a transport failure.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let max_retries = self.settings.max_retries.max(1);
        let mut attempt = 1;

        loop {
            match self.call_once(prompt, system).await {
                Ok(text) => {
                    if text.trim().is_empty() {
                        warn!("LLM returned empty content");
                    }
                    return Ok(text);
                }
                Err(e) if is_retryable(&e) && attempt < max_retries => {
                    // Exponential backoff: 1s, 2s, 4s
                    let delay = Duration::from_millis(1000 * (1 << (attempt - 1).min(6)));
                    warn!(
                        "LLM call attempt {} failed ({e}), retrying after {}ms...",
                        attempt,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(LlmError::Api { status: 429, .. }) => {
                    return Err(LlmError::RateLimited {
                        retries: max_retries,
                    })
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One HTTP round trip without retries.
    async fn call_once(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let response = self.build_request(prompt, system).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.as_u16() == 429 || status.is_server_error() {
            warn!("LLM API returned {}: {}", status, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: self.error_message(body),
            });
        }

        let text = match self.settings.provider {
            LlmProvider::Ollama => {
                let parsed: OllamaResponse = serde_json::from_str(&body)?;
                debug!(
                    "LLM call succeeded: prompt_tokens={:?}, output_tokens={:?}",
                    parsed.prompt_eval_count, parsed.eval_count
                );
                parsed.response
            }
            LlmProvider::Anthropic => {
                let parsed: AnthropicResponse = serde_json::from_str(&body)?;
                debug!(
                    "LLM call succeeded: input_tokens={}, output_tokens={}",
                    parsed.usage.input_tokens, parsed.usage.output_tokens
                );
                parsed.text().map(str::to_string).unwrap_or_default()
            }
        };

        Ok(text)
    }

    /// Pulls the human-readable message out of a provider error body, if it has one.
    fn error_message(&self, body: String) -> String {
        match self.settings.provider {
            LlmProvider::Ollama => serde_json::from_str::<OllamaError>(&body)
                .map(|e| e.error)
                .unwrap_or(body),
            LlmProvider::Anthropic => serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body),
        }
    }
}

/// Connection failures, rate limits and server errors are worth another attempt.
fn is_retryable(error: &LlmError) -> bool {
    match error {
        LlmError::Http(_) => true,
        LlmError::Api { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

#[async_trait]
impl Oracle for LlmClient {
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
        self.call(prompt, JSON_ONLY_SYSTEM).await
    }
}
