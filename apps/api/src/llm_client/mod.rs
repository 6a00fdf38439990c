/// LLM Client — the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the language-model API directly.
/// All LLM interactions MUST go through this module.
///
/// Credentials, endpoint and model are passed in explicitly through
/// `LlmSettings`; this module never reads the environment.
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

use prompts::{VERIFY_PROMPT, VERIFY_SYSTEM};

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const MAX_TOKENS: u32 = 1000;
const VERIFY_MAX_TOKENS: u32 = 10;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API key rejected (status {status})")]
    Unauthorized { status: u16 },

    #[error("Rate limited after {retries} attempts")]
    RateLimited { retries: u32 },

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Request timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Response parse error: {0}")]
    ResponseParse(String),
}

/// Retry policy for rate-limited calls: `base_delay`, doubling per attempt,
/// at most `max_attempts` requests in total.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): base, 2×base, 4×base, …
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl LlmSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl ChatResponse {
    /// Text content of the first choice, if any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    /// True when the first choice stopped at the token limit.
    pub fn is_truncated(&self) -> bool {
        self.choices
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            == Some("length")
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Result of a key verification round-trip.
#[derive(Debug, Clone, Serialize)]
pub struct KeyVerification {
    pub model: Option<String>,
    pub usage: Option<Usage>,
}

/// Chat-completions client with rate-limit retry and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Makes a chat call with a system and a user message.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<ChatResponse, LlmError> {
        self.send(prompt, system, MAX_TOKENS).await
    }

    /// Sends one request, retrying only on 429 with exponential backoff.
    /// Authentication failures, network failures and timeouts fail fast.
    async fn send(
        &self,
        prompt: &str,
        system: &str,
        max_tokens: u32,
    ) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens,
        };

        let retry = self.settings.retry;

        for attempt in 0..retry.max_attempts {
            if attempt > 0 {
                let delay = retry.delay_for(attempt);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "LLM call rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.settings.api_url)
                .bearer_auth(&self.settings.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) if e.is_timeout() => return Err(LlmError::Timeout),
                Err(e) if e.is_connect() || e.is_request() => {
                    return Err(LlmError::Unavailable(e.to_string()))
                }
                Err(e) => return Err(LlmError::Http(e)),
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {status}: {body}");
                continue;
            }

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(LlmError::Unauthorized {
                    status: status.as_u16(),
                });
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                if status.is_server_error() {
                    return Err(LlmError::Unavailable(format!("status {status}: {message}")));
                }
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await.map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Http(e)
                }
            })?;
            let chat: ChatResponse = serde_json::from_str(&body).map_err(|e| {
                LlmError::ResponseParse(format!("invalid chat completion body: {e}"))
            })?;

            if let Some(usage) = &chat.usage {
                debug!(
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "LLM call succeeded"
                );
            }

            return Ok(chat);
        }

        Err(LlmError::RateLimited {
            retries: retry.max_attempts,
        })
    }

    /// Calls the LLM and deserializes the JSON object embedded in its reply.
    /// The reply may carry commentary or code fences around the object.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let response = self.call(prompt, system).await?;
        if response.is_truncated() {
            warn!(max_tokens = MAX_TOKENS, "LLM reply was cut off at the token limit");
        }
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        parse_json_reply(text)
    }

    /// Minimal round-trip used to check that the configured key is accepted.
    pub async fn verify(&self) -> Result<KeyVerification, LlmError> {
        let response = self
            .send(VERIFY_PROMPT, VERIFY_SYSTEM, VERIFY_MAX_TOKENS)
            .await?;
        Ok(KeyVerification {
            model: response.model,
            usage: response.usage,
        })
    }
}

/// Isolates the outermost `{ … }` span of `text`: from the first `{` to the
/// last `}`. Anything around it (code fences, commentary) is discarded.
pub fn extract_json_object(text: &str) -> Result<&str, LlmError> {
    let start = text.find('{');
    let end = text.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&text[start..=end]),
        _ => Err(LlmError::ResponseParse(
            "no JSON object found in response".to_string(),
        )),
    }
}

/// Extracts and deserializes the JSON object contained in an LLM reply.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let json = extract_json_object(text)?;
    serde_json::from_str(json)
        .map_err(|e| LlmError::ResponseParse(format!("response is not valid JSON: {e}")))
}
