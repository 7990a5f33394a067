//! HTTP transport to the Anthropic Messages API.
//!
//! Only `text_gen` calls into this module; everything else talks to the
//! `TextGenerator` trait. One call is one user turn with a system prompt, and
//! the reply is expected to be a single JSON document.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
pub const MODEL: &str = "claude-sonnet-4-5";
const ATTEMPTS: u32 = 3;
const RETRY_BASE: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM call timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client setup failed: {0}")]
    Setup(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [Turn<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Turn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct Reply {
    content: Vec<ReplyBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ReplyBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl Reply {
    /// All text blocks, concatenated in order.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .content
            .iter()
            .filter(|b| b.kind == "text")
            .filter_map(|b| b.text.as_deref())
            .collect();
        Some(text).filter(|t| !t.trim().is_empty())
    }
}

/// Per-call generation knobs. Each prompt picks its own.
#[derive(Debug, Clone, Copy)]
pub struct CallOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.2,
        }
    }
}

/// Outcome of one HTTP attempt.
enum Attempt {
    Done(Reply),
    Retry(LlmError),
    Fail(LlmError),
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// 1x, 2x, 4x `base` for attempts 1, 2, 3.
fn backoff(base: Duration, attempt: u32) -> Duration {
    base * (1u32 << attempt.saturating_sub(1).min(8))
}

/// Cheap to clone; the underlying `reqwest::Client` is shared.
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    api_key: String,
    endpoint: String,
    timeout: Duration,
    retry_base: Duration,
}

impl LlmClient {
    /// `timeout` bounds each HTTP attempt, not the retry loop as a whole.
    pub fn new(api_key: String, endpoint: &str, timeout: Duration) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Setup(e.to_string()))?;
        Ok(Self {
            http,
            api_key,
            endpoint: endpoint.to_string(),
            timeout,
            retry_base: RETRY_BASE,
        })
    }

    #[cfg(test)]
    fn with_retry_base(mut self, base: Duration) -> Self {
        self.retry_base = base;
        self
    }

    async fn attempt(&self, body: &MessagesRequest<'_>) -> Attempt {
        let sent = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(body)
            .send()
            .await;

        let response = match sent {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return Attempt::Retry(LlmError::Timeout(self.timeout.as_secs())),
            Err(e) => return Attempt::Retry(LlmError::Http(e)),
        };

        let status = response.status();
        if status.is_success() {
            return match response.json::<Reply>().await {
                Ok(reply) => Attempt::Done(reply),
                Err(e) => Attempt::Fail(LlmError::Http(e)),
            };
        }

        let raw = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&raw)
            .map(|e| e.error.message)
            .unwrap_or(raw);
        let error = LlmError::Api {
            status: status.as_u16(),
            message,
        };
        if is_retryable(status) {
            Attempt::Retry(error)
        } else {
            Attempt::Fail(error)
        }
    }

    /// Sends one user turn. Retries timeouts, transport errors, 429 and 5xx
    /// with exponential backoff; any other status fails immediately.
    pub async fn call(
        &self,
        prompt: &str,
        system: &str,
        options: CallOptions,
    ) -> Result<Reply, LlmError> {
        let body = MessagesRequest {
            model: MODEL,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            system,
            messages: [Turn {
                role: "user",
                content: prompt,
            }],
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt(&body).await {
                Attempt::Done(reply) => {
                    if let Some(usage) = &reply.usage {
                        debug!(
                            "LLM call succeeded: input_tokens={}, output_tokens={}",
                            usage.input_tokens, usage.output_tokens
                        );
                    }
                    return Ok(reply);
                }
                Attempt::Fail(e) => return Err(e),
                Attempt::Retry(e) if attempt >= ATTEMPTS => return Err(e),
                Attempt::Retry(e) => {
                    let delay = backoff(self.retry_base, attempt);
                    warn!("LLM attempt {attempt} failed ({e}); retrying in {}ms", delay.as_millis());
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Calls the model and parses its reply as JSON. The prompt must ask for JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
        options: CallOptions,
    ) -> Result<T, LlmError> {
        let reply = self.call(prompt, system, options).await?;
        let text = reply.text().ok_or(LlmError::EmptyContent)?;
        serde_json::from_str(json_payload(&text)).map_err(LlmError::Parse)
    }
}

/// The JSON document inside a reply: markdown fences are dropped, and any
/// prose around the outermost object or array is cut away.
fn json_payload(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        body = rest.trim().strip_suffix("```").unwrap_or(rest).trim();
    }
    let start = body.find(['{', '[']);
    let end = body.rfind(['}', ']']);
    match (start, end) {
        (Some(s), Some(e)) if s < e => &body[s..=e],
        _ => body,
    }
}
