//! OpenAI Gateway - Implementation of LlmGateway for OpenAI-compatible APIs.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAiConfig::new(api_key)
//!     .with_base_url("https://api.openai.com/v1")
//!     .with_max_retries(5);
//!
//! let gateway = OpenAiGateway::new(config)?;
//! ```
//!
//! # Failure mapping
//!
//! | Response                                  | Failure          |
//! |-------------------------------------------|------------------|
//! | 429                                       | `RateLimit`      |
//! | 400 mentioning the maximum context length | `ContextTooLong` |
//! | other non-success status, timeout, I/O    | `Transient`      |
//! | success without `choices[0].message`      | `Malformed`      |
//!
//! Rate limits and transient failures are retried here with exponential
//! backoff before being reported to the caller.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::LlmConfig;
use crate::ports::{ChatMessage, CompletionRequest, LlmFailure, LlmGateway};

/// Configuration for the OpenAI gateway.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on rate limits and transient failures.
    pub max_retries: u32,
    /// First backoff delay; doubled on every retry.
    pub retry_base_delay: Duration,
}

impl OpenAiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(300),
            max_retries: 5,
            retry_base_delay: Duration::from_secs(1),
        }
    }

    /// Builds a gateway configuration from the application settings.
    pub fn from_settings(settings: &LlmConfig) -> Self {
        Self {
            api_key: settings.api_key.clone().unwrap_or_else(|| Secret::new(String::new())),
            base_url: settings.base_url.clone(),
            timeout: settings.timeout(),
            max_retries: settings.max_retries,
            retry_base_delay: Duration::from_secs(1),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Gateway talking to an OpenAI-compatible chat completions endpoint.
pub struct OpenAiGateway {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiGateway {
    pub fn new(config: OpenAiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn send_once(&self, body: &OpenAiRequest<'_>) -> Result<String, LlmFailure> {
        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmFailure::transient(format!(
                        "request timed out after {}s",
                        self.config.timeout.as_secs()
                    ))
                } else if e.is_connect() {
                    LlmFailure::transient(format!("connection failed: {}", e))
                } else {
                    LlmFailure::transient(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmFailure::transient(format!("failed to read body: {}", e)))?;

        if !status.is_success() {
            return Err(classify_status(status.as_u16(), &text));
        }
        parse_completion(&text)
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmFailure> {
        let body = OpenAiRequest::from_request(&request);
        let mut retry_count = 0;

        loop {
            match self.send_once(&body).await {
                Ok(content) => return Ok(content),
                Err(err) if err.is_retryable() && retry_count < self.config.max_retries => {
                    let delay = self.config.retry_base_delay * (1u32 << retry_count.min(16));
                    tracing::warn!(
                        model = %request.model,
                        retry = retry_count + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retrying LLM call"
                    );
                    sleep(delay).await;
                    retry_count += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Maps a non-success HTTP status to a failure.
pub(crate) fn classify_status(status: u16, body: &str) -> LlmFailure {
    match status {
        429 => LlmFailure::rate_limit(body),
        400 if body.contains("maximum context length")
            || body.contains("context_length_exceeded") =>
        {
            LlmFailure::context_too_long(body)
        }
        _ => LlmFailure::transient(format!("status {}: {}", status, body)),
    }
}

/// Extracts `choices[0].message.content` from a success body.
pub(crate) fn parse_completion(body: &str) -> Result<String, LlmFailure> {
    let response: OpenAiResponse = serde_json::from_str(body)
        .map_err(|e| LlmFailure::malformed(format!("failed to parse response: {}", e)))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| LlmFailure::malformed("no message content in response"))
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'static str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'a serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

impl<'a> OpenAiRequest<'a> {
    fn from_request(request: &'a CompletionRequest) -> Self {
        let params = &request.parameters;
        Self {
            model: request.model.as_str(),
            messages: &request.messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
            frequency_penalty: params.frequency_penalty,
            presence_penalty: params.presence_penalty,
            response_format: params.response_format.as_ref(),
            stop: params.stop.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: Option<OpenAiMessage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}
