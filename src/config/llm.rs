//! LLM gateway configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::models::ModelEngine;

/// Longest request timeout accepted.
const MAX_TIMEOUT_SECS: u64 = 600;

/// LLM gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// API key for the OpenAI-compatible endpoint
    pub api_key: Option<Secret<String>>,

    /// Base URL of the chat completions API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used when a request names none
    #[serde(default = "default_model")]
    pub default_model: ModelEngine,

    /// Highest model the escalation ladder may switch to
    #[serde(default = "default_max_model")]
    pub max_model: ModelEngine,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on rate limits and transient failures
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Tokens reserved for the answer when checking the context budget
    #[serde(default = "default_expected_tokens")]
    pub expected_tokens_in_response: u32,
}

impl LlmConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        use secrecy::ExposeSecret;
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    /// Validate LLM configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ValidationError::InvalidTimeout);
        }

        if self.max_model < self.default_model {
            return Err(ValidationError::CeilingBelowDefault {
                default: self.default_model,
                ceiling: self.max_model,
            });
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ValidationError::InvalidBaseUrl(self.base_url.clone()));
        }

        Ok(())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_model: default_model(),
            max_model: default_max_model(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            expected_tokens_in_response: default_expected_tokens(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> ModelEngine {
    ModelEngine::Gpt35Turbo
}

fn default_max_model() -> ModelEngine {
    ModelEngine::Gpt4Turbo
}

fn default_timeout() -> u64 {
    300
}

fn default_retries() -> u32 {
    5
}

fn default_expected_tokens() -> u32 {
    500
}
