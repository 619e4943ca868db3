//! Model engines and their escalation order.
//!
//! Models are totally ordered by declaration order. Escalation always moves to
//! a strictly higher-ranked model, which bounds the number of escalations a
//! single request can go through.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// A chat model the gateway can be asked to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelEngine {
    #[serde(rename = "gpt-3.5-turbo-0613")]
    Gpt35Turbo,
    #[serde(rename = "gpt-3.5-turbo-16k-0613")]
    Gpt35Turbo16k,
    #[serde(rename = "gpt-4")]
    Gpt4,
    #[serde(rename = "gpt-4-1106-preview")]
    Gpt4Turbo,
    #[serde(rename = "meta-llama/Llama-2-7b-chat-hf")]
    Llama2_7b,
    #[serde(rename = "meta-llama/Llama-2-70b-chat-hf")]
    Llama2_70b,
    #[serde(rename = "codellama/CodeLlama-34b-Instruct-hf")]
    CodeLlama,
}

impl ModelEngine {
    /// All models in rank order.
    pub const ALL: [ModelEngine; 7] = [
        ModelEngine::Gpt35Turbo,
        ModelEngine::Gpt35Turbo16k,
        ModelEngine::Gpt4,
        ModelEngine::Gpt4Turbo,
        ModelEngine::Llama2_7b,
        ModelEngine::Llama2_70b,
        ModelEngine::CodeLlama,
    ];

    /// Identifier sent to the provider API.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelEngine::Gpt35Turbo => "gpt-3.5-turbo-0613",
            ModelEngine::Gpt35Turbo16k => "gpt-3.5-turbo-16k-0613",
            ModelEngine::Gpt4 => "gpt-4",
            ModelEngine::Gpt4Turbo => "gpt-4-1106-preview",
            ModelEngine::Llama2_7b => "meta-llama/Llama-2-7b-chat-hf",
            ModelEngine::Llama2_70b => "meta-llama/Llama-2-70b-chat-hf",
            ModelEngine::CodeLlama => "codellama/CodeLlama-34b-Instruct-hf",
        }
    }

    /// Position in the total order.
    pub fn rank(&self) -> usize {
        *self as usize
    }

    /// Context window size in tokens.
    pub fn max_context_tokens(&self) -> u32 {
        match self {
            ModelEngine::Gpt35Turbo => 4_096,
            ModelEngine::Gpt35Turbo16k => 16_384,
            ModelEngine::Gpt4 => 8_192,
            ModelEngine::Gpt4Turbo => 128_000,
            ModelEngine::Llama2_7b | ModelEngine::Llama2_70b | ModelEngine::CodeLlama => 4_096,
        }
    }

    /// Next model with a larger context window, if any.
    pub fn next_with_more_context(&self) -> Option<ModelEngine> {
        match self {
            ModelEngine::Gpt35Turbo => Some(ModelEngine::Gpt35Turbo16k),
            ModelEngine::Gpt35Turbo16k | ModelEngine::Gpt4 => Some(ModelEngine::Gpt4Turbo),
            ModelEngine::Gpt4Turbo
            | ModelEngine::Llama2_7b
            | ModelEngine::Llama2_70b
            | ModelEngine::CodeLlama => None,
        }
    }

    /// Next stronger model, if any.
    pub fn next_with_more_strength(&self) -> Option<ModelEngine> {
        match self {
            ModelEngine::Gpt35Turbo | ModelEngine::Gpt35Turbo16k | ModelEngine::Gpt4 => {
                Some(ModelEngine::Gpt4Turbo)
            }
            ModelEngine::Llama2_7b => Some(ModelEngine::Llama2_70b),
            ModelEngine::Llama2_70b => Some(ModelEngine::CodeLlama),
            ModelEngine::Gpt4Turbo | ModelEngine::CodeLlama => None,
        }
    }
}

impl fmt::Display for ModelEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ModelEngine {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelEngine::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ValidationError::invalid_format("model", format!("unknown model '{}'", s)))
    }
}
