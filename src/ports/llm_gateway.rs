//! LLM Gateway Port - Interface for chat completion providers.
//!
//! The conversation manager builds a [`CompletionRequest`] from the visible
//! part of a conversation and hands it to a gateway. A gateway either returns
//! the completion text or a typed [`LlmFailure`] that drives the recovery
//! ladder.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoGateway;
//!
//! #[async_trait]
//! impl LlmGateway for EchoGateway {
//!     async fn complete(&self, request: CompletionRequest) -> Result<String, LlmFailure> {
//!         Ok(request.messages.last().map(|m| m.content.clone()).unwrap_or_default())
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::conversation::{Message, Role};
use crate::domain::models::{CallParameters, ModelEngine};

pub use crate::domain::recovery::{FailureKind, LlmFailure};

/// Port for chat completion providers.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Sends the request and returns the completion text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmFailure>;
}

/// Role of a message as understood by chat completion APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    /// Maps a conversation role onto the wire role.
    ///
    /// Surrogate messages stand in for the assistant. Commenter messages are
    /// never sent, so they have no wire role.
    pub fn from_role(role: Role) -> Option<Self> {
        match role {
            Role::System => Some(ChatRole::System),
            Role::User => Some(ChatRole::User),
            Role::Assistant | Role::Surrogate => Some(ChatRole::Assistant),
            Role::Commenter => None,
        }
    }
}

/// A message on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Request for a chat completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Messages in conversation order.
    pub messages: Vec<ChatMessage>,
    /// Model to use.
    pub model: ModelEngine,
    /// Sampling options. `parameters.model` is ignored in favor of `model`.
    pub parameters: CallParameters,
    /// Tokens reserved for the answer when checking the context budget.
    pub expected_tokens_in_response: u32,
}

impl CompletionRequest {
    pub fn new(model: ModelEngine) -> Self {
        Self {
            messages: Vec::new(),
            model,
            parameters: CallParameters::default(),
            expected_tokens_in_response: 0,
        }
    }

    /// Builds a request from conversation messages, skipping those that have
    /// no wire role.
    pub fn from_messages<'a, I>(model: ModelEngine, messages: I) -> Self
    where
        I: IntoIterator<Item = &'a Message>,
    {
        let messages = messages
            .into_iter()
            .filter_map(|m| ChatRole::from_role(m.role()).map(|role| ChatMessage::new(role, m.content())))
            .collect();
        Self {
            messages,
            ..Self::new(model)
        }
    }

    pub fn with_message(mut self, role: ChatRole, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::new(role, content));
        self
    }

    pub fn with_parameters(mut self, parameters: CallParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_expected_tokens(mut self, tokens: u32) -> Self {
        self.expected_tokens_in_response = tokens;
        self
    }

    /// Total characters across all message contents.
    pub fn content_chars(&self) -> usize {
        self.messages.iter().map(|m| m.content.chars().count()).sum()
    }
}
