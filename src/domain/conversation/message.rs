//! Message entity for conversations.
//!
//! Messages are immutable records of one utterance. Everything about a message
//! is fixed when it is built; the builder-style `with_*` methods consume the
//! message and are only meaningful before it is appended anywhere.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Agent, MessageId};
use crate::domain::models::CallParameters;

/// Role of a message within a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Instructions that frame the conversation.
    System,
    /// Input on the user side.
    User,
    /// Response produced by the LLM.
    Assistant,
    /// Assistant-side content written by the pipeline rather than the LLM.
    Surrogate,
    /// Annotation for human readers; never sent to the LLM.
    Commenter,
}

impl Role {
    /// Returns true if messages with this role are ever sent to the LLM.
    pub fn is_sent_to_llm(&self) -> bool {
        !matches!(self, Role::Commenter)
    }

    /// Returns true for roles spoken on the assistant side.
    pub fn is_assistant_side(&self) -> bool {
        matches!(self, Role::Assistant | Role::Surrogate)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::System => "SYSTEM",
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
            Role::Surrogate => "SURROGATE",
            Role::Commenter => "COMMENTER",
        };
        write!(f, "{}", s)
    }
}

/// An immutable message within a conversation.
///
/// # Invariants
///
/// - `id` is globally unique
/// - role, content and tag never change after construction
/// - `call_parameters` is `None` for human-authored messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    agent: Option<Agent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    context: Vec<Message>,
    #[serde(default)]
    is_code: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    call_parameters: Option<CallParameters>,
    #[serde(default)]
    ignore: bool,
}

impl Message {
    /// Creates a new message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            tag: None,
            agent: None,
            context: Vec::new(),
            is_code: false,
            previous_code: None,
            call_parameters: None,
            ignore: false,
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Creates a surrogate message.
    pub fn surrogate(content: impl Into<String>) -> Self {
        Self::new(Role::Surrogate, content)
    }

    /// Creates a commenter message.
    pub fn commenter(content: impl Into<String>) -> Self {
        Self::new(Role::Commenter, content)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Construction-time attributes
    // ─────────────────────────────────────────────────────────────────────────

    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_agent(mut self, agent: Option<Agent>) -> Self {
        self.agent = agent;
        self
    }

    /// Records the messages this one was generated from.
    pub fn with_context(mut self, context: Vec<Message>) -> Self {
        self.context = context;
        self
    }

    /// Marks the message as code, optionally linking the version it replaces.
    pub fn as_code(mut self, previous_code: Option<String>) -> Self {
        self.is_code = true;
        self.previous_code = previous_code;
        self
    }

    /// Records the parameters used to generate this message.
    ///
    /// An all-empty parameter set is not recorded.
    pub fn with_call_parameters(mut self, params: CallParameters) -> Self {
        self.call_parameters = if params.is_all_none() { None } else { Some(params) };
        self
    }

    /// Keeps the message in the record but out of every LLM payload.
    pub fn ignored(mut self, ignore: bool) -> Self {
        self.ignore = ignore;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn agent(&self) -> Option<&Agent> {
        self.agent.as_ref()
    }

    pub fn context(&self) -> &[Message] {
        &self.context
    }

    pub fn is_code(&self) -> bool {
        self.is_code
    }

    pub fn previous_code(&self) -> Option<&str> {
        self.previous_code.as_deref()
    }

    pub fn call_parameters(&self) -> Option<&CallParameters> {
        self.call_parameters.as_ref()
    }

    pub fn is_ignored(&self) -> bool {
        self.ignore
    }

    /// Returns true if this message may be part of an LLM payload.
    pub fn is_sent_to_llm(&self) -> bool {
        self.role.is_sent_to_llm() && !self.ignore
    }
}
