//! Request objects for manager operations.

use crate::domain::conversation::{Message, MessageDesignation, Role};
use crate::domain::models::CallParameters;

/// Parameters for appending a locally authored message.
#[derive(Debug, Clone)]
pub struct MessageRequest {
    pub role: Role,
    pub content: String,
    pub tag: Option<String>,
    pub comment: Option<String>,
    /// Keep in the record but never send to the LLM.
    pub ignore: bool,
    pub previous_code: Option<String>,
    pub context: Vec<Message>,
    /// Show the message in the web conversation as coming from the other participant.
    pub reverse_roles_for_web: bool,
}

impl MessageRequest {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tag: None,
            comment: None,
            ignore: false,
            previous_code: None,
            context: Vec::new(),
            reverse_roles_for_web: false,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }

    pub fn with_previous_code(mut self, code: impl Into<String>) -> Self {
        self.previous_code = Some(code.into());
        self
    }

    pub fn with_context(mut self, context: Vec<Message>) -> Self {
        self.context = context;
        self
    }

    pub fn reversed_for_web(mut self) -> Self {
        self.reverse_roles_for_web = true;
        self
    }
}

/// Parameters for requesting an assistant response.
#[derive(Debug, Clone)]
pub struct ResponseRequest {
    pub tag: Option<String>,
    pub comment: Option<String>,
    pub is_code: bool,
    pub previous_code: Option<String>,
    /// Messages left out of the payload from the first attempt on.
    pub hidden_messages: MessageDesignation,
    /// `model` here overrides the configured default.
    pub call_parameters: CallParameters,
    /// Overrides the configured reservation for the answer.
    pub expected_tokens_in_response: Option<u32>,
}

impl Default for ResponseRequest {
    fn default() -> Self {
        Self {
            tag: None,
            comment: None,
            is_code: false,
            previous_code: None,
            hidden_messages: MessageDesignation::none(),
            call_parameters: CallParameters::default(),
            expected_tokens_in_response: None,
        }
    }
}

impl ResponseRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    /// Marks the response as code, labeling its first fenced block.
    pub fn as_code(mut self, previous_code: Option<String>) -> Self {
        self.is_code = true;
        self.previous_code = previous_code;
        self
    }

    pub fn with_hidden_messages(mut self, hidden: MessageDesignation) -> Self {
        self.hidden_messages = hidden;
        self
    }

    pub fn with_call_parameters(mut self, params: CallParameters) -> Self {
        self.call_parameters = params;
        self
    }

    pub fn with_expected_tokens(mut self, tokens: u32) -> Self {
        self.expected_tokens_in_response = Some(tokens);
        self
    }
}
