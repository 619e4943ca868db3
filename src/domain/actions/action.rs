//! Actions - the only way conversations change.
//!
//! An action fully describes one transition, including failed LLM attempts
//! that change nothing, so the log explains why the state is what it is.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::conversation::{Message, MessageDesignation};
use crate::domain::foundation::{Agent, ConversationName, Timestamp};
use crate::domain::models::ModelEngine;
use crate::domain::recovery::LlmFailure;

/// What an action does.
///
/// Adding a variant forces every `match` on it (apply, render, mirroring) to
/// be updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    CreateConversation {
        participants: BTreeSet<Agent>,
    },
    AddParticipants {
        participants: BTreeSet<Agent>,
    },
    AppendMessage {
        message: Message,
        /// Agent shown in the web conversation instead of the message's own.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        web_agent: Option<Agent>,
    },
    AppendChatgptResponse {
        message: Message,
        hidden_messages: Vec<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        web_agent: Option<Agent>,
    },
    FailedChatgptResponse {
        model: ModelEngine,
        hidden_messages: Vec<usize>,
        failure: LlmFailure,
    },
    DeleteMessages {
        designation: MessageDesignation,
    },
    ResetToTag {
        tag: String,
    },
    ReplaceLastResponse {
        message: Message,
    },
    CopyMessagesBetweenConversations {
        source: ConversationName,
        designation: MessageDesignation,
    },
    SetTypingAgent {
        agent: Option<Agent>,
    },
}

impl ActionKind {
    /// Short name used in renderings and logs.
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::CreateConversation { .. } => "CreateConversation",
            ActionKind::AddParticipants { .. } => "AddParticipants",
            ActionKind::AppendMessage { .. } => "AppendMessage",
            ActionKind::AppendChatgptResponse { .. } => "AppendChatgptResponse",
            ActionKind::FailedChatgptResponse { .. } => "FailedChatgptResponse",
            ActionKind::DeleteMessages { .. } => "DeleteMessages",
            ActionKind::ResetToTag { .. } => "ResetToTag",
            ActionKind::ReplaceLastResponse { .. } => "ReplaceLastResponse",
            ActionKind::CopyMessagesBetweenConversations { .. } => "CopyMessagesBetweenConversations",
            ActionKind::SetTypingAgent { .. } => "SetTypingAgent",
        }
    }
}

/// One transition over a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationAction {
    pub conversation: ConversationName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_conversation: Option<ConversationName>,
    /// Name of the algorithm issuing the action.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub driver: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub kind: ActionKind,
}

impl ConversationAction {
    pub fn new(conversation: ConversationName, kind: ActionKind) -> Self {
        Self {
            conversation,
            web_conversation: None,
            driver: String::new(),
            comment: None,
            kind,
        }
    }

    pub fn with_web_conversation(mut self, web: Option<ConversationName>) -> Self {
        self.web_conversation = web;
        self
    }

    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    /// Conversations whose state this action reads or writes.
    pub fn touched_conversations(&self) -> BTreeSet<ConversationName> {
        let mut names = BTreeSet::new();
        names.insert(self.conversation.clone());
        if self.mirrors_to_web() {
            if let Some(web) = &self.web_conversation {
                names.insert(web.clone());
            }
        }
        if let ActionKind::CopyMessagesBetweenConversations { source, .. } = &self.kind {
            names.insert(source.clone());
        }
        names
    }

    /// True for actions that are projected onto the web conversation.
    pub fn mirrors_to_web(&self) -> bool {
        match self.kind {
            ActionKind::CreateConversation { .. }
            | ActionKind::AddParticipants { .. }
            | ActionKind::AppendMessage { .. }
            | ActionKind::AppendChatgptResponse { .. }
            | ActionKind::SetTypingAgent { .. } => true,
            ActionKind::FailedChatgptResponse { .. }
            | ActionKind::DeleteMessages { .. }
            | ActionKind::ResetToTag { .. }
            | ActionKind::ReplaceLastResponse { .. }
            | ActionKind::CopyMessagesBetweenConversations { .. } => false,
        }
    }
}

/// An applied action with its position in the global log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedAction {
    /// Dense, starting at 0.
    pub sequence: u64,
    pub applied_at: Timestamp,
    pub action: ConversationAction,
}
