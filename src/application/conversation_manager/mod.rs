//! ConversationManager - drives one named conversation through actions.
//!
//! Every change goes through the shared [`ActionsAndConversations`] registry,
//! so the action log stays the single source of truth. When an
//! [`ActionLogWriter`] is attached, each applied action is synced to the store
//! before the operation returns. A failed sync is logged and retried on the
//! next one; it never fails an operation whose action was already applied.

mod acquisition;
mod errors;
mod requests;

pub use errors::ManagerError;
pub use requests::{MessageRequest, ResponseRequest};

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;

use crate::application::ActionLogWriter;
use crate::config::LlmConfig;
use crate::domain::actions::{ActionKind, ActionsAndConversations, ConversationAction, RecordedAction};
use crate::domain::conversation::{Conversation, Message, MessageDesignation, Role};
use crate::domain::foundation::{Agent, ConversationName, DomainError};
use crate::domain::models::ModelEngine;
use crate::ports::LlmGateway;

/// Tag given to system prompts unless the caller picks another.
pub const SYSTEM_PROMPT_TAG: &str = "system_prompt";

/// Model selection and token reservation used for LLM calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerSettings {
    pub default_model: ModelEngine,
    /// Escalation never goes above this model.
    pub max_model: ModelEngine,
    pub expected_tokens_in_response: u32,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default())
    }
}

impl ManagerSettings {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            default_model: config.default_model,
            max_model: config.max_model,
            expected_tokens_in_response: config.expected_tokens_in_response,
        }
    }
}

/// Manages one conversation, optionally mirrored into a web conversation.
pub struct ConversationManager<G>
where
    G: LlmGateway,
{
    registry: Arc<ActionsAndConversations>,
    gateway: Arc<G>,
    log_writer: Option<Arc<ActionLogWriter>>,
    settings: ManagerSettings,
    conversation_name: ConversationName,
    web_conversation_name: Option<ConversationName>,
    driver: String,
    assistant_agent: Option<Agent>,
    user_agent: Option<Agent>,
}

impl<G> ConversationManager<G>
where
    G: LlmGateway,
{
    pub fn new(
        registry: Arc<ActionsAndConversations>,
        gateway: Arc<G>,
        conversation_name: ConversationName,
    ) -> Self {
        Self {
            registry,
            gateway,
            log_writer: None,
            settings: ManagerSettings::default(),
            conversation_name,
            web_conversation_name: None,
            driver: String::new(),
            assistant_agent: None,
            user_agent: None,
        }
    }

    pub fn with_web_conversation(mut self, name: ConversationName) -> Self {
        self.web_conversation_name = Some(name);
        self
    }

    /// Name of the algorithm recorded on every action.
    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }

    pub fn with_agents(mut self, assistant: Option<Agent>, user: Option<Agent>) -> Self {
        self.assistant_agent = assistant;
        self.user_agent = user;
        self
    }

    pub fn with_settings(mut self, settings: ManagerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_log_writer(mut self, writer: Arc<ActionLogWriter>) -> Self {
        self.log_writer = Some(writer);
        self
    }

    // === Queries ===

    pub fn conversation_name(&self) -> &ConversationName {
        &self.conversation_name
    }

    pub fn web_conversation_name(&self) -> Option<&ConversationName> {
        self.web_conversation_name.as_ref()
    }

    pub fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    /// Snapshot of the managed conversation, if it exists.
    pub fn conversation(&self) -> Option<Conversation> {
        self.registry.get_conversation(&self.conversation_name)
    }

    /// Snapshot of the web conversation, if one is named and exists.
    pub fn web_conversation(&self) -> Option<Conversation> {
        self.web_conversation_name
            .as_ref()
            .and_then(|name| self.registry.get_conversation(name))
    }

    fn require_conversation(&self) -> Result<Conversation, ManagerError> {
        self.conversation()
            .ok_or_else(|| DomainError::conversation_not_found(&self.conversation_name).into())
    }

    fn participants(&self) -> BTreeSet<Agent> {
        self.assistant_agent
            .iter()
            .chain(self.user_agent.iter())
            .cloned()
            .collect()
    }

    /// Agent speaking a message of the given role.
    fn agent_for_role(&self, role: Role) -> Option<Agent> {
        match role {
            Role::System | Role::Assistant | Role::Surrogate => self.assistant_agent.clone(),
            Role::User => self.user_agent.clone(),
            Role::Commenter => None,
        }
    }

    // === Applying ===

    async fn apply(
        &self,
        kind: ActionKind,
        comment: Option<String>,
    ) -> Result<RecordedAction, ManagerError> {
        let action = ConversationAction::new(self.conversation_name.clone(), kind)
            .with_web_conversation(self.web_conversation_name.clone())
            .with_driver(self.driver.clone())
            .with_comment(comment);
        let recorded = self.registry.apply(action)?;
        self.persist(recorded.sequence).await;
        Ok(recorded)
    }

    /// Best-effort sync after an applied action.
    ///
    /// The action is already part of the registry, so a store failure must
    /// not turn the operation into an error. Unsynced actions stay pending in
    /// the writer and go out with the next sync or [`Self::flush_action_log`].
    async fn persist(&self, sequence: u64) {
        let Some(writer) = &self.log_writer else {
            return;
        };
        if let Err(e) = writer.sync(&self.registry).await {
            let persisted = writer.persisted_count().await;
            warn!(
                conversation = %self.conversation_name,
                sequence,
                persisted,
                error = %e,
                "Action applied but not yet persisted"
            );
        }
    }

    /// Writes every pending action to the attached store.
    ///
    /// Returns how many actions were written, 0 without a store.
    ///
    /// # Errors
    ///
    /// - `Storage` if the store rejects an append
    pub async fn flush_action_log(&self) -> Result<usize, ManagerError> {
        match &self.log_writer {
            Some(writer) => Ok(writer.sync(&self.registry).await?),
            None => Ok(0),
        }
    }

    /// Agent shown in the web conversation in place of `agent`.
    fn reversed_for_web(&self, agent: &Agent) -> Result<Option<Agent>, ManagerError> {
        match self.web_conversation() {
            Some(web) => Ok(Some(web.get_other_participant(agent)?)),
            None => Ok(None),
        }
    }

    /// Shows `agent` as typing in the web conversation, if there is one.
    async fn set_typing(&self, agent: Option<Agent>, reverse: bool) -> Result<(), ManagerError> {
        let Some(agent) = agent else {
            return Ok(());
        };
        if self.web_conversation().is_none() {
            return Ok(());
        }
        let agent = if reverse {
            self.reversed_for_web(&agent)?.unwrap_or(agent)
        } else {
            agent
        };
        self.apply(ActionKind::SetTypingAgent { agent: Some(agent) }, None)
            .await?;
        Ok(())
    }

    async fn clear_typing(&self) -> Result<(), ManagerError> {
        let typing = self
            .web_conversation()
            .map(|web| web.typing_agent().is_some())
            .unwrap_or(false);
        if typing {
            self.apply(ActionKind::SetTypingAgent { agent: None }, None)
                .await?;
        }
        Ok(())
    }

    // === Lifecycle ===

    /// Creates the conversation with the assistant and user agents as participants.
    pub async fn create_conversation(&self) -> Result<RecordedAction, ManagerError> {
        self.apply(
            ActionKind::CreateConversation {
                participants: self.participants(),
            },
            None,
        )
        .await
    }

    pub async fn add_participants(
        &self,
        participants: BTreeSet<Agent>,
    ) -> Result<RecordedAction, ManagerError> {
        self.apply(ActionKind::AddParticipants { participants }, None)
            .await
    }

    /// Creates the conversation, or adds any missing participants.
    ///
    /// Returns true if the conversation was created.
    pub async fn initialize_conversation_if_needed(&self) -> Result<bool, ManagerError> {
        match self.conversation() {
            None => {
                self.create_conversation().await?;
                Ok(true)
            }
            Some(conversation) => {
                let missing: BTreeSet<Agent> = self
                    .participants()
                    .difference(conversation.participants())
                    .cloned()
                    .collect();
                if !missing.is_empty() {
                    self.add_participants(missing).await?;
                }
                Ok(false)
            }
        }
    }

    // === Appending ===

    /// Appends an already-built message.
    pub async fn append_message(
        &self,
        message: Message,
        comment: Option<String>,
        reverse_roles_for_web: bool,
    ) -> Result<RecordedAction, ManagerError> {
        let web_agent = match (reverse_roles_for_web, message.agent()) {
            (true, Some(agent)) => self.reversed_for_web(agent)?,
            _ => None,
        };
        self.apply(ActionKind::AppendMessage { message, web_agent }, comment)
            .await
    }

    /// Builds a message from a request and appends it.
    pub async fn create_and_append_message(
        &self,
        request: MessageRequest,
    ) -> Result<Message, ManagerError> {
        let agent = self.agent_for_role(request.role);
        self.set_typing(agent.clone(), request.reverse_roles_for_web)
            .await?;

        let mut message = Message::new(request.role, request.content)
            .with_tag(request.tag)
            .with_agent(agent)
            .with_context(request.context)
            .ignored(request.ignore);
        if let Some(previous_code) = request.previous_code {
            message = message.as_code(Some(previous_code));
        }

        self.append_message(message.clone(), request.comment, request.reverse_roles_for_web)
            .await?;
        Ok(message)
    }

    /// Appends a system prompt, tagged `system_prompt` by default.
    pub async fn append_system_message(
        &self,
        content: impl Into<String>,
        tag: Option<String>,
        comment: Option<String>,
    ) -> Result<Message, ManagerError> {
        let tag = tag.unwrap_or_else(|| SYSTEM_PROMPT_TAG.to_string());
        self.append_with_role(Role::System, content, Some(tag), comment)
            .await
    }

    pub async fn append_user_message(
        &self,
        content: impl Into<String>,
        tag: Option<String>,
        comment: Option<String>,
    ) -> Result<Message, ManagerError> {
        self.append_with_role(Role::User, content, tag, comment)
            .await
    }

    pub async fn append_commenter_message(
        &self,
        content: impl Into<String>,
        tag: Option<String>,
        comment: Option<String>,
    ) -> Result<Message, ManagerError> {
        self.append_with_role(Role::Commenter, content, tag, comment)
            .await
    }

    /// Appends a message written locally but presented as the assistant's.
    pub async fn append_surrogate_message(
        &self,
        content: impl Into<String>,
        tag: Option<String>,
        comment: Option<String>,
    ) -> Result<Message, ManagerError> {
        self.append_with_role(Role::Surrogate, content, tag, comment)
            .await
    }

    async fn append_with_role(
        &self,
        role: Role,
        content: impl Into<String>,
        tag: Option<String>,
        comment: Option<String>,
    ) -> Result<Message, ManagerError> {
        let mut request = MessageRequest::new(role, content);
        request.tag = tag;
        request.comment = comment;
        self.create_and_append_message(request).await
    }

    // === Editing ===

    /// Truncates the conversation right after the latest message tagged `tag`.
    pub async fn reset_back_to_tag(
        &self,
        tag: impl Into<String>,
        comment: Option<String>,
    ) -> Result<RecordedAction, ManagerError> {
        self.apply(ActionKind::ResetToTag { tag: tag.into() }, comment)
            .await
    }

    pub async fn delete_messages(
        &self,
        designation: MessageDesignation,
        comment: Option<String>,
    ) -> Result<RecordedAction, ManagerError> {
        self.apply(ActionKind::DeleteMessages { designation }, comment)
            .await
    }

    /// Replaces the last message with a surrogate spoken by the assistant agent.
    pub async fn replace_last_response(
        &self,
        content: impl Into<String>,
        tag: Option<String>,
        comment: Option<String>,
    ) -> Result<Message, ManagerError> {
        let message = Message::surrogate(content)
            .with_tag(tag)
            .with_agent(self.assistant_agent.clone());
        self.apply(
            ActionKind::ReplaceLastResponse {
                message: message.clone(),
            },
            comment,
        )
        .await?;
        Ok(message)
    }

    pub async fn copy_messages_from_another_conversation(
        &self,
        source: ConversationName,
        designation: MessageDesignation,
        comment: Option<String>,
    ) -> Result<RecordedAction, ManagerError> {
        self.apply(
            ActionKind::CopyMessagesBetweenConversations {
                source,
                designation,
            },
            comment,
        )
        .await
    }
}
