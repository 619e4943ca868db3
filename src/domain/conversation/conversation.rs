//! Conversation entity - ordered messages plus participants.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use super::Message;
use crate::domain::foundation::{Agent, ConversationName, DomainError, ErrorCode};

/// A named, ordered sequence of messages.
///
/// # Invariants
///
/// - index 0, if present, is conventionally the system message
/// - the participant set never shrinks
/// - tag lookups resolve to the latest message bearing the tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    name: ConversationName,
    messages: Vec<Message>,
    participants: BTreeSet<Agent>,
    typing_agent: Option<Agent>,
}

impl Conversation {
    /// Creates an empty conversation.
    pub fn new(name: ConversationName) -> Self {
        Self {
            name,
            messages: Vec::new(),
            participants: BTreeSet::new(),
            typing_agent: None,
        }
    }

    // === Accessors ===

    pub fn name(&self) -> &ConversationName {
        &self.name
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn participants(&self) -> &BTreeSet<Agent> {
        &self.participants
    }

    /// The agent currently shown as composing a message, if any.
    pub fn typing_agent(&self) -> Option<&Agent> {
        self.typing_agent.as_ref()
    }

    /// Index of the latest message bearing `tag`.
    pub fn index_of_tag(&self, tag: &str) -> Option<usize> {
        self.messages.iter().rposition(|m| m.tag() == Some(tag))
    }

    // === Payload construction ===

    /// Messages with the given indices removed, relative order preserved.
    pub fn get_messages_excluding(&self, hidden: &[usize]) -> Vec<Message> {
        let hidden: HashSet<usize> = hidden.iter().copied().collect();
        self.messages
            .iter()
            .enumerate()
            .filter(|(i, _)| !hidden.contains(i))
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Index/message pairs that would be sent to the LLM.
    ///
    /// Excludes hidden indices, commenter messages and ignored messages.
    pub fn llm_payload(&self, hidden: &[usize]) -> Vec<(usize, Message)> {
        let hidden: HashSet<usize> = hidden.iter().copied().collect();
        self.messages
            .iter()
            .enumerate()
            .filter(|(i, m)| !hidden.contains(i) && m.is_sent_to_llm())
            .map(|(i, m)| (i, m.clone()))
            .collect()
    }

    // === Participants ===

    /// Adds participants. Existing participants are kept.
    pub fn add_participants<I: IntoIterator<Item = Agent>>(&mut self, agents: I) {
        self.participants.extend(agents);
    }

    /// The participant that is not `agent` in a two-party conversation.
    ///
    /// # Errors
    ///
    /// - `NotTwoParticipants` if the conversation does not have exactly two participants
    /// - `UnknownParticipant` if `agent` is not one of them
    pub fn get_other_participant(&self, agent: &Agent) -> Result<Agent, DomainError> {
        if self.participants.len() != 2 {
            return Err(DomainError::new(
                ErrorCode::NotTwoParticipants,
                format!(
                    "Conversation '{}' has {} participants, role reversal needs exactly 2",
                    self.name,
                    self.participants.len()
                ),
            ));
        }
        if !self.participants.contains(agent) {
            return Err(DomainError::new(
                ErrorCode::UnknownParticipant,
                format!("'{}' is not a participant of '{}'", agent, self.name),
            ));
        }
        self.participants
            .iter()
            .find(|p| *p != agent)
            .cloned()
            .ok_or_else(|| DomainError::new(ErrorCode::InternalError, "participant set changed"))
    }

    // === Mutations ===

    /// Appends a message and clears the typing indicator.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        self.typing_agent = None;
    }

    pub fn set_typing_agent(&mut self, agent: Option<Agent>) {
        self.typing_agent = agent;
    }

    /// Truncates the conversation so it ends with the latest message tagged `tag`.
    ///
    /// # Errors
    ///
    /// - `TagNotFound` if no message bears the tag (nothing is removed)
    pub fn reset_to_tag(&mut self, tag: &str) -> Result<(), DomainError> {
        let index = self
            .index_of_tag(tag)
            .ok_or_else(|| DomainError::tag_not_found(tag))?;
        self.messages.truncate(index + 1);
        Ok(())
    }

    /// Deletes the messages at `indices`.
    ///
    /// # Errors
    ///
    /// - `IndexOutOfRange` if any index is invalid (nothing is removed)
    pub fn delete(&mut self, indices: &[usize]) -> Result<(), DomainError> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.messages.len()) {
            return Err(DomainError::index_out_of_range(bad as i64, self.messages.len()));
        }
        let doomed: HashSet<usize> = indices.iter().copied().collect();
        let mut index = 0;
        self.messages.retain(|_| {
            let keep = !doomed.contains(&index);
            index += 1;
            keep
        });
        Ok(())
    }

    /// Replaces the last message.
    ///
    /// # Errors
    ///
    /// - `EmptyConversation` if there is nothing to replace
    pub fn replace_last(&mut self, message: Message) -> Result<(), DomainError> {
        match self.messages.last_mut() {
            Some(last) => {
                *last = message;
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::EmptyConversation,
                format!("Conversation '{}' has no message to replace", self.name),
            )),
        }
    }
}
