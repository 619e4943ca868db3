//! Shared registry of conversations and the global action log.
//!
//! # Locking
//!
//! - the conversation map is behind a `RwLock`; applying an action holds it
//!   for read until the action is recorded, creating a conversation holds it
//!   for write
//! - each conversation has its own `Mutex`; an action touching several
//!   conversations locks them in name order
//! - the action log has its own `Mutex`, always taken last
//!
//! Sequence numbers are assigned while the map guard and the touched
//! conversations are still held. Whether a web conversation exists is thus
//! fixed relative to the log, and replaying in sequence order reproduces the
//! same interleaving.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use super::render::render_action;
use super::{ActionKind, ConversationAction, RecordedAction};
use crate::domain::conversation::Conversation;
use crate::domain::foundation::{ConversationName, DomainError, ErrorCode, Timestamp};
use crate::ports::ActionObserver;

type ConversationHandle = Arc<Mutex<Conversation>>;

/// Errors raised while rebuilding a registry from a recorded log.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReplayError {
    #[error("Action #{sequence} could not be replayed: {source}")]
    Rejected {
        sequence: u64,
        #[source]
        source: DomainError,
    },

    #[error("Expected action #{expected}, found #{found}")]
    OutOfOrder { expected: u64, found: u64 },
}

/// All conversations of a session plus the ordered log that produced them.
#[derive(Default)]
pub struct ActionsAndConversations {
    conversations: RwLock<BTreeMap<ConversationName, ConversationHandle>>,
    actions: Mutex<Vec<RecordedAction>>,
    observers: RwLock<Vec<Arc<dyn ActionObserver>>>,
}

impl ActionsAndConversations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a registry by re-applying a recorded log from empty state.
    ///
    /// Timestamps and sequence numbers are preserved. Observers are not
    /// attached, so replay is silent.
    pub fn replay<I>(recorded: I) -> Result<Self, ReplayError>
    where
        I: IntoIterator<Item = RecordedAction>,
    {
        let registry = Self::new();
        for (expected, entry) in recorded.into_iter().enumerate() {
            let expected = expected as u64;
            if entry.sequence != expected {
                return Err(ReplayError::OutOfOrder {
                    expected,
                    found: entry.sequence,
                });
            }
            let sequence = entry.sequence;
            registry
                .apply_at(entry.action, entry.applied_at)
                .map_err(|source| ReplayError::Rejected { sequence, source })?;
        }
        Ok(registry)
    }

    pub fn add_observer(&self, observer: Arc<dyn ActionObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    // === Applying ===

    /// Validates and applies an action, then logs it.
    ///
    /// # Errors
    ///
    /// Returns the validation error if a precondition does not hold. Nothing
    /// is mutated and nothing is logged in that case.
    pub fn apply(&self, action: ConversationAction) -> Result<RecordedAction, DomainError> {
        let recorded = self.apply_at(action, Timestamp::now())?;
        tracing::debug!(
            sequence = recorded.sequence,
            conversation = %recorded.action.conversation,
            action = recorded.action.kind.name(),
            "Applied action"
        );
        self.notify(&recorded);
        Ok(recorded)
    }

    fn apply_at(
        &self,
        action: ConversationAction,
        applied_at: Timestamp,
    ) -> Result<RecordedAction, DomainError> {
        if let ActionKind::CreateConversation { .. } = &action.kind {
            return self.create(action, applied_at);
        }

        let map = self
            .conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let handles = handles_for(&map, &action)?;
        let mut locked = LockedConversations::lock(&handles);
        apply_to_locked(&action, &mut locked)?;
        let recorded = self.record(action, applied_at);
        drop(locked);
        drop(map);
        Ok(recorded)
    }

    fn create(
        &self,
        action: ConversationAction,
        applied_at: Timestamp,
    ) -> Result<RecordedAction, DomainError> {
        let ActionKind::CreateConversation { participants } = &action.kind else {
            return Err(DomainError::new(ErrorCode::InternalError, "not a create action"));
        };

        let mut map = self
            .conversations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if map.contains_key(&action.conversation) {
            return Err(DomainError::new(
                ErrorCode::ConversationAlreadyExists,
                format!("Conversation '{}' already exists", action.conversation),
            ));
        }

        let mut names = vec![action.conversation.clone()];
        if let Some(web) = &action.web_conversation {
            if !map.contains_key(web) && *web != action.conversation {
                names.push(web.clone());
            }
        }
        for name in names {
            let mut conversation = Conversation::new(name.clone());
            conversation.add_participants(participants.iter().cloned());
            map.insert(name, Arc::new(Mutex::new(conversation)));
        }

        let recorded = self.record(action, applied_at);
        drop(map);
        Ok(recorded)
    }

    fn record(&self, action: ConversationAction, applied_at: Timestamp) -> RecordedAction {
        let mut actions = self.actions.lock().unwrap_or_else(PoisonError::into_inner);
        let recorded = RecordedAction {
            sequence: actions.len() as u64,
            applied_at,
            action,
        };
        actions.push(recorded.clone());
        recorded
    }

    fn notify(&self, recorded: &RecordedAction) {
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if observers.is_empty() {
            return;
        }
        let rendering = render_action(recorded);
        for observer in observers {
            observer.on_action(recorded, &rendering);
        }
    }

    // === Queries ===

    /// Snapshot of a conversation, or `None` if it was never created.
    pub fn get_conversation(&self, name: &ConversationName) -> Option<Conversation> {
        let handle = self
            .conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()?;
        let conversation = handle.lock().unwrap_or_else(PoisonError::into_inner).clone();
        Some(conversation)
    }

    pub fn contains(&self, name: &ConversationName) -> bool {
        self.conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn conversation_names(&self) -> Vec<ConversationName> {
        self.conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Snapshot of every conversation, keyed by name.
    pub fn snapshot(&self) -> BTreeMap<ConversationName, Conversation> {
        self.conversation_names()
            .into_iter()
            .filter_map(|name| self.get_conversation(&name).map(|c| (name, c)))
            .collect()
    }

    pub fn actions(&self) -> Vec<RecordedAction> {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Actions with sequence numbers from `start` on.
    pub fn actions_from(&self, start: usize) -> Vec<RecordedAction> {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .skip(start)
            .cloned()
            .collect()
    }

    pub fn action_count(&self) -> usize {
        self.actions.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn actions_for_conversation(&self, name: &ConversationName) -> Vec<RecordedAction> {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.action.conversation == *name)
            .cloned()
            .collect()
    }

    pub fn last_action_for_conversation(&self, name: &ConversationName) -> Option<RecordedAction> {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|r| r.action.conversation == *name)
            .cloned()
    }
}

impl std::fmt::Debug for ActionsAndConversations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionsAndConversations")
            .field("conversations", &self.conversation_names())
            .field("actions", &self.action_count())
            .finish()
    }
}

/// Looks up every conversation the action needs.
///
/// A missing primary or copy source is an error. A missing web
/// conversation is skipped, except for typing indicators which only
/// target the web conversation.
fn handles_for(
    map: &BTreeMap<ConversationName, ConversationHandle>,
    action: &ConversationAction,
) -> Result<Vec<(ConversationName, ConversationHandle)>, DomainError> {
    let required = |name: &ConversationName| {
        map.get(name)
            .cloned()
            .ok_or_else(|| DomainError::conversation_not_found(name))
    };

    let mut names: BTreeSet<ConversationName> = BTreeSet::new();
    required(&action.conversation)?;
    names.insert(action.conversation.clone());

    if let ActionKind::CopyMessagesBetweenConversations { source, .. } = &action.kind {
        required(source)?;
        names.insert(source.clone());
    }

    if action.mirrors_to_web() {
        match &action.web_conversation {
            Some(web) if map.contains_key(web) => {
                names.insert(web.clone());
            }
            _ if matches!(action.kind, ActionKind::SetTypingAgent { .. }) => {
                return Err(DomainError::new(
                    ErrorCode::WebConversationMissing,
                    format!(
                        "Typing indicator for '{}' needs an existing web conversation",
                        action.conversation
                    ),
                ));
            }
            _ => {}
        }
    }

    names
        .into_iter()
        .map(|name| required(&name).map(|handle| (name, handle)))
        .collect()
}

/// Guards for every conversation an action touches, taken in name order.
struct LockedConversations<'a> {
    guards: Vec<(ConversationName, MutexGuard<'a, Conversation>)>,
}

impl<'a> LockedConversations<'a> {
    fn lock(handles: &'a [(ConversationName, ConversationHandle)]) -> Self {
        let guards = handles
            .iter()
            .map(|(name, handle)| {
                (
                    name.clone(),
                    handle.lock().unwrap_or_else(PoisonError::into_inner),
                )
            })
            .collect();
        Self { guards }
    }

    fn get(&self, name: &ConversationName) -> Result<&Conversation, DomainError> {
        self.guards
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, guard)| &**guard)
            .ok_or_else(|| DomainError::conversation_not_found(name))
    }

    fn get_mut(&mut self, name: &ConversationName) -> Result<&mut Conversation, DomainError> {
        self.guards
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, guard)| &mut **guard)
            .ok_or_else(|| DomainError::conversation_not_found(name))
    }

    /// The web conversation, if the action names one and it was locked.
    fn web_mut(&mut self, action: &ConversationAction) -> Option<&mut Conversation> {
        let web = action.web_conversation.as_ref()?;
        if *web == action.conversation {
            return None;
        }
        self.get_mut(web).ok()
    }
}

/// Validates, then mutates. Every fallible check runs before the first write.
fn apply_to_locked(
    action: &ConversationAction,
    locked: &mut LockedConversations<'_>,
) -> Result<(), DomainError> {
    let primary = &action.conversation;
    match &action.kind {
        ActionKind::CreateConversation { .. } => Err(DomainError::new(
            ErrorCode::InternalError,
            "create actions are applied against the conversation map",
        )),
        ActionKind::AddParticipants { participants } => {
            locked.get_mut(primary)?.add_participants(participants.iter().cloned());
            if let Some(web) = locked.web_mut(action) {
                web.add_participants(participants.iter().cloned());
            }
            Ok(())
        }
        ActionKind::AppendMessage { message, web_agent }
        | ActionKind::AppendChatgptResponse {
            message, web_agent, ..
        } => {
            locked.get_mut(primary)?.append(message.clone());
            if let Some(web) = locked.web_mut(action) {
                let mirrored = match web_agent {
                    Some(agent) => message.clone().with_agent(Some(agent.clone())),
                    None => message.clone(),
                };
                web.append(mirrored);
            }
            Ok(())
        }
        ActionKind::FailedChatgptResponse { .. } => {
            locked.get(primary)?;
            Ok(())
        }
        ActionKind::DeleteMessages { designation } => {
            let conversation = locked.get_mut(primary)?;
            let indices = designation.resolve(conversation)?;
            conversation.delete(&indices)
        }
        ActionKind::ResetToTag { tag } => locked.get_mut(primary)?.reset_to_tag(tag),
        ActionKind::ReplaceLastResponse { message } => {
            locked.get_mut(primary)?.replace_last(message.clone())
        }
        ActionKind::CopyMessagesBetweenConversations {
            source,
            designation,
        } => {
            let copied: Vec<_> = {
                let source = locked.get(source)?;
                designation
                    .resolve(source)?
                    .into_iter()
                    .filter_map(|i| source.get(i).cloned())
                    .collect()
            };
            let target = locked.get_mut(primary)?;
            for message in copied {
                target.append(message);
            }
            Ok(())
        }
        ActionKind::SetTypingAgent { agent } => {
            let web = locked.web_mut(action).ok_or_else(|| {
                DomainError::new(
                    ErrorCode::WebConversationMissing,
                    format!("No web conversation for '{}'", primary),
                )
            })?;
            web.set_typing_agent(agent.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::{Message, MessageDesignation};
    use crate::domain::foundation::Agent;
    use crate::domain::models::ModelEngine;
    use crate::domain::recovery::LlmFailure;

    fn name(s: &str) -> ConversationName {
        ConversationName::new(s).unwrap()
    }

    fn agents(names: &[&str]) -> BTreeSet<Agent> {
        names.iter().map(|n| Agent::new(*n).unwrap()).collect()
    }

    fn create(registry: &ActionsAndConversations, conv: &str, web: Option<&str>) {
        registry
            .apply(
                ConversationAction::new(
                    name(conv),
                    ActionKind::CreateConversation {
                        participants: agents(&["Performer", "Student"]),
                    },
                )
                .with_web_conversation(web.map(name)),
            )
            .unwrap();
    }

    fn append(registry: &ActionsAndConversations, conv: &str, message: Message) -> RecordedAction {
        registry
            .apply(ConversationAction::new(
                name(conv),
                ActionKind::AppendMessage {
                    message,
                    web_agent: None,
                },
            ))
            .unwrap()
    }

    mod applying {
        use super::*;

        #[test]
        fn create_twice_is_rejected() {
            let registry = ActionsAndConversations::new();
            create(&registry, "research", None);
            let err = registry
                .apply(ConversationAction::new(
                    name("research"),
                    ActionKind::CreateConversation {
                        participants: BTreeSet::new(),
                    },
                ))
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::ConversationAlreadyExists);
            assert_eq!(registry.action_count(), 1);
        }

        #[test]
        fn append_to_missing_conversation_is_rejected() {
            let registry = ActionsAndConversations::new();
            let err = registry
                .apply(ConversationAction::new(
                    name("ghost"),
                    ActionKind::AppendMessage {
                        message: Message::user("hi"),
                        web_agent: None,
                    },
                ))
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::ConversationNotFound);
            assert_eq!(registry.action_count(), 0);
        }

        #[test]
        fn sequences_are_dense() {
            let registry = ActionsAndConversations::new();
            create(&registry, "research", None);
            append(&registry, "research", Message::system("sys"));
            let third = append(&registry, "research", Message::user("q"));
            assert_eq!(third.sequence, 2);
        }

        #[test]
        fn failed_reset_changes_nothing() {
            let registry = ActionsAndConversations::new();
            create(&registry, "research", None);
            append(&registry, "research", Message::system("sys"));
            let result = registry.apply(ConversationAction::new(
                name("research"),
                ActionKind::ResetToTag { tag: "nope".into() },
            ));
            assert_eq!(result.unwrap_err().code, ErrorCode::TagNotFound);
            assert_eq!(registry.get_conversation(&name("research")).unwrap().len(), 1);
            assert_eq!(registry.action_count(), 2);
        }

        #[test]
        fn failed_response_is_logged_without_mutation() {
            let registry = ActionsAndConversations::new();
            create(&registry, "research", None);
            append(&registry, "research", Message::system("sys"));
            registry
                .apply(ConversationAction::new(
                    name("research"),
                    ActionKind::FailedChatgptResponse {
                        model: ModelEngine::Gpt4,
                        hidden_messages: vec![],
                        failure: LlmFailure::transient("timeout"),
                    },
                ))
                .unwrap();
            assert_eq!(registry.get_conversation(&name("research")).unwrap().len(), 1);
            let last = registry.last_action_for_conversation(&name("research")).unwrap();
            assert_eq!(last.action.kind.name(), "FailedChatgptResponse");
        }

        #[test]
        fn copy_appends_designated_messages() {
            let registry = ActionsAndConversations::new();
            create(&registry, "source", None);
            create(&registry, "target", None);
            append(&registry, "source", Message::system("sys"));
            append(&registry, "source", Message::user("q").with_tag(Some("q".into())));
            append(&registry, "source", Message::assistant("a"));

            registry
                .apply(ConversationAction::new(
                    name("target"),
                    ActionKind::CopyMessagesBetweenConversations {
                        source: name("source"),
                        designation: MessageDesignation::Range {
                            start: crate::domain::conversation::Position::Tag("q".into()),
                            end: None,
                        },
                    },
                ))
                .unwrap();

            let target = registry.get_conversation(&name("target")).unwrap();
            let contents: Vec<&str> = target.messages().iter().map(|m| m.content()).collect();
            assert_eq!(contents, vec!["q", "a"]);
        }

        #[test]
        fn copy_within_one_conversation_works() {
            let registry = ActionsAndConversations::new();
            create(&registry, "loop", None);
            append(&registry, "loop", Message::user("echo"));
            registry
                .apply(ConversationAction::new(
                    name("loop"),
                    ActionKind::CopyMessagesBetweenConversations {
                        source: name("loop"),
                        designation: MessageDesignation::last(),
                    },
                ))
                .unwrap();
            assert_eq!(registry.get_conversation(&name("loop")).unwrap().len(), 2);
        }
    }

    mod mirroring {
        use super::*;

        #[test]
        fn create_also_creates_web_conversation() {
            let registry = ActionsAndConversations::new();
            create(&registry, "research", Some("research_web"));
            assert!(registry.contains(&name("research_web")));
            let web = registry.get_conversation(&name("research_web")).unwrap();
            assert_eq!(web.participants().len(), 2);
        }

        #[test]
        fn append_mirrors_with_agent_override() {
            let registry = ActionsAndConversations::new();
            create(&registry, "research", Some("research_web"));
            registry
                .apply(
                    ConversationAction::new(
                        name("research"),
                        ActionKind::AppendMessage {
                            message: Message::user("q").with_agent(Some(Agent::new("Student").unwrap())),
                            web_agent: Some(Agent::new("Performer").unwrap()),
                        },
                    )
                    .with_web_conversation(Some(name("research_web"))),
                )
                .unwrap();

            let primary = registry.get_conversation(&name("research")).unwrap();
            let web = registry.get_conversation(&name("research_web")).unwrap();
            assert_eq!(primary.last_message().unwrap().agent().unwrap().as_str(), "Student");
            assert_eq!(web.last_message().unwrap().agent().unwrap().as_str(), "Performer");
        }

        #[test]
        fn delete_does_not_touch_web_conversation() {
            let registry = ActionsAndConversations::new();
            create(&registry, "research", Some("research_web"));
            registry
                .apply(
                    ConversationAction::new(
                        name("research"),
                        ActionKind::AppendMessage {
                            message: Message::user("q"),
                            web_agent: None,
                        },
                    )
                    .with_web_conversation(Some(name("research_web"))),
                )
                .unwrap();
            registry
                .apply(
                    ConversationAction::new(
                        name("research"),
                        ActionKind::DeleteMessages {
                            designation: MessageDesignation::last(),
                        },
                    )
                    .with_web_conversation(Some(name("research_web"))),
                )
                .unwrap();
            assert!(registry.get_conversation(&name("research")).unwrap().is_empty());
            assert_eq!(registry.get_conversation(&name("research_web")).unwrap().len(), 1);
        }

        #[test]
        fn typing_requires_web_conversation() {
            let registry = ActionsAndConversations::new();
            create(&registry, "research", None);
            let err = registry
                .apply(ConversationAction::new(
                    name("research"),
                    ActionKind::SetTypingAgent {
                        agent: Some(Agent::new("Performer").unwrap()),
                    },
                ))
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::WebConversationMissing);
        }

        #[test]
        fn typing_sets_indicator_on_web_only() {
            let registry = ActionsAndConversations::new();
            create(&registry, "research", Some("research_web"));
            registry
                .apply(
                    ConversationAction::new(
                        name("research"),
                        ActionKind::SetTypingAgent {
                            agent: Some(Agent::new("Performer").unwrap()),
                        },
                    )
                    .with_web_conversation(Some(name("research_web"))),
                )
                .unwrap();
            assert!(registry.get_conversation(&name("research")).unwrap().typing_agent().is_none());
            assert_eq!(
                registry
                    .get_conversation(&name("research_web"))
                    .unwrap()
                    .typing_agent()
                    .unwrap()
                    .as_str(),
                "Performer"
            );
        }
    }

    mod replaying {
        use super::*;

        #[test]
        fn replay_reconstructs_state() {
            let registry = ActionsAndConversations::new();
            create(&registry, "research", Some("research_web"));
            append(&registry, "research", Message::system("sys").with_tag(Some("system_prompt".into())));
            append(&registry, "research", Message::user("q"));
            registry
                .apply(ConversationAction::new(
                    name("research"),
                    ActionKind::ResetToTag {
                        tag: "system_prompt".into(),
                    },
                ))
                .unwrap();

            let replayed = ActionsAndConversations::replay(registry.actions()).unwrap();
            assert_eq!(replayed.snapshot(), registry.snapshot());
            assert_eq!(replayed.actions(), registry.actions());
        }

        #[test]
        fn out_of_order_log_is_rejected() {
            let registry = ActionsAndConversations::new();
            create(&registry, "research", None);
            append(&registry, "research", Message::user("q"));
            let mut actions = registry.actions();
            actions.remove(0);
            let err = ActionsAndConversations::replay(actions).unwrap_err();
            assert!(matches!(err, ReplayError::OutOfOrder { expected: 0, found: 1 }));
        }

        #[test]
        fn invalid_entry_names_its_sequence() {
            let mut actions = Vec::new();
            actions.push(RecordedAction {
                sequence: 0,
                applied_at: Timestamp::now(),
                action: ConversationAction::new(
                    name("ghost"),
                    ActionKind::ResetToTag { tag: "x".into() },
                ),
            });
            let err = ActionsAndConversations::replay(actions).unwrap_err();
            assert!(matches!(err, ReplayError::Rejected { sequence: 0, .. }));
        }
    }

    mod concurrency {
        use super::*;
        use std::thread;

        fn append_mirrored(registry: &ActionsAndConversations, conv: &str, web: &str, content: String) {
            registry
                .apply(
                    ConversationAction::new(
                        name(conv),
                        ActionKind::AppendMessage {
                            message: Message::user(content),
                            web_agent: None,
                        },
                    )
                    .with_web_conversation(Some(name(web))),
                )
                .unwrap();
        }

        fn assert_replays_identically(registry: &ActionsAndConversations) {
            let actions = registry.actions();
            let sequences: Vec<u64> = actions.iter().map(|r| r.sequence).collect();
            assert_eq!(sequences, (0..actions.len() as u64).collect::<Vec<_>>());
            let replayed = ActionsAndConversations::replay(actions).unwrap();
            assert_eq!(replayed.snapshot(), registry.snapshot());
        }

        #[test]
        fn web_created_during_appends_replays_identically() {
            for _ in 0..200 {
                let registry = ActionsAndConversations::new();
                create(&registry, "primary", None);

                thread::scope(|scope| {
                    scope.spawn(|| {
                        for i in 0..20 {
                            append_mirrored(&registry, "primary", "web", format!("m{}", i));
                        }
                    });
                    scope.spawn(|| create(&registry, "web", None));
                });

                assert_replays_identically(&registry);
            }
        }

        #[test]
        fn parallel_appends_and_crossed_copies_replay_identically() {
            let registry = ActionsAndConversations::new();
            create(&registry, "alpha", Some("shared_web"));
            create(&registry, "beta", Some("shared_web"));

            let copy_last = |target: &str, source: &str| {
                for _ in 0..20 {
                    // the source may still be empty
                    let _ = registry.apply(ConversationAction::new(
                        name(target),
                        ActionKind::CopyMessagesBetweenConversations {
                            source: name(source),
                            designation: MessageDesignation::last(),
                        },
                    ));
                }
            };

            thread::scope(|scope| {
                scope.spawn(|| {
                    for i in 0..50 {
                        append_mirrored(&registry, "alpha", "shared_web", format!("a{}", i));
                    }
                });
                scope.spawn(|| {
                    for i in 0..50 {
                        append_mirrored(&registry, "beta", "shared_web", format!("b{}", i));
                    }
                });
                scope.spawn(|| copy_last("beta", "alpha"));
                scope.spawn(|| copy_last("alpha", "beta"));
            });

            assert_eq!(registry.get_conversation(&name("shared_web")).unwrap().len(), 100);
            assert_replays_identically(&registry);
        }
    }

    mod queries {
        use super::*;

        #[test]
        fn actions_are_filtered_by_conversation() {
            let registry = ActionsAndConversations::new();
            create(&registry, "a", None);
            create(&registry, "b", None);
            append(&registry, "a", Message::user("1"));
            append(&registry, "b", Message::user("2"));
            assert_eq!(registry.actions_for_conversation(&name("a")).len(), 2);
            assert_eq!(
                registry.last_action_for_conversation(&name("b")).unwrap().sequence,
                3
            );
            assert_eq!(registry.conversation_names(), vec![name("a"), name("b")]);
        }

        #[test]
        fn missing_conversation_is_none() {
            let registry = ActionsAndConversations::new();
            assert!(registry.get_conversation(&name("nope")).is_none());
            assert!(registry.last_action_for_conversation(&name("nope")).is_none());
        }
    }
}
