//! Assistant responses: acquisition with escalation, and regeneration.

use tracing::{error, info, warn};

use super::{ConversationManager, ManagerError, ResponseRequest};
use crate::domain::actions::ActionKind;
use crate::domain::conversation::{label_first_code_block, Message, MessageDesignation, Role};
use crate::domain::models::{CallParameters, ModelEngine};
use crate::domain::recovery::{LadderStep, RecoveryLadder};
use crate::ports::{CompletionRequest, LlmGateway};

const CODE_LABEL: &str = "python";

impl<G> ConversationManager<G>
where
    G: LlmGateway,
{
    /// Asks the LLM for the next assistant message and appends it.
    ///
    /// Failed calls are logged as `FailedChatgptResponse` and recovered by
    /// escalating the model up to the configured ceiling, then by hiding the
    /// earliest visible message after the system prompt.
    ///
    /// # Errors
    ///
    /// - `EscalationExhausted` once neither recovery is possible
    /// - `Validation` if the conversation is missing or the hidden
    ///   designation does not resolve
    pub async fn get_and_append_assistant_message(
        &self,
        request: ResponseRequest,
    ) -> Result<Message, ManagerError> {
        let conversation = self.require_conversation()?;
        let hidden = request.hidden_messages.resolve(&conversation)?;
        self.set_typing(self.assistant_agent.clone(), false).await?;

        let requested_model = request.call_parameters.model;
        let starting_model = requested_model.unwrap_or(self.settings.default_model);
        let expected_tokens = request
            .expected_tokens_in_response
            .unwrap_or(self.settings.expected_tokens_in_response);
        let mut ladder = RecoveryLadder::new(starting_model, self.settings.max_model, hidden);

        loop {
            let payload = conversation.llm_payload(ladder.hidden());
            let indices: Vec<usize> = payload.iter().map(|(i, _)| *i).collect();
            let sent: Vec<Message> = payload.into_iter().map(|(_, m)| m).collect();
            let parameters = effective_parameters(
                &request.call_parameters,
                requested_model,
                starting_model,
                ladder.model(),
            );

            let completion = CompletionRequest::from_messages(ladder.model(), &sent)
                .with_parameters(parameters.clone())
                .with_expected_tokens(expected_tokens);

            match self.gateway.complete(completion).await {
                Ok(content) => {
                    ladder.record_success();
                    let message = self.build_response(&request, content, sent, parameters);
                    self.apply(
                        ActionKind::AppendChatgptResponse {
                            message: message.clone(),
                            hidden_messages: ladder.hidden().to_vec(),
                            web_agent: None,
                        },
                        request.comment.clone(),
                    )
                    .await?;
                    return Ok(message);
                }
                Err(failure) => {
                    warn!(
                        conversation = %self.conversation_name,
                        model = %ladder.model(),
                        hidden = ?ladder.hidden(),
                        error = %failure,
                        "LLM call failed"
                    );
                    self.apply(
                        ActionKind::FailedChatgptResponse {
                            model: ladder.model(),
                            hidden_messages: ladder.hidden().to_vec(),
                            failure: failure.clone(),
                        },
                        request.comment.clone(),
                    )
                    .await?;

                    match ladder.record_failure(failure, &indices) {
                        LadderStep::Escalate { from, to } => {
                            info!(
                                conversation = %self.conversation_name,
                                from = %from,
                                to = %to,
                                "Escalating model"
                            );
                        }
                        LadderStep::Shrink { hidden_index } => {
                            info!(
                                conversation = %self.conversation_name,
                                hidden_index,
                                "Hiding message to shrink context"
                            );
                        }
                        LadderStep::Exhausted => {
                            let attempts = ladder.into_attempts();
                            error!(
                                conversation = %self.conversation_name,
                                attempts = attempts.len(),
                                "LLM recovery exhausted"
                            );
                            self.clear_typing().await?;
                            return Err(ManagerError::EscalationExhausted { attempts });
                        }
                    }
                }
            }
        }
    }

    fn build_response(
        &self,
        request: &ResponseRequest,
        content: String,
        sent: Vec<Message>,
        parameters: CallParameters,
    ) -> Message {
        let content = if request.is_code {
            label_first_code_block(&content, CODE_LABEL)
        } else {
            content
        };
        let message = Message::assistant(content)
            .with_tag(request.tag.clone())
            .with_agent(self.assistant_agent.clone())
            .with_context(sent)
            .with_call_parameters(parameters);
        if request.is_code {
            message.as_code(request.previous_code.clone())
        } else {
            message
        }
    }

    /// Deletes the last LLM response and asks again with the same settings.
    ///
    /// # Errors
    ///
    /// - `PreconditionViolated` unless the latest action on this conversation
    ///   appended an LLM response and that response is still the last message
    pub async fn regenerate_previous_response(
        &self,
        comment: Option<String>,
    ) -> Result<Message, ManagerError> {
        let last_action = self
            .registry
            .last_action_for_conversation(&self.conversation_name)
            .ok_or_else(|| ManagerError::precondition("conversation has no actions"))?;
        let ActionKind::AppendChatgptResponse {
            hidden_messages, ..
        } = last_action.action.kind
        else {
            return Err(ManagerError::precondition(format!(
                "last action is {}, not an LLM response",
                last_action.action.kind.name()
            )));
        };

        let conversation = self.require_conversation()?;
        let last = conversation
            .last_message()
            .cloned()
            .ok_or_else(|| ManagerError::precondition("conversation is empty"))?;
        if last.role() != Role::Assistant {
            return Err(ManagerError::precondition(format!(
                "last message is {}, not an assistant response",
                last.role()
            )));
        }

        self.delete_messages(MessageDesignation::last(), comment.clone())
            .await?;

        let mut request = ResponseRequest::new()
            .with_comment(comment)
            .with_hidden_messages(MessageDesignation::indices(&hidden_messages))
            .with_call_parameters(last.call_parameters().cloned().unwrap_or_default());
        request.tag = last.tag().map(str::to_string);
        if last.is_code() {
            request = request.as_code(last.previous_code().map(str::to_string));
        }
        self.get_and_append_assistant_message(request).await
    }
}

/// Parameters recorded on the response and sent with the call.
///
/// The model is pinned only when the caller chose it or the ladder moved
/// away from the default, so an unescalated default response stays
/// parameter-free.
fn effective_parameters(
    requested: &CallParameters,
    requested_model: Option<ModelEngine>,
    starting_model: ModelEngine,
    current_model: ModelEngine,
) -> CallParameters {
    let mut parameters = requested.clone();
    if requested_model.is_some() || current_model != starting_model {
        parameters.model = Some(current_model);
    }
    parameters
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::llm::MockGateway;
    use crate::application::conversation_manager::ManagerSettings;
    use crate::domain::actions::ActionsAndConversations;
    use crate::domain::foundation::{Agent, ConversationName};
    use crate::domain::recovery::LlmFailure;

    fn name(s: &str) -> ConversationName {
        ConversationName::new(s).unwrap()
    }

    fn settings(default_model: ModelEngine, max_model: ModelEngine) -> ManagerSettings {
        ManagerSettings {
            default_model,
            max_model,
            expected_tokens_in_response: 500,
        }
    }

    async fn seeded(
        gateway: MockGateway,
        settings: ManagerSettings,
    ) -> (Arc<ActionsAndConversations>, Arc<MockGateway>, ConversationManager<MockGateway>) {
        let registry = Arc::new(ActionsAndConversations::new());
        let gateway = Arc::new(gateway);
        let manager = ConversationManager::new(registry.clone(), gateway.clone(), name("research"))
            .with_web_conversation(name("research_web"))
            .with_agents(Some(Agent::new("Performer").unwrap()), Some(Agent::new("Reviewer").unwrap()))
            .with_settings(settings);
        manager.create_conversation().await.unwrap();
        manager.append_system_message("You are helpful.", None, None).await.unwrap();
        manager.append_user_message("Q1", None, None).await.unwrap();
        (registry, gateway, manager)
    }

    fn kinds(registry: &ActionsAndConversations) -> Vec<&'static str> {
        registry.actions().iter().map(|r| r.action.kind.name()).collect()
    }

    mod acquisition {
        use super::*;

        #[tokio::test]
        async fn success_appends_response_with_sent_context() {
            let (_, gateway, manager) = seeded(
                MockGateway::new().with_response("A1"),
                settings(ModelEngine::Gpt35Turbo, ModelEngine::Gpt4Turbo),
            )
            .await;

            let message = manager
                .get_and_append_assistant_message(ResponseRequest::new().with_tag("answer"))
                .await
                .unwrap();

            assert_eq!(message.content(), "A1");
            assert_eq!(message.tag(), Some("answer"));
            assert_eq!(message.context().len(), 2);
            assert!(message.call_parameters().is_none());
            assert_eq!(gateway.call_count(), 1);
            assert_eq!(gateway.calls()[0].model, ModelEngine::Gpt35Turbo);
            assert_eq!(manager.conversation().unwrap().len(), 3);
            assert_eq!(manager.web_conversation().unwrap().len(), 3);
        }

        #[tokio::test]
        async fn code_responses_are_labeled() {
            let (_, _, manager) = seeded(
                MockGateway::new().with_response("Here:\n```\nprint(1)\n```"),
                ManagerSettings::default(),
            )
            .await;

            let message = manager
                .get_and_append_assistant_message(ResponseRequest::new().as_code(Some("x = 0".into())))
                .await
                .unwrap();

            assert!(message.content().contains("```python\nprint(1)"));
            assert!(message.is_code());
            assert_eq!(message.previous_code(), Some("x = 0"));
        }

        #[tokio::test]
        async fn escalation_pins_model_on_response() {
            let (registry, gateway, manager) = seeded(
                MockGateway::new()
                    .with_failure(LlmFailure::context_too_long("too long"))
                    .with_response("A1"),
                settings(ModelEngine::Gpt35Turbo, ModelEngine::Gpt4Turbo),
            )
            .await;

            let message = manager
                .get_and_append_assistant_message(ResponseRequest::new())
                .await
                .unwrap();

            let calls = gateway.calls();
            assert_eq!(calls.len(), 2);
            assert!(calls[1].model > calls[0].model);
            assert_eq!(
                message.call_parameters().and_then(|p| p.model),
                Some(calls[1].model)
            );
            assert_eq!(
                &kinds(&registry)[5..],
                &["SetTypingAgent", "FailedChatgptResponse", "AppendChatgptResponse"]
            );
        }

        #[tokio::test]
        async fn shrinking_never_hides_system_prompt() {
            let (registry, gateway, manager) = seeded(
                MockGateway::new()
                    .with_failure(LlmFailure::context_too_long("too long"))
                    .with_response("A1"),
                settings(ModelEngine::Gpt4Turbo, ModelEngine::Gpt4Turbo),
            )
            .await;
            manager.append_surrogate_message("A0", None, None).await.unwrap();
            manager.append_user_message("Q2", None, None).await.unwrap();

            manager
                .get_and_append_assistant_message(ResponseRequest::new())
                .await
                .unwrap();

            assert_eq!(gateway.calls()[1].messages.len(), 3);
            let last = registry.last_action_for_conversation(&name("research")).unwrap();
            match last.action.kind {
                ActionKind::AppendChatgptResponse { hidden_messages, .. } => {
                    assert_eq!(hidden_messages, vec![1]);
                }
                other => panic!("unexpected action {:?}", other),
            }
        }

        #[tokio::test]
        async fn exhaustion_reports_every_attempt_and_clears_typing() {
            let (registry, gateway, manager) = seeded(
                MockGateway::always_failing(LlmFailure::malformed("no content")),
                settings(ModelEngine::Gpt4Turbo, ModelEngine::Gpt4Turbo),
            )
            .await;

            let err = manager
                .get_and_append_assistant_message(ResponseRequest::new())
                .await
                .unwrap_err();

            assert_eq!(err.attempts().len(), gateway.call_count());
            let failures = kinds(&registry)
                .into_iter()
                .filter(|k| *k == "FailedChatgptResponse")
                .count();
            assert_eq!(failures, gateway.call_count());
            assert_eq!(manager.conversation().unwrap().len(), 2);
            assert!(manager.web_conversation().unwrap().typing_agent().is_none());
        }

        #[tokio::test]
        async fn missing_conversation_is_a_validation_error() {
            let manager = ConversationManager::new(
                Arc::new(ActionsAndConversations::new()),
                Arc::new(MockGateway::new()),
                name("ghost"),
            );
            let err = manager
                .get_and_append_assistant_message(ResponseRequest::new())
                .await
                .unwrap_err();
            assert!(matches!(err, ManagerError::Validation(_)));
        }
    }

    mod regeneration {
        use super::*;

        #[tokio::test]
        async fn reuses_tag_hidden_set_and_parameters() {
            let (registry, gateway, manager) = seeded(
                MockGateway::new().with_response("first").with_response("second"),
                ManagerSettings::default(),
            )
            .await;
            let params = CallParameters::new().with_temperature(0.2);
            manager
                .get_and_append_assistant_message(
                    ResponseRequest::new()
                        .with_tag("draft1")
                        .with_call_parameters(params.clone())
                        .with_hidden_messages(MessageDesignation::indices(&[1])),
                )
                .await
                .unwrap();

            let message = manager.regenerate_previous_response(None).await.unwrap();

            assert_eq!(message.content(), "second");
            assert_eq!(message.tag(), Some("draft1"));
            assert_eq!(message.call_parameters(), Some(&params));
            assert_eq!(gateway.calls()[1].messages.len(), 1);
            assert_eq!(manager.conversation().unwrap().len(), 3);
            assert!(kinds(&registry).contains(&"DeleteMessages"));
        }

        #[tokio::test]
        async fn rejects_when_last_action_is_not_a_response() {
            let (_, gateway, manager) = seeded(MockGateway::new(), ManagerSettings::default()).await;

            let err = manager.regenerate_previous_response(None).await.unwrap_err();

            assert!(matches!(err, ManagerError::PreconditionViolated(_)));
            assert_eq!(gateway.call_count(), 0);
        }
    }

    #[test]
    fn default_model_response_stays_parameter_free() {
        let params = effective_parameters(
            &CallParameters::default(),
            None,
            ModelEngine::Gpt35Turbo,
            ModelEngine::Gpt35Turbo,
        );
        assert!(params.is_all_none());
    }
}
