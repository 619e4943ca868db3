//! Errors surfaced by the conversation manager.

use thiserror::Error;

use crate::domain::foundation::DomainError;
use crate::domain::recovery::AttemptRecord;
use crate::ports::ActionLogError;

/// Errors that can occur while driving a conversation.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// An action was rejected; nothing changed.
    #[error("Validation failed: {0}")]
    Validation(#[from] DomainError),

    /// Both model escalation and context shrinking ran out.
    #[error("{}", describe_exhaustion(.attempts))]
    EscalationExhausted { attempts: Vec<AttemptRecord> },

    /// The log or conversation is not in the state the operation assumes.
    #[error("Precondition violated: {0}")]
    PreconditionViolated(String),

    /// The durable log rejected an explicit flush.
    #[error("Action log error: {0}")]
    Storage(#[from] ActionLogError),
}

impl ManagerError {
    pub fn precondition(message: impl Into<String>) -> Self {
        ManagerError::PreconditionViolated(message.into())
    }

    /// Attempts recorded before exhaustion, empty for other errors.
    pub fn attempts(&self) -> &[AttemptRecord] {
        match self {
            ManagerError::EscalationExhausted { attempts } => attempts,
            _ => &[],
        }
    }
}

fn describe_exhaustion(attempts: &[AttemptRecord]) -> String {
    let mut models: Vec<String> = Vec::new();
    for attempt in attempts {
        let model = attempt.model.to_string();
        if !models.contains(&model) {
            models.push(model);
        }
    }
    let dropped = attempts
        .last()
        .map(|a| format!("{:?}", a.hidden_messages))
        .unwrap_or_else(|| "[]".to_string());
    let last = attempts
        .last()
        .map(|a| a.failure.to_string())
        .unwrap_or_else(|| "no attempt was made".to_string());

    format!(
        "LLM call failed after {} attempts; models tried: {}; hidden messages at the end: {}; last failure: {}",
        attempts.len(),
        models.join(", "),
        dropped,
        last
    )
}
