//! Escalation ladder for recovering from failed LLM calls.
//!
//! The ladder is a pure state machine: the caller performs the call, then
//! reports the outcome. After a failure the ladder either escalates the model,
//! hides one more message, or gives up.
//!
//! # Termination
//!
//! Every non-terminal step strictly increases one of two counters and never
//! decreases the other:
//!
//! - the model rank (bounded by the configured ceiling)
//! - the number of hidden messages (bounded by the payload length)

use serde::{Deserialize, Serialize};
use std::fmt;

use super::LlmFailure;
use crate::domain::models::ModelEngine;

/// Where the ladder currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LadderStatus {
    /// Another call should be made with the current model and hidden set.
    Attempting,
    /// A call succeeded.
    Succeeded,
    /// No recovery option is left.
    Exhausted,
}

impl LadderStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LadderStatus::Attempting)
    }
}

/// What the ladder decided after a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LadderStep {
    /// Retry with a higher-ranked model.
    Escalate { from: ModelEngine, to: ModelEngine },
    /// Retry with one more message hidden.
    Shrink { hidden_index: usize },
    /// Give up.
    Exhausted,
}

/// One failed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub model: ModelEngine,
    pub hidden_messages: Vec<usize>,
    pub failure: LlmFailure,
}

impl fmt::Display for AttemptRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} with hidden messages {:?}: {}",
            self.model, self.hidden_messages, self.failure
        )
    }
}

/// State of one response acquisition.
#[derive(Debug, Clone)]
pub struct RecoveryLadder {
    model: ModelEngine,
    ceiling: ModelEngine,
    hidden: Vec<usize>,
    attempts: Vec<AttemptRecord>,
    status: LadderStatus,
}

impl RecoveryLadder {
    /// Starts a ladder at `model`, never escalating above `ceiling`.
    ///
    /// `hidden` is the caller-supplied hidden set. It is kept as is, including
    /// index 0 if the caller chose to hide it.
    pub fn new(model: ModelEngine, ceiling: ModelEngine, hidden: Vec<usize>) -> Self {
        Self {
            model,
            ceiling,
            hidden,
            attempts: Vec::new(),
            status: LadderStatus::Attempting,
        }
    }

    pub fn model(&self) -> ModelEngine {
        self.model
    }

    pub fn ceiling(&self) -> ModelEngine {
        self.ceiling
    }

    pub fn hidden(&self) -> &[usize] {
        &self.hidden
    }

    pub fn attempts(&self) -> &[AttemptRecord] {
        &self.attempts
    }

    pub fn into_attempts(self) -> Vec<AttemptRecord> {
        self.attempts
    }

    pub fn status(&self) -> LadderStatus {
        self.status
    }

    /// Marks the current attempt as successful.
    pub fn record_success(&mut self) {
        self.status = LadderStatus::Succeeded;
    }

    /// Records a failed attempt and decides the next step.
    ///
    /// `payload_indices` are the conversation indices that were sent, in
    /// order. The first entry is never hidden by the ladder.
    pub fn record_failure(&mut self, failure: LlmFailure, payload_indices: &[usize]) -> LadderStep {
        if self.status.is_terminal() {
            return LadderStep::Exhausted;
        }

        let next_model = self.next_model(&failure);
        self.attempts.push(AttemptRecord {
            model: self.model,
            hidden_messages: self.hidden.clone(),
            failure,
        });

        if let Some(to) = next_model {
            let from = self.model;
            self.model = to;
            return LadderStep::Escalate { from, to };
        }

        match payload_indices.get(1) {
            Some(&hidden_index) if !self.hidden.contains(&hidden_index) => {
                self.hidden.push(hidden_index);
                LadderStep::Shrink { hidden_index }
            }
            _ => {
                self.status = LadderStatus::Exhausted;
                LadderStep::Exhausted
            }
        }
    }

    /// Context overflows look for a bigger window, everything else for a
    /// stronger model.
    fn next_model(&self, failure: &LlmFailure) -> Option<ModelEngine> {
        let candidate = match failure {
            LlmFailure::ContextTooLong { .. } => self.model.next_with_more_context(),
            LlmFailure::RateLimit { .. }
            | LlmFailure::Malformed { .. }
            | LlmFailure::Transient { .. } => self.model.next_with_more_strength(),
        }?;
        (candidate > self.model && candidate <= self.ceiling).then_some(candidate)
    }
}
