//! Recovery from failed LLM calls.

mod failure;
mod ladder;

pub use failure::{FailureKind, LlmFailure};
pub use ladder::{AttemptRecord, LadderStatus, LadderStep, RecoveryLadder};
