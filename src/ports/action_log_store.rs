//! Action Log Store Port - Durable record of applied actions.
//!
//! The log is append-only and order-preserving. Loading it and replaying the
//! entries from empty state reconstructs every conversation.

use async_trait::async_trait;

use crate::domain::actions::RecordedAction;

/// Errors that can occur while persisting or loading the action log
#[derive(Debug, thiserror::Error)]
pub enum ActionLogError {
    #[error("Failed to serialize action #{sequence}: {reason}")]
    SerializationFailed { sequence: u64, reason: String },

    #[error("Failed to deserialize line {line}: {reason}")]
    DeserializationFailed { line: usize, reason: String },

    #[error("Action #{found} appended out of order, expected #{expected}")]
    OutOfOrder { expected: u64, found: u64 },

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for persisting the action log
#[async_trait]
pub trait ActionLogStore: Send + Sync {
    /// Appends one action to the end of the log.
    ///
    /// # Errors
    /// Returns `OutOfOrder` if the sequence number does not follow the last
    /// stored entry.
    async fn append(&self, recorded: &RecordedAction) -> Result<(), ActionLogError>;

    /// Loads the whole log in order. An absent log is empty.
    async fn load(&self) -> Result<Vec<RecordedAction>, ActionLogError>;
}
