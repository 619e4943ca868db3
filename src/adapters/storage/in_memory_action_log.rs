//! In-Memory Action Log Adapter
//!
//! Keeps the log in memory. Useful for testing and development.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::actions::RecordedAction;
use crate::ports::{ActionLogError, ActionLogStore};

/// In-memory action log
#[derive(Debug, Clone, Default)]
pub struct InMemoryActionLog {
    entries: Arc<RwLock<Vec<RecordedAction>>>,
}

impl InMemoryActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored actions
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Clear all stored actions (useful for tests)
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl ActionLogStore for InMemoryActionLog {
    async fn append(&self, recorded: &RecordedAction) -> Result<(), ActionLogError> {
        let mut entries = self.entries.write().await;
        let expected = entries.len() as u64;
        if recorded.sequence != expected {
            return Err(ActionLogError::OutOfOrder {
                expected,
                found: recorded.sequence,
            });
        }
        entries.push(recorded.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Vec<RecordedAction>, ActionLogError> {
        Ok(self.entries.read().await.clone())
    }
}
