//! Mirrors the registry's action log into a durable store.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::actions::ActionsAndConversations;
use crate::ports::{ActionLogError, ActionLogStore};

/// Appends every not-yet-persisted registry action to a store, in order.
///
/// Share one writer between all managers of a registry; the internal lock
/// keeps appends in sequence order even when managers run concurrently.
pub struct ActionLogWriter {
    store: Arc<dyn ActionLogStore>,
    persisted: Mutex<usize>,
}

impl ActionLogWriter {
    /// A writer for a store that is still empty.
    pub fn new(store: Arc<dyn ActionLogStore>) -> Self {
        Self::resuming(store, 0)
    }

    /// A writer for a store already holding the first `persisted` actions.
    pub fn resuming(store: Arc<dyn ActionLogStore>, persisted: usize) -> Self {
        Self {
            store,
            persisted: Mutex::new(persisted),
        }
    }

    /// Persists pending actions and returns how many were written.
    pub async fn sync(&self, registry: &ActionsAndConversations) -> Result<usize, ActionLogError> {
        let mut persisted = self.persisted.lock().await;
        let pending = registry.actions_from(*persisted);
        for recorded in &pending {
            self.store.append(recorded).await?;
            *persisted += 1;
        }
        Ok(pending.len())
    }

    pub async fn persisted_count(&self) -> usize {
        *self.persisted.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryActionLog;
    use crate::domain::actions::{ActionKind, ConversationAction};
    use crate::domain::foundation::ConversationName;
    use std::collections::BTreeSet;

    fn create(registry: &ActionsAndConversations, name: &str) {
        registry
            .apply(ConversationAction::new(
                ConversationName::new(name).unwrap(),
                ActionKind::CreateConversation {
                    participants: BTreeSet::new(),
                },
            ))
            .unwrap();
    }

    #[tokio::test]
    async fn sync_writes_only_pending_actions() {
        let store = InMemoryActionLog::new();
        let writer = ActionLogWriter::new(Arc::new(store.clone()));
        let registry = ActionsAndConversations::new();

        create(&registry, "a");
        create(&registry, "b");
        assert_eq!(writer.sync(&registry).await.unwrap(), 2);

        create(&registry, "c");
        assert_eq!(writer.sync(&registry).await.unwrap(), 1);
        assert_eq!(writer.sync(&registry).await.unwrap(), 0);

        assert_eq!(store.len().await, 3);
        assert_eq!(writer.persisted_count().await, 3);
    }

    #[tokio::test]
    async fn resuming_writer_skips_persisted_prefix() {
        let store = InMemoryActionLog::new();
        let registry = ActionsAndConversations::new();
        create(&registry, "a");
        ActionLogWriter::new(Arc::new(store.clone()))
            .sync(&registry)
            .await
            .unwrap();

        create(&registry, "b");
        let writer = ActionLogWriter::resuming(Arc::new(store.clone()), 1);
        assert_eq!(writer.sync(&registry).await.unwrap(), 1);
        assert_eq!(store.len().await, 2);
    }
}
