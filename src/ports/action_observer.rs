//! Action Observer Port - Sink for action renderings.

use crate::domain::actions::RecordedAction;

/// Receives every applied action together with its rendering.
///
/// Observers are notified after the action is applied and after all locks
/// are released. They cannot influence control flow.
pub trait ActionObserver: Send + Sync {
    fn on_action(&self, recorded: &RecordedAction, rendering: &str);
}
