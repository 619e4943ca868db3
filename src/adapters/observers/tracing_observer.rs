//! Emits action renderings as tracing events.

use crate::domain::actions::RecordedAction;
use crate::ports::ActionObserver;

/// Logs every applied action at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ActionObserver for TracingObserver {
    fn on_action(&self, recorded: &RecordedAction, rendering: &str) {
        tracing::info!(
            conversation = %recorded.action.conversation,
            sequence = recorded.sequence,
            "{}",
            rendering
        );
    }
}
