//! Collects renderings in memory, for tests and UIs that poll.

use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::actions::RecordedAction;
use crate::ports::ActionObserver;

/// Keeps every rendering it receives, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    renderings: Arc<Mutex<Vec<(u64, String)>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderings received so far.
    pub fn renderings(&self) -> Vec<String> {
        self.renderings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Sequence numbers of the actions observed so far.
    pub fn sequences(&self) -> Vec<u64> {
        self.renderings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(sequence, _)| *sequence)
            .collect()
    }
}

impl ActionObserver for RecordingObserver {
    fn on_action(&self, recorded: &RecordedAction, rendering: &str) {
        self.renderings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((recorded.sequence, rendering.to_string()));
    }
}
