//! Mock LLM Gateway for testing.
//!
//! Provides a configurable implementation of the LlmGateway port, allowing
//! tests to exercise the recovery ladder without calling real APIs.
//!
//! # Features
//!
//! - Pre-configured responses and failures, consumed in order
//! - A fallback outcome once the queue is empty
//! - Simulated delays
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let gateway = MockGateway::new()
//!     .with_failure(LlmFailure::context_too_long("too big"))
//!     .with_response("Hello!");
//!
//! let content = gateway.complete(request).await?;
//! assert_eq!(gateway.call_count(), 1);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{CompletionRequest, LlmFailure, LlmGateway};

/// A configured mock outcome.
pub type MockOutcome = Result<String, LlmFailure>;

/// Mock gateway for testing.
#[derive(Debug, Clone)]
pub struct MockGateway {
    /// Pre-configured outcomes (consumed in order).
    outcomes: Arc<Mutex<VecDeque<MockOutcome>>>,
    /// Returned once `outcomes` is empty.
    fallback: MockOutcome,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Ok("Mock response".to_string()),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A gateway that fails every call with `failure`.
    pub fn always_failing(failure: LlmFailure) -> Self {
        Self::new().with_fallback(Err(failure))
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(Ok(content.into()));
        self
    }

    /// Adds a failure to the queue.
    pub fn with_failure(self, failure: LlmFailure) -> Self {
        self.push(Err(failure));
        self
    }

    /// Sets the outcome used once the queue is exhausted.
    pub fn with_fallback(mut self, outcome: MockOutcome) -> Self {
        self.fallback = outcome;
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made to this gateway.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns all recorded calls.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn push(&self, outcome: MockOutcome) {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    fn next_outcome(&self) -> MockOutcome {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl LlmGateway for MockGateway {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmFailure> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        self.next_outcome()
    }
}
