//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `LlmGateway` - Chat completion providers
//! - `ActionObserver` - Sinks for human-readable action renderings
//! - `ActionLogStore` - Durable, append-only action log

mod action_log_store;
mod action_observer;
mod llm_gateway;

pub use action_log_store::{ActionLogError, ActionLogStore};
pub use action_observer::ActionObserver;
pub use llm_gateway::{
    ChatMessage, ChatRole, CompletionRequest, FailureKind, LlmFailure, LlmGateway,
};
