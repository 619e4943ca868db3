//! LLM Gateway Adapters.
//!
//! Implementations of the LlmGateway port.
//!
//! ## Available Adapters
//!
//! - `OpenAiGateway` - OpenAI-compatible chat completions over HTTP
//! - `ContextBudgetGateway` - Wrapper rejecting prompts that cannot fit the model
//! - `MockGateway` - Configurable mock for testing

mod context_budget_gateway;
mod mock_gateway;
mod openai_gateway;

pub use context_budget_gateway::{estimate_tokens, ContextBudgetGateway};
pub use mock_gateway::{MockGateway, MockOutcome};
pub use openai_gateway::{OpenAiConfig, OpenAiGateway};
