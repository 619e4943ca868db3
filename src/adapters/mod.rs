//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `llm` - LLM gateways (OpenAI-compatible HTTP, context budget guard, mock)
//! - `observers` - Action observers (tracing, in-memory)
//! - `storage` - Action log stores (JSON lines, in-memory)

pub mod llm;
pub mod observers;
pub mod storage;

pub use llm::{ContextBudgetGateway, MockGateway, OpenAiConfig, OpenAiGateway};
pub use observers::{RecordingObserver, TracingObserver};
pub use storage::{InMemoryActionLog, JsonlActionLog};
