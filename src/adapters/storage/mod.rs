//! Storage Adapters
//!
//! Implementations of the ActionLogStore port.
//!
//! ## Available Adapters
//!
//! - **JsonlActionLog** - One JSON document per line in an append-only file
//! - **InMemoryActionLog** - Stores the log in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{InMemoryActionLog, JsonlActionLog};
//!
//! // Production: file-based log
//! let log = JsonlActionLog::new("./data/actions.jsonl");
//!
//! // Testing: in-memory log
//! let log = InMemoryActionLog::new();
//! ```

mod in_memory_action_log;
mod jsonl_action_log;

pub use in_memory_action_log::InMemoryActionLog;
pub use jsonl_action_log::JsonlActionLog;
