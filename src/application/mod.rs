//! Application layer - orchestrates domain actions through ports.
//!
//! The [`ConversationManager`] is the entry point for algorithms that drive
//! a conversation; [`ActionLogWriter`] persists what they do.

pub mod action_log_writer;
pub mod conversation_manager;

pub use action_log_writer::ActionLogWriter;
pub use conversation_manager::{
    ConversationManager, ManagerError, ManagerSettings, MessageRequest, ResponseRequest,
    SYSTEM_PROMPT_TAG,
};
