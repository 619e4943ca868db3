//! Domain layer containing conversation state and recovery logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (names, IDs, timestamps, errors)
//! - `models` - Model engines and per-call parameters
//! - `conversation` - Messages, conversations, message designations
//! - `actions` - Actions, the shared registry, and replay
//! - `recovery` - Typed LLM failures and the escalation ladder

pub mod actions;
pub mod conversation;
pub mod foundation;
pub mod models;
pub mod recovery;
