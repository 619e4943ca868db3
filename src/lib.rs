//! Paper Dialogue - replayable LLM conversation management.
//!
//! Conversations change only through logged actions, so a session can be
//! rebuilt from its action log. Failed LLM calls are recovered by escalating
//! to stronger models and then by hiding older messages.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
