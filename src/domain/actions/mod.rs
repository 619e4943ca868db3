//! Action log module.
//!
//! Every change to a conversation is an action. The registry applies actions,
//! keeps the ordered log, and can rebuild itself from that log.

mod action;
mod registry;
mod render;

pub use action::{ActionKind, ConversationAction, RecordedAction};
pub use registry::{ActionsAndConversations, ReplayError};
pub use render::render_action;
