//! Conversation domain module.
//!
//! Messages, conversations, and the ways of addressing messages within them.

mod code_blocks;
mod conversation;
mod designation;
mod message;

pub use code_blocks::label_first_code_block;
pub use conversation::Conversation;
pub use designation::{MessageDesignation, Position};
pub use message::{Message, Role};
