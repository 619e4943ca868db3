//! Human-readable renderings of applied actions.
//!
//! Renderings feed observers (console, UI). They are never parsed back and
//! never part of state.

use std::fmt::Write;

use super::{ActionKind, RecordedAction};
use crate::domain::conversation::{Message, MessageDesignation, Position};

const PREVIEW_CHARS: usize = 120;

/// Renders one recorded action as a single block of text.
pub fn render_action(recorded: &RecordedAction) -> String {
    let action = &recorded.action;
    let mut out = format!(
        "#{} [{}] {}",
        recorded.sequence,
        action.conversation,
        action.kind.name()
    );
    if !action.driver.is_empty() {
        let _ = write!(out, " by {}", action.driver);
    }

    let detail = match &action.kind {
        ActionKind::CreateConversation { participants }
        | ActionKind::AddParticipants { participants } => {
            let names: Vec<&str> = participants.iter().map(|p| p.as_str()).collect();
            format!("participants: {}", names.join(", "))
        }
        ActionKind::AppendMessage { message, .. } => render_message(message),
        ActionKind::AppendChatgptResponse {
            message,
            hidden_messages,
            ..
        } => {
            if hidden_messages.is_empty() {
                render_message(message)
            } else {
                format!("{} (hidden: {:?})", render_message(message), hidden_messages)
            }
        }
        ActionKind::FailedChatgptResponse {
            model,
            hidden_messages,
            failure,
        } => format!("{} failed with hidden {:?}: {}", model, hidden_messages, failure),
        ActionKind::DeleteMessages { designation } => {
            format!("delete {}", render_designation(designation))
        }
        ActionKind::ResetToTag { tag } => format!("reset to '{}'", tag),
        ActionKind::ReplaceLastResponse { message } => {
            format!("replace last with {}", render_message(message))
        }
        ActionKind::CopyMessagesBetweenConversations {
            source,
            designation,
        } => format!("copy {} from [{}]", render_designation(designation), source),
        ActionKind::SetTypingAgent { agent } => match agent {
            Some(agent) => format!("{} is typing", agent),
            None => "typing cleared".to_string(),
        },
    };
    let _ = write!(out, ": {}", detail);

    if let Some(comment) = &action.comment {
        let _ = write!(out, " // {}", comment);
    }
    out
}

fn render_message(message: &Message) -> String {
    let mut out = message.role().to_string();
    if let Some(tag) = message.tag() {
        let _ = write!(out, "({})", tag);
    }
    if let Some(agent) = message.agent() {
        let _ = write!(out, " <{}>", agent);
    }
    let _ = write!(out, " {}", preview(message.content()));
    out
}

fn render_designation(designation: &MessageDesignation) -> String {
    match designation {
        MessageDesignation::Index(i) => format!("index {}", i),
        MessageDesignation::Indices(list) => format!("indices {:?}", list),
        MessageDesignation::Tag(tag) => format!("tag '{}'", tag),
        MessageDesignation::Range { start, end } => match end {
            Some(end) => format!("{}..{}", render_position(start), render_position(end)),
            None => format!("{}..", render_position(start)),
        },
    }
}

fn render_position(position: &Position) -> String {
    match position {
        Position::Index(i) => i.to_string(),
        Position::Tag(tag) => format!("'{}'", tag),
    }
}

fn preview(content: &str) -> String {
    let single_line = content.replace('\n', " ");
    if single_line.chars().count() <= PREVIEW_CHARS {
        return single_line;
    }
    let truncated: String = single_line.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", truncated)
}
