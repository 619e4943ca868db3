//! Addressing messages inside a conversation.
//!
//! A designation is stored verbatim in actions and resolved against the
//! conversation state at apply time, so replay resolves it identically.

use serde::{Deserialize, Serialize};

use super::Conversation;
use crate::domain::foundation::{DomainError, ErrorCode};

/// One end of a range: an index (negative counts from the end) or a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Index(i64),
    Tag(String),
}

/// A set of messages within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageDesignation {
    /// A single message; negative values count from the end.
    Index(i64),
    /// Several messages; negative values count from the end.
    Indices(Vec<i64>),
    /// The latest message bearing the tag.
    Tag(String),
    /// From `start` (inclusive) up to `end` (exclusive), or to the end of the
    /// conversation when `end` is absent.
    Range {
        start: Position,
        end: Option<Position>,
    },
}

impl MessageDesignation {
    /// Designates no message at all.
    pub fn none() -> Self {
        MessageDesignation::Indices(Vec::new())
    }

    /// Designates the last message.
    pub fn last() -> Self {
        MessageDesignation::Index(-1)
    }

    /// Designates concrete zero-based indices.
    pub fn indices(indices: &[usize]) -> Self {
        MessageDesignation::Indices(indices.iter().map(|&i| i as i64).collect())
    }

    /// Resolves to sorted, de-duplicated zero-based indices.
    ///
    /// # Errors
    ///
    /// - `IndexOutOfRange` if an index does not address an existing message
    /// - `TagNotFound` if a tag is not present
    /// - `InvalidDesignation` if a range ends before it starts
    pub fn resolve(&self, conversation: &Conversation) -> Result<Vec<usize>, DomainError> {
        let len = conversation.len();
        let mut indices = match self {
            MessageDesignation::Index(i) => vec![normalize(*i, len)?],
            MessageDesignation::Indices(list) => list
                .iter()
                .map(|&i| normalize(i, len))
                .collect::<Result<Vec<_>, _>>()?,
            MessageDesignation::Tag(tag) => vec![conversation
                .index_of_tag(tag)
                .ok_or_else(|| DomainError::tag_not_found(tag.clone()))?],
            MessageDesignation::Range { start, end } => {
                let start = bound(start, conversation)?;
                let end = match end {
                    Some(end) => bound(end, conversation)?,
                    None => len,
                };
                if end < start {
                    return Err(DomainError::new(
                        ErrorCode::InvalidDesignation,
                        format!("Range end {} precedes start {}", end, start),
                    ));
                }
                (start..end).collect()
            }
        };
        indices.sort_unstable();
        indices.dedup();
        Ok(indices)
    }
}

/// Maps an index to a valid position of an existing message.
fn normalize(index: i64, len: usize) -> Result<usize, DomainError> {
    let resolved = if index < 0 { len as i64 + index } else { index };
    if resolved < 0 || resolved >= len as i64 {
        return Err(DomainError::index_out_of_range(index, len));
    }
    Ok(resolved as usize)
}

/// Maps a range bound; `len` itself is a valid bound.
fn bound(position: &Position, conversation: &Conversation) -> Result<usize, DomainError> {
    let len = conversation.len();
    match position {
        Position::Index(i) => {
            let resolved = if *i < 0 { len as i64 + i } else { *i };
            if resolved < 0 || resolved > len as i64 {
                return Err(DomainError::index_out_of_range(*i, len));
            }
            Ok(resolved as usize)
        }
        Position::Tag(tag) => conversation
            .index_of_tag(tag)
            .ok_or_else(|| DomainError::tag_not_found(tag.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::Message;
    use crate::domain::foundation::ConversationName;

    fn conversation() -> Conversation {
        let mut conv = Conversation::new(ConversationName::new("test").unwrap());
        conv.append(Message::system("sys").with_tag(Some("system_prompt".into())));
        conv.append(Message::user("q1").with_tag(Some("q".into())));
        conv.append(Message::assistant("a1"));
        conv.append(Message::user("q2").with_tag(Some("q".into())));
        conv.append(Message::assistant("a2"));
        conv
    }

    #[test]
    fn negative_index_counts_from_end() {
        let conv = conversation();
        assert_eq!(MessageDesignation::last().resolve(&conv).unwrap(), vec![4]);
        assert_eq!(MessageDesignation::Index(-5).resolve(&conv).unwrap(), vec![0]);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let conv = conversation();
        let err = MessageDesignation::Index(5).resolve(&conv).unwrap_err();
        assert_eq!(err.code, ErrorCode::IndexOutOfRange);
        let err = MessageDesignation::Index(-6).resolve(&conv).unwrap_err();
        assert_eq!(err.code, ErrorCode::IndexOutOfRange);
    }

    #[test]
    fn indices_are_sorted_and_deduplicated() {
        let conv = conversation();
        let designation = MessageDesignation::Indices(vec![3, 1, -2, 1]);
        assert_eq!(designation.resolve(&conv).unwrap(), vec![1, 3]);
    }

    #[test]
    fn tag_resolves_to_latest_match() {
        let conv = conversation();
        let designation = MessageDesignation::Tag("q".into());
        assert_eq!(designation.resolve(&conv).unwrap(), vec![3]);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let conv = conversation();
        let err = MessageDesignation::Tag("missing".into()).resolve(&conv).unwrap_err();
        assert_eq!(err.code, ErrorCode::TagNotFound);
    }

    #[test]
    fn open_range_runs_to_end() {
        let conv = conversation();
        let designation = MessageDesignation::Range {
            start: Position::Tag("q".into()),
            end: None,
        };
        assert_eq!(designation.resolve(&conv).unwrap(), vec![3, 4]);
    }

    #[test]
    fn closed_range_excludes_end() {
        let conv = conversation();
        let designation = MessageDesignation::Range {
            start: Position::Index(1),
            end: Some(Position::Index(-1)),
        };
        assert_eq!(designation.resolve(&conv).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let conv = conversation();
        let designation = MessageDesignation::Range {
            start: Position::Index(3),
            end: Some(Position::Index(1)),
        };
        let err = designation.resolve(&conv).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDesignation);
    }

    #[test]
    fn none_resolves_to_empty() {
        let conv = conversation();
        assert!(MessageDesignation::none().resolve(&conv).unwrap().is_empty());
    }

    #[test]
    fn serializes_externally_tagged() {
        let json = serde_json::to_string(&MessageDesignation::Index(-1)).unwrap();
        assert_eq!(json, r#"{"index":-1}"#);
    }
}
