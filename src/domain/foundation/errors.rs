//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    IndexOutOfRange,
    InvalidDesignation,

    // Not found errors
    ConversationNotFound,
    TagNotFound,

    // State errors
    ConversationAlreadyExists,
    EmptyConversation,
    NotTwoParticipants,
    UnknownParticipant,
    WebConversationMissing,

    // Infrastructure errors
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::IndexOutOfRange => "INDEX_OUT_OF_RANGE",
            ErrorCode::InvalidDesignation => "INVALID_DESIGNATION",
            ErrorCode::ConversationNotFound => "CONVERSATION_NOT_FOUND",
            ErrorCode::TagNotFound => "TAG_NOT_FOUND",
            ErrorCode::ConversationAlreadyExists => "CONVERSATION_ALREADY_EXISTS",
            ErrorCode::EmptyConversation => "EMPTY_CONVERSATION",
            ErrorCode::NotTwoParticipants => "NOT_TWO_PARTICIPANTS",
            ErrorCode::UnknownParticipant => "UNKNOWN_PARTICIPANT",
            ErrorCode::WebConversationMissing => "WEB_CONVERSATION_MISSING",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field.into())
    }

    /// Creates a conversation-not-found error.
    pub fn conversation_not_found(name: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ConversationNotFound,
            format!("Conversation '{}' does not exist", name),
        )
        .with_detail("conversation", name.to_string())
    }

    /// Creates a tag-not-found error.
    pub fn tag_not_found(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self::new(ErrorCode::TagNotFound, format!("No message tagged '{}'", tag))
            .with_detail("tag", tag)
    }

    /// Creates an index-out-of-range error.
    pub fn index_out_of_range(index: i64, len: usize) -> Self {
        Self::new(
            ErrorCode::IndexOutOfRange,
            format!("Message index {} is out of range for {} messages", index, len),
        )
        .with_detail("index", index.to_string())
        .with_detail("len", len.to_string())
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        DomainError::new(ErrorCode::ValidationFailed, err.to_string())
    }
}
