//! Typed LLM call failures.

use serde::{Deserialize, Serialize};

/// Broad category of an LLM failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    RateLimit,
    ContextTooLong,
    Malformed,
    Transient,
}

/// Why an LLM call did not produce a usable response.
///
/// Serializable so that failed attempts can be recorded in the action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LlmFailure {
    /// Provider refused the call because of request volume.
    #[error("rate limited: {detail}")]
    RateLimit { detail: String },

    /// Prompt plus expected response does not fit the model's context window.
    #[error("context too long: {detail}")]
    ContextTooLong { detail: String },

    /// Provider answered, but not with a usable completion.
    #[error("malformed response: {detail}")]
    Malformed { detail: String },

    /// Network errors, timeouts, server errors.
    #[error("transient failure: {detail}")]
    Transient { detail: String },
}

impl LlmFailure {
    pub fn rate_limit(detail: impl Into<String>) -> Self {
        Self::RateLimit { detail: detail.into() }
    }

    pub fn context_too_long(detail: impl Into<String>) -> Self {
        Self::ContextTooLong { detail: detail.into() }
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed { detail: detail.into() }
    }

    pub fn transient(detail: impl Into<String>) -> Self {
        Self::Transient { detail: detail.into() }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            LlmFailure::RateLimit { .. } => FailureKind::RateLimit,
            LlmFailure::ContextTooLong { .. } => FailureKind::ContextTooLong,
            LlmFailure::Malformed { .. } => FailureKind::Malformed,
            LlmFailure::Transient { .. } => FailureKind::Transient,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            LlmFailure::RateLimit { detail }
            | LlmFailure::ContextTooLong { detail }
            | LlmFailure::Malformed { detail }
            | LlmFailure::Transient { detail } => detail,
        }
    }

    /// Returns true if repeating the identical call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), FailureKind::RateLimit | FailureKind::Transient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_variants() {
        assert_eq!(LlmFailure::rate_limit("x").kind(), FailureKind::RateLimit);
        assert_eq!(LlmFailure::context_too_long("x").kind(), FailureKind::ContextTooLong);
        assert_eq!(LlmFailure::malformed("x").kind(), FailureKind::Malformed);
        assert_eq!(LlmFailure::transient("x").kind(), FailureKind::Transient);
    }

    #[test]
    fn retryable_classification() {
        assert!(LlmFailure::rate_limit("slow down").is_retryable());
        assert!(LlmFailure::transient("502").is_retryable());
        assert!(!LlmFailure::context_too_long("too big").is_retryable());
        assert!(!LlmFailure::malformed("no choices").is_retryable());
    }

    #[test]
    fn displays_detail() {
        let err = LlmFailure::context_too_long("5000 tokens exceeds 4096");
        assert_eq!(err.to_string(), "context too long: 5000 tokens exceeds 4096");
        assert_eq!(err.detail(), "5000 tokens exceeds 4096");
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_string(&LlmFailure::rate_limit("429")).unwrap();
        assert_eq!(json, r#"{"kind":"rate_limit","detail":"429"}"#);
    }
}
