//! Context Budget Gateway - Wrapper that rejects prompts too large for the model.
//!
//! Estimates the prompt size before calling the wrapped gateway. Requests
//! whose prompt plus expected response cannot fit the model's context window
//! fail with `ContextTooLong` without a network round trip, which lets the
//! recovery ladder react immediately.
//!
//! # Example
//!
//! ```ignore
//! let gateway = ContextBudgetGateway::new(OpenAiGateway::new(config)?);
//! ```

use async_trait::async_trait;

use crate::ports::{CompletionRequest, LlmFailure, LlmGateway};

/// Average characters per token for English prose.
const CHARS_PER_TOKEN: usize = 4;

/// Rough token estimate for a prompt of `chars` characters.
///
/// Saturates at `u32::MAX`, so an oversized prompt always exceeds the budget.
pub fn estimate_tokens(chars: usize) -> u32 {
    u32::try_from(chars.div_ceil(CHARS_PER_TOKEN)).unwrap_or(u32::MAX)
}

/// Gateway wrapper enforcing the model's context window.
pub struct ContextBudgetGateway<G: LlmGateway> {
    inner: G,
}

impl<G: LlmGateway> ContextBudgetGateway<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    fn check_budget(request: &CompletionRequest) -> Result<(), LlmFailure> {
        let prompt_tokens = estimate_tokens(request.content_chars());
        let limit = request.model.max_context_tokens();
        let needed = prompt_tokens.saturating_add(request.expected_tokens_in_response);
        if needed > limit {
            return Err(LlmFailure::context_too_long(format!(
                "estimated {} prompt tokens plus {} expected exceed {} tokens of {}",
                prompt_tokens, request.expected_tokens_in_response, limit, request.model
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<G: LlmGateway + 'static> LlmGateway for ContextBudgetGateway<G> {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmFailure> {
        if let Err(failure) = Self::check_budget(&request) {
            tracing::debug!(model = %request.model, %failure, "Prompt exceeds context budget");
            return Err(failure);
        }
        self.inner.complete(request).await
    }
}
