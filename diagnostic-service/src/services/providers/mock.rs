//! Mock provider implementation for testing.

use super::{ChatOutcome, ChatProvider, ChatRequest, FinishReason, ProviderError};
use async_trait::async_trait;

/// Mock chat provider. Echoes the prompt, returns a canned reply, or fails,
/// depending on how the test builds it.
pub struct MockChatProvider {
    reply: Option<String>,
    failure: Option<String>,
}

impl MockChatProvider {
    /// Provider that echoes the prompt back.
    pub fn new() -> Self {
        Self {
            reply: None,
            failure: None,
        }
    }

    /// Provider that always answers with `reply`.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            failure: None,
        }
    }

    /// Provider whose every call fails with an API error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: None,
            failure: Some(message.into()),
        }
    }
}

impl Default for MockChatProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatOutcome, ProviderError> {
        if let Some(message) = &self.failure {
            return Err(ProviderError::ApiError(message.clone()));
        }

        let text = self
            .reply
            .clone()
            .unwrap_or_else(|| format!("Mock response for: {}", request.prompt));

        Ok(ChatOutcome {
            text,
            input_tokens: request.prompt.len() as i32 / 4,
            output_tokens: 10,
            finish_reason: FinishReason::Complete,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match &self.failure {
            Some(message) => Err(ProviderError::ApiError(message.clone())),
            None => Ok(()),
        }
    }
}
