//! Chat-completion provider abstractions.
//!
//! The trait seam lets the handlers run against the real OpenAI backend in
//! production and a canned mock in tests.

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Image payload attached to a chat request.
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// Raw bytes, embedded as a base64 data URL.
    Inline { mime_type: String, data: Vec<u8> },
    /// Publicly reachable URL the provider fetches itself.
    Url(String),
}

/// A single-turn user request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub prompt: String,
    pub image: Option<ImageInput>,
    pub max_tokens: u32,
}

/// Completion result.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// Trimmed reply text.
    pub text: String,
    pub input_tokens: i32,
    pub output_tokens: i32,
    pub finish_reason: FinishReason,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
}

/// Trait for chat-completion providers.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Run a single user message through the model and return the reply.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatOutcome, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
