//! AI provider trait and common types.

use async_trait::async_trait;

use crate::error::BriefingResult;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AIRole {
    /// System message (sets context/behavior)
    System,
    /// User message (input)
    User,
}

impl AIRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

/// A message in a conversation with an AI model.
#[derive(Debug, Clone)]
pub struct AIMessage {
    pub role: AIRole,
    pub content: String,
}

impl AIMessage {
    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: AIRole::System,
            content: content.into(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: AIRole::User,
            content: content.into(),
        }
    }
}

/// Token usage information from an AI response.
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Response from an AI model.
#[derive(Debug, Clone)]
pub struct AIResponse {
    /// Generated text content
    pub text: String,
    /// Token usage information
    pub usage: TokenUsage,
    /// Model that generated the response
    pub model: String,
    /// Why generation stopped ("length" means the token cap was hit)
    pub finish_reason: Option<String>,
}

/// Options for text generation.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

/// Trait for chat-completion providers.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Get the provider name (e.g., "openai").
    fn name(&self) -> &'static str;

    /// Generate text from messages.
    async fn generate_text(
        &self,
        model: &str,
        messages: &[AIMessage],
        options: &GenerateOptions,
    ) -> BriefingResult<AIResponse>;
}
