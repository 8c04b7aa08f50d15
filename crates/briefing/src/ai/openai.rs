//! OpenAI chat-completions provider.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{BriefingError, BriefingResult};

use super::provider::{AIMessage, AIProvider, AIResponse, GenerateOptions, TokenUsage};

/// OpenAI API endpoint
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI API request message
#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: String,
}

/// OpenAI API request
#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// OpenAI API response
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    model: String,
    #[serde(default)]
    usage: OpenAIUsage,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

/// OpenAI GPT provider.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: OPENAI_API_URL.to_string(),
        }
    }

    /// Set a custom base URL (useful for Azure OpenAI or proxies).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn convert_messages(messages: &[AIMessage]) -> Vec<OpenAIMessage> {
        messages
            .iter()
            .map(|msg| OpenAIMessage {
                role: msg.role.as_str(),
                content: msg.content.clone(),
            })
            .collect()
    }
}

impl fmt::Debug for OpenAIProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIProvider")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate_text(
        &self,
        model: &str,
        messages: &[AIMessage],
        options: &GenerateOptions,
    ) -> BriefingResult<AIResponse> {
        let request = OpenAIRequest {
            model: model.to_string(),
            messages: Self::convert_messages(messages),
            max_tokens: options.max_tokens,
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| BriefingError::Completion(format!("OpenAI API request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BriefingError::Completion(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            if let Ok(error_response) = serde_json::from_str::<OpenAIErrorResponse>(&body) {
                return Err(BriefingError::Completion(format!(
                    "OpenAI API error ({status}): {}",
                    error_response.error.message
                )));
            }
            return Err(BriefingError::Completion(format!(
                "OpenAI API error ({status}): {body}"
            )));
        }

        let api_response: OpenAIResponse = serde_json::from_str(&body)
            .map_err(|e| BriefingError::Completion(format!("Failed to parse response: {e}")))?;

        let (text, finish_reason) = api_response
            .choices
            .into_iter()
            .next()
            .map(|c| (c.message.content.unwrap_or_default(), c.finish_reason))
            .unwrap_or_default();

        Ok(AIResponse {
            text,
            usage: TokenUsage {
                input_tokens: api_response.usage.prompt_tokens,
                output_tokens: api_response.usage.completion_tokens,
            },
            model: api_response.model,
            finish_reason,
        })
    }
}
