//! Summarizer: condenses a news batch into briefing text with one completion.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::ai::{AIMessage, AIProvider, GenerateOptions, PromptManager};
use crate::collector::NewsBatch;
use crate::error::{BriefingError, BriefingResult};

/// Default completion model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Generation ceiling; truncated output is used as-is.
pub const MAX_SUMMARY_TOKENS: u32 = 2000;

/// Model output for one run. Its structure is never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary(String);

impl Summary {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sends the batch to a completion provider.
pub struct Summarizer {
    provider: Arc<dyn AIProvider>,
    prompts: PromptManager,
    model: String,
    primary_country: String,
}

impl Summarizer {
    /// Create a new summarizer.
    #[must_use]
    pub fn new(
        provider: Arc<dyn AIProvider>,
        prompts: PromptManager,
        model: impl Into<String>,
        primary_country: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            prompts,
            model: model.into(),
            primary_country: primary_country.into(),
        }
    }

    /// Build the system and user messages for a batch.
    pub fn messages(&self, batch: &NewsBatch) -> BriefingResult<Vec<AIMessage>> {
        let data = serde_json::json!({
            "primary": self.primary_country,
            "news": batch.to_json()?,
        });

        Ok(vec![
            AIMessage::system(self.prompts.render("system", &data)?),
            AIMessage::user(self.prompts.render("user", &data)?),
        ])
    }

    /// Summarize a batch. Any provider failure is returned unchanged.
    pub async fn summarize(&self, batch: &NewsBatch) -> BriefingResult<Summary> {
        let messages = self.messages(batch)?;

        let options = GenerateOptions {
            max_tokens: Some(MAX_SUMMARY_TOKENS),
            ..Default::default()
        };

        let response = self
            .provider
            .generate_text(&self.model, &messages, &options)
            .await?;

        if response.text.is_empty() {
            return Err(BriefingError::Completion(format!(
                "{} returned an empty completion",
                self.provider.name()
            )));
        }

        if response.finish_reason.as_deref() == Some("length") {
            warn!(
                max_tokens = MAX_SUMMARY_TOKENS,
                "Summary hit the token cap, using truncated text"
            );
        }

        info!(
            model = %response.model,
            articles = batch.len(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Summary created"
        );

        Ok(Summary(response.text))
    }
}
