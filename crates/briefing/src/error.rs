//! Error types for the briefing pipeline.

use thiserror::Error;

/// Errors that can occur while producing a briefing.
#[derive(Debug, Error)]
pub enum BriefingError {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// News search request failed
    #[error("Search failed: {0}")]
    Search(String),

    /// Chat completion request failed
    #[error("Completion failed: {0}")]
    Completion(String),

    /// Mail could not be built or delivered
    #[error("Mail delivery failed: {0}")]
    Mail(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Template failed to render
    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// Template failed to parse
    #[error("Template syntax error: {0}")]
    TemplateSyntax(#[from] handlebars::TemplateError),
}

/// Result alias used across the crate.
pub type BriefingResult<T> = std::result::Result<T, BriefingError>;
