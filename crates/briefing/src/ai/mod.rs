//! Chat-completion integration.
//!
//! This module provides:
//! - AI provider abstraction
//! - OpenAI implementation
//! - Handlebars prompt templates for the briefing

pub mod openai;
pub mod prompts;
pub mod provider;

pub use openai::OpenAIProvider;
pub use prompts::PromptManager;
pub use provider::{AIMessage, AIProvider, AIResponse, AIRole, GenerateOptions, TokenUsage};
