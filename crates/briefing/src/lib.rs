//! Daily renewable-energy news briefing.
//!
//! This crate provides:
//! - A query table that turns countries into news-search queries
//! - A NewsAPI collector that tolerates per-query failures
//! - An OpenAI summarizer with Handlebars prompt templates
//! - A plain-text SMTP notifier
//!
//! One run is strictly sequential: collect, summarize, send one email.

pub mod ai;
pub mod collector;
pub mod config;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod queries;
pub mod search;
pub mod summarizer;

// Re-export main types
pub use collector::{Article, Collection, Collector, NewsBatch};
pub use config::BriefingConfig;
pub use error::{BriefingError, BriefingResult};
pub use notify::{BriefingEmail, MailSettings, MailTransport, SmtpMailer};
pub use pipeline::{Pipeline, RunReport, Stage};
pub use queries::{QuerySpec, QueryTable, QueryTemplate};
pub use search::{NewsApiClient, NewsSource, QueryOutcome, RawArticle, RawSource};
pub use summarizer::{Summarizer, Summary};
