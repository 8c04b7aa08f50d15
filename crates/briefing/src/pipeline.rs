//! Briefing pipeline - orchestrates the collect-summarize-notify flow.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::ai::{AIProvider, OpenAIProvider, PromptManager};
use crate::collector::Collector;
use crate::config::BriefingConfig;
use crate::error::BriefingResult;
use crate::notify::{BriefingEmail, MailSettings, MailTransport, SmtpMailer};
use crate::search::{NewsApiClient, NewsSource};
use crate::summarizer::Summarizer;

/// Progress points reported during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Summarizing,
    Sending,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = match self {
            Self::Fetching => "Fetching news...",
            Self::Summarizing => "Creating summary...",
            Self::Sending => "Sending email...",
            Self::Done => "Done!",
        };
        f.write_str(line)
    }
}

/// Result of a single run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_date: NaiveDate,
    pub queries_issued: usize,
    pub queries_failed: usize,
    pub articles: usize,
    pub subject: String,
}

/// Briefing pipeline orchestrator.
pub struct Pipeline {
    countries: Vec<String>,
    collector: Collector,
    summarizer: Summarizer,
    mail: MailSettings,
    transport: Arc<dyn MailTransport>,
}

impl Pipeline {
    /// Create a pipeline from configuration and explicit service seams.
    pub fn new(
        config: &BriefingConfig,
        source: Arc<dyn NewsSource>,
        provider: Arc<dyn AIProvider>,
        transport: Arc<dyn MailTransport>,
    ) -> BriefingResult<Self> {
        let prompts = match &config.prompts_dir {
            Some(dir) => PromptManager::from_dir(dir)?,
            None => PromptManager::new()?,
        };

        Ok(Self {
            countries: config.countries.clone(),
            collector: Collector::new(source, config.queries.clone()),
            summarizer: Summarizer::new(
                provider,
                prompts,
                config.model.clone(),
                config.queries.primary_country.clone(),
            ),
            mail: config.mail.clone(),
            transport,
        })
    }

    /// Create a pipeline talking to NewsAPI, OpenAI and the SMTP relay.
    pub fn from_config(config: &BriefingConfig) -> BriefingResult<Self> {
        let source = NewsApiClient::new(config.news_api_key.clone())
            .with_endpoint(config.search_endpoint.clone());

        let mut provider = OpenAIProvider::new(config.openai_api_key.clone());
        if let Some(url) = &config.openai_base_url {
            provider = provider.with_base_url(url.clone());
        }

        Self::new(
            config,
            Arc::new(source),
            Arc::new(provider),
            Arc::new(SmtpMailer::new(config.mail.clone())),
        )
    }

    /// Run once: collect, summarize, send exactly one email.
    ///
    /// Search failures are absorbed by the collector. A completion failure
    /// stops the run before anything is sent; a mail failure loses the
    /// summary.
    pub async fn run<F>(&self, run_date: NaiveDate, mut on_stage: F) -> BriefingResult<RunReport>
    where
        F: FnMut(Stage),
    {
        tracing::info!(%run_date, countries = self.countries.len(), "Starting briefing run");

        on_stage(Stage::Fetching);
        let collection = self.collector.collect(&self.countries, run_date).await?;

        on_stage(Stage::Summarizing);
        let summary = self.summarizer.summarize(&collection.batch).await?;

        on_stage(Stage::Sending);
        let email = BriefingEmail::compose(&self.mail, &summary, run_date);
        self.transport.send(&email).await?;

        on_stage(Stage::Done);

        let report = RunReport {
            run_date,
            queries_issued: collection.queries_issued,
            queries_failed: collection.queries_failed,
            articles: collection.batch.len(),
            subject: email.subject,
        };

        tracing::info!(
            queries = report.queries_issued,
            failed = report.queries_failed,
            articles = report.articles,
            transport = self.transport.name(),
            "Briefing run complete"
        );

        Ok(report)
    }
}
