//! Shared stubs for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use briefing::ai::{AIMessage, AIProvider, AIResponse, GenerateOptions, TokenUsage};
use briefing::{
    BriefingConfig, BriefingEmail, BriefingError, BriefingResult, MailTransport, NewsSource,
    QuerySpec, RawArticle, RawSource,
};

/// Config with test credentials and the given countries.
pub fn config(countries: &str) -> BriefingConfig {
    let env = HashMap::from([
        ("NEWS_API_KEY", "news-key".to_string()),
        ("OPENAI_API_KEY", "openai-key".to_string()),
        ("EMAIL_SENDER", "agent@example.com".to_string()),
        ("EMAIL_PASSWORD", "app-password".to_string()),
        ("EMAIL_RECEIVER", "coo@example.com".to_string()),
        ("EMAIL_RECIPIENT_NAME", "Malte".to_string()),
        ("BRIEFING_COUNTRIES", countries.to_string()),
    ]);
    BriefingConfig::from_lookup(|k| env.get(k).cloned(), None).unwrap()
}

pub fn raw_article(tag: &str, n: usize) -> RawArticle {
    RawArticle {
        title: Some(format!("{tag} headline {n}")),
        description: Some(format!("{tag} description {n}")),
        url: Some(format!("https://news.example/{tag}/{n}")),
        source: Some(RawSource {
            name: Some("Energy Wire".to_string()),
        }),
    }
}

/// What a stub source returns for queries mentioning a country.
pub enum Reply {
    Articles(Vec<RawArticle>),
    Fail,
}

/// News source answering by substring match on the query terms.
#[derive(Default)]
pub struct StubSource {
    replies: Vec<(String, Reply)>,
    pub queries: Mutex<Vec<QuerySpec>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, needle: &str, reply: Reply) -> Self {
        self.replies.push((needle.to_string(), reply));
        self
    }

    pub fn queries(&self) -> Vec<QuerySpec> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl NewsSource for StubSource {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn search(&self, query: &QuerySpec) -> BriefingResult<Vec<RawArticle>> {
        self.queries.lock().unwrap().push(query.clone());

        let reply = self
            .replies
            .iter()
            .find(|(needle, _)| query.terms.contains(needle.as_str()));

        match reply {
            Some((_, Reply::Articles(articles))) => Ok(articles.clone()),
            Some((_, Reply::Fail)) => {
                Err(BriefingError::Search("News API error (500)".to_string()))
            }
            None => Ok(Vec::new()),
        }
    }
}

/// Completion provider returning fixed text and recording requests.
pub struct StubProvider {
    text: Option<String>,
    pub requests: Mutex<Vec<(String, Vec<AIMessage>, Option<u32>)>>,
}

impl StubProvider {
    pub fn answering(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AIProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn generate_text(
        &self,
        model: &str,
        messages: &[AIMessage],
        options: &GenerateOptions,
    ) -> BriefingResult<AIResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((model.to_string(), messages.to_vec(), options.max_tokens));

        match &self.text {
            Some(text) => Ok(AIResponse {
                text: text.clone(),
                usage: TokenUsage::default(),
                model: model.to_string(),
                finish_reason: Some("stop".to_string()),
            }),
            None => Err(BriefingError::Completion("OpenAI API error (503)".to_string())),
        }
    }
}

/// Mail transport that keeps every email it is handed.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<BriefingEmail>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<BriefingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, email: &BriefingEmail) -> BriefingResult<()> {
        if self.fail {
            return Err(BriefingError::Mail("535 authentication failed".to_string()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub fn arc<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
