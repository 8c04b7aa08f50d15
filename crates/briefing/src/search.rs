//! News-search client for the NewsAPI `everything` endpoint.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{BriefingError, BriefingResult};
use crate::queries::QuerySpec;

/// NewsAPI search endpoint.
pub const NEWS_API_URL: &str = "https://newsapi.org/v2/everything";

/// Article as returned by the search service. Any field may be null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<RawSource>,
}

/// Nested source object on a search result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSource {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

/// NewsAPI error body
#[derive(Debug, Deserialize)]
struct SearchErrorResponse {
    code: Option<String>,
    message: String,
}

/// Outcome of one search query.
///
/// Failures are folded into empty contributions by the collector, never
/// propagated.
#[derive(Debug)]
pub enum QueryOutcome {
    /// The service answered with these articles, in service order.
    Fetched(Vec<RawArticle>),
    /// The query produced nothing usable.
    Failed { reason: String },
}

impl QueryOutcome {
    /// Articles contributed by this query; empty on failure.
    #[must_use]
    pub fn into_articles(self) -> Vec<RawArticle> {
        match self {
            Self::Fetched(articles) => articles,
            Self::Failed { .. } => Vec::new(),
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl From<BriefingResult<Vec<RawArticle>>> for QueryOutcome {
    fn from(result: BriefingResult<Vec<RawArticle>>) -> Self {
        match result {
            Ok(articles) => Self::Fetched(articles),
            Err(e) => Self::Failed {
                reason: e.to_string(),
            },
        }
    }
}

/// A service that answers keyword queries with news articles.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Get the source name (e.g., "newsapi").
    fn name(&self) -> &'static str;

    /// Run one query.
    async fn search(&self, query: &QuerySpec) -> BriefingResult<Vec<RawArticle>>;
}

/// NewsAPI client.
pub struct NewsApiClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl NewsApiClient {
    /// Create a new client with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            endpoint: NEWS_API_URL.to_string(),
        }
    }

    /// Set a custom endpoint (proxies, tests).
    #[must_use]
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }
}

impl fmt::Debug for NewsApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiClient")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    fn name(&self) -> &'static str {
        "newsapi"
    }

    async fn search(&self, query: &QuerySpec) -> BriefingResult<Vec<RawArticle>> {
        let from = query.from.format("%Y-%m-%d").to_string();
        let page_size = query.page_size.to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query.terms.as_str()),
                ("from", from.as_str()),
                ("sortBy", query.sort_by),
                ("language", query.language.as_str()),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| BriefingError::Search(format!("News API request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BriefingError::Search(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            if let Ok(error_response) = serde_json::from_str::<SearchErrorResponse>(&body) {
                return Err(BriefingError::Search(format!(
                    "News API error ({status}, {}): {}",
                    error_response.code.as_deref().unwrap_or("unknown"),
                    error_response.message
                )));
            }
            return Err(BriefingError::Search(format!(
                "News API error ({status}): {body}"
            )));
        }

        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| BriefingError::Search(format!("Failed to parse response: {e}")))?;

        Ok(parsed.articles)
    }
}
