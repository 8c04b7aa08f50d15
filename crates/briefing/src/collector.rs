//! Collector: runs the query table against a news source and builds the batch.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::BriefingResult;
use crate::queries::QueryTable;
use crate::search::{NewsSource, QueryOutcome, RawArticle};

/// A filtered search result attributed to a country.
///
/// Field order is the order the summarizer sees in its JSON input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub country: String,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub source: Option<String>,
}

impl Article {
    /// Build an article, or `None` if title or url is missing or empty.
    pub fn from_raw(country: &str, raw: RawArticle) -> Option<Self> {
        let title = raw.title.filter(|t| !t.is_empty())?;
        let url = raw.url.filter(|u| !u.is_empty())?;

        Some(Self {
            country: country.to_string(),
            title,
            description: raw.description,
            url,
            source: raw.source.and_then(|s| s.name),
        })
    }
}

/// All articles collected in one run, country-major.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NewsBatch {
    articles: Vec<Article>,
}

impl NewsBatch {
    #[must_use]
    pub fn new(articles: Vec<Article>) -> Self {
        Self { articles }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    #[must_use]
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// Articles attributed to one country, in collection order.
    pub fn for_country<'a>(&'a self, country: &'a str) -> impl Iterator<Item = &'a Article> + 'a {
        self.articles.iter().filter(move |a| a.country == country)
    }

    /// Pretty JSON handed verbatim to the model.
    pub fn to_json(&self) -> BriefingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Batch plus query bookkeeping for one collection pass.
#[derive(Debug, Default)]
pub struct Collection {
    pub batch: NewsBatch,
    pub queries_issued: usize,
    pub queries_failed: usize,
}

/// Issues every planned query, one at a time, in fixed order.
pub struct Collector {
    source: Arc<dyn NewsSource>,
    table: QueryTable,
}

impl Collector {
    /// Create a new collector.
    #[must_use]
    pub fn new(source: Arc<dyn NewsSource>, table: QueryTable) -> Self {
        Self { source, table }
    }

    /// Collect articles for every country.
    ///
    /// Failed queries contribute nothing; only an unrenderable query table
    /// aborts the pass.
    pub async fn collect(
        &self,
        countries: &[String],
        run_date: NaiveDate,
    ) -> BriefingResult<Collection> {
        let mut collection = Collection::default();

        for country in countries {
            let plan = self.table.plan(country, run_date)?;
            let mut gathered: Vec<RawArticle> = Vec::new();

            for query in &plan.queries {
                collection.queries_issued += 1;

                match QueryOutcome::from(self.source.search(query).await) {
                    QueryOutcome::Fetched(articles) => {
                        debug!(
                            country = %country,
                            language = %query.language,
                            articles = articles.len(),
                            "Query returned"
                        );
                        gathered.extend(articles);
                    }
                    QueryOutcome::Failed { reason } => {
                        collection.queries_failed += 1;
                        warn!(
                            country = %country,
                            language = %query.language,
                            source = self.source.name(),
                            reason = %reason,
                            "Search query failed, skipping"
                        );
                    }
                }
            }

            // Cap before filtering; incomplete articles are not replaced
            gathered.truncate(plan.cap);
            let kept: Vec<Article> = gathered
                .into_iter()
                .filter_map(|raw| Article::from_raw(country, raw))
                .collect();

            info!(country = %country, articles = kept.len(), "Collected articles");
            collection.batch.articles.extend(kept);
        }

        Ok(collection)
    }
}
