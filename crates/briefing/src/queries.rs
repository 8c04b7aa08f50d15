//! Query table: turns a country and a run date into search queries.
//!
//! The primary country gets its own profile of several templates (local
//! language first, one broad-language query last). Every other country gets
//! exactly one query rendered from the shared default template.

use chrono::NaiveDate;
use handlebars::Handlebars;
use serde::Deserialize;

use crate::error::{BriefingError, BriefingResult};

/// Country that receives the multi-query treatment by default.
pub const DEFAULT_PRIMARY_COUNTRY: &str = "Germany";

/// Countries covered when nothing else is configured.
pub const DEFAULT_COUNTRIES: &[&str] = &[
    "Germany",
    "Spain",
    "France",
    "Netherlands",
    "Hungary",
    "Greece",
    "Poland",
    "Italy",
    "Chile",
    "Dominican Republic",
];

/// Articles kept for the primary country across all of its queries.
pub const DEFAULT_PRIMARY_CAP: usize = 5;

/// Articles kept for every other country.
pub const DEFAULT_COUNTRY_CAP: usize = 5;

/// Sort order requested from the search service.
pub const SORT_BY_RELEVANCE: &str = "relevance";

/// A configurable query before it is bound to a country and date.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueryTemplate {
    /// Keyword expression; may reference `{{country}}`.
    pub terms: String,
    /// ISO-639-1 language filter.
    pub language: String,
    /// Result-count limit sent to the service.
    pub page_size: u32,
}

impl QueryTemplate {
    /// Create a new query template.
    pub fn new(terms: impl Into<String>, language: impl Into<String>, page_size: u32) -> Self {
        Self {
            terms: terms.into(),
            language: language.into(),
            page_size,
        }
    }

    fn render(
        &self,
        renderer: &Handlebars<'_>,
        country: &str,
        from: NaiveDate,
    ) -> BriefingResult<QuerySpec> {
        let data = serde_json::json!({ "country": country });
        let terms = renderer.render_template(&self.terms, &data)?;

        Ok(QuerySpec {
            terms,
            language: self.language.clone(),
            from,
            sort_by: SORT_BY_RELEVANCE,
            page_size: self.page_size,
        })
    }
}

/// A fully bound search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    /// Rendered keyword expression.
    pub terms: String,
    /// ISO-639-1 language filter.
    pub language: String,
    /// Lower bound on publish date.
    pub from: NaiveDate,
    /// Ordering requested from the service.
    pub sort_by: &'static str,
    /// Result-count limit.
    pub page_size: u32,
}

/// Queries and article cap for one country.
#[derive(Debug, Clone)]
pub struct CountryPlan {
    pub country: String,
    pub queries: Vec<QuerySpec>,
    pub cap: usize,
}

/// Query templates keyed by country role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTable {
    /// Country that gets `primary_queries`.
    pub primary_country: String,
    /// Queries issued for the primary country, in order.
    pub primary_queries: Vec<QueryTemplate>,
    /// Single query issued for every other country.
    pub default_query: QueryTemplate,
    /// Cap applied to the primary country's concatenated results.
    pub primary_cap: usize,
    /// Cap applied to every other country.
    pub country_cap: usize,
}

impl Default for QueryTable {
    fn default() -> Self {
        Self {
            primary_country: DEFAULT_PRIMARY_COUNTRY.to_string(),
            primary_queries: vec![
                QueryTemplate::new(
                    r#"(Deutschland OR Germany) AND (Ausschreibung OR tender OR "wind farm" OR "solar park" OR Windpark OR Solarpark OR BNetzA OR "Bundesnetzagentur")"#,
                    "de",
                    3,
                ),
                QueryTemplate::new(
                    "(Vestas OR Siemens Gamesa OR Nordex OR Enercon OR GE OR Envision) AND (Germany OR Deutschland) AND (order OR Auftrag OR MW)",
                    "de",
                    3,
                ),
                QueryTemplate::new(
                    r#"(Germany) AND (BESS OR "power purchase agreement" OR PPA OR "grid connection" OR Netzanschluss OR Batteriespeicher)"#,
                    "de",
                    3,
                ),
                QueryTemplate::new(
                    r#"(Germany) AND ("wind turbine order" OR "solar project" OR "renewable tender" OR "FiT" OR "auction results")"#,
                    "en",
                    3,
                ),
            ],
            default_query: QueryTemplate::new(
                r#"("{{country}}") AND ("wind farm" OR "solar park" OR "GW" OR "MW" OR "turbine order" OR "Vestas" OR "Siemens Gamesa" OR "tender" OR "auction" OR "power purchase" OR "renewable project" OR "battery storage project") NOT (stock OR share)"#,
                "en",
                5,
            ),
            primary_cap: DEFAULT_PRIMARY_CAP,
            country_cap: DEFAULT_COUNTRY_CAP,
        }
    }
}

impl QueryTable {
    /// Check if a country gets the primary profile.
    #[must_use]
    pub fn is_primary(&self, country: &str) -> bool {
        country.eq_ignore_ascii_case(&self.primary_country)
    }

    /// Bind the table to one country and run date.
    pub fn plan(&self, country: &str, run_date: NaiveDate) -> BriefingResult<CountryPlan> {
        let renderer = renderer();
        let from = lower_bound(run_date);

        let (templates, cap) = if self.is_primary(country) {
            (self.primary_queries.as_slice(), self.primary_cap)
        } else {
            (std::slice::from_ref(&self.default_query), self.country_cap)
        };

        let queries = templates
            .iter()
            .map(|t| t.render(&renderer, country, from))
            .collect::<BriefingResult<Vec<_>>>()?;

        Ok(CountryPlan {
            country: country.to_string(),
            queries,
            cap,
        })
    }

    /// Reject tables that could never produce a sensible run.
    pub fn validate(&self) -> BriefingResult<()> {
        if self.primary_country.trim().is_empty() {
            return Err(BriefingError::Config("primary_country is empty".to_string()));
        }
        if self.primary_queries.is_empty() {
            return Err(BriefingError::Config(
                "primary_queries must contain at least one query".to_string(),
            ));
        }
        if self.primary_cap == 0 {
            return Err(BriefingError::Config("primary_cap must be at least 1".to_string()));
        }
        if self.country_cap == 0 {
            return Err(BriefingError::Config("country_cap must be at least 1".to_string()));
        }

        let renderer = renderer();
        let probe = NaiveDate::default();
        for template in self.primary_queries.iter().chain([&self.default_query]) {
            if template.terms.trim().is_empty() || template.language.trim().is_empty() {
                return Err(BriefingError::Config(
                    "query templates need both terms and language".to_string(),
                ));
            }
            if template.page_size == 0 {
                return Err(BriefingError::Config(format!(
                    "page_size must be at least 1 (terms: {})",
                    template.terms
                )));
            }
            template
                .render(&renderer, &self.primary_country, probe)
                .map_err(|e| BriefingError::Config(format!("invalid query template: {e}")))?;
        }

        Ok(())
    }
}

/// Publish-date lower bound: one day before the run.
#[must_use]
pub fn lower_bound(run_date: NaiveDate) -> NaiveDate {
    run_date.pred_opt().unwrap_or(run_date)
}

fn renderer() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    // Query syntax relies on literal quotes
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);
    handlebars
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_primary_plan_has_all_queries() {
        let table = QueryTable::default();
        let plan = table.plan("Germany", date(2024, 3, 15)).unwrap();

        assert_eq!(plan.queries.len(), 4);
        assert_eq!(plan.cap, 5);
        let languages: Vec<_> = plan.queries.iter().map(|q| q.language.as_str()).collect();
        assert_eq!(languages, vec!["de", "de", "de", "en"]);
        assert!(plan.queries.iter().all(|q| q.page_size == 3));
    }

    #[test]
    fn test_other_country_gets_one_query() {
        let table = QueryTable::default();
        let plan = table.plan("Dominican Republic", date(2024, 3, 15)).unwrap();

        assert_eq!(plan.queries.len(), 1);
        let query = &plan.queries[0];
        assert!(query.terms.starts_with(r#"("Dominican Republic") AND ("wind farm""#));
        assert!(query.terms.ends_with("NOT (stock OR share)"));
        assert_eq!(query.language, "en");
        assert_eq!(query.page_size, 5);
        assert_eq!(query.sort_by, "relevance");
    }

    #[test]
    fn test_lower_bound_is_previous_day() {
        let table = QueryTable::default();
        let plan = table.plan("Spain", date(2024, 3, 1)).unwrap();
        assert_eq!(plan.queries[0].from, date(2024, 2, 29));
    }

    #[test]
    fn test_primary_match_ignores_case() {
        let table = QueryTable::default();
        assert!(table.is_primary("germany"));
        assert!(!table.is_primary("Spain"));
    }

    #[test]
    fn test_default_table_is_valid() {
        assert!(QueryTable::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_tables() {
        let table = QueryTable {
            primary_queries: vec![],
            ..Default::default()
        };
        assert!(table.validate().is_err());

        let table = QueryTable {
            country_cap: 0,
            ..Default::default()
        };
        assert!(table.validate().is_err());

        let table = QueryTable {
            default_query: QueryTemplate::new("{{region}} AND solar", "en", 5),
            ..Default::default()
        };
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("invalid query template"));
    }
}
