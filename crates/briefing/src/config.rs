//! Run configuration.
//!
//! Loaded once before the pipeline starts and never re-read. Secrets and
//! addresses come from the environment; the country list and query table come
//! from built-in reference data, optionally overridden by a TOML file.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{BriefingError, BriefingResult};
use crate::notify::{MailSettings, DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT};
use crate::queries::{QueryTable, QueryTemplate, DEFAULT_COUNTRIES};
use crate::search::NEWS_API_URL;
use crate::summarizer::DEFAULT_MODEL;

pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_EMAIL_SENDER: &str = "EMAIL_SENDER";
pub const ENV_EMAIL_PASSWORD: &str = "EMAIL_PASSWORD";
pub const ENV_EMAIL_RECEIVER: &str = "EMAIL_RECEIVER";
pub const ENV_EMAIL_RECIPIENT_NAME: &str = "EMAIL_RECIPIENT_NAME";
pub const ENV_OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_SMTP_HOST: &str = "SMTP_HOST";
pub const ENV_SMTP_PORT: &str = "SMTP_PORT";
pub const ENV_COUNTRIES: &str = "BRIEFING_COUNTRIES";
pub const ENV_CONFIG_PATH: &str = "BRIEFING_CONFIG";
pub const ENV_PROMPTS_DIR: &str = "BRIEFING_PROMPTS_DIR";

/// Immutable configuration for one run.
#[derive(Clone)]
pub struct BriefingConfig {
    /// Search API key.
    pub news_api_key: String,
    /// Search endpoint.
    pub search_endpoint: String,
    /// Completion API key.
    pub openai_api_key: String,
    /// Completion endpoint override.
    pub openai_base_url: Option<String>,
    /// Completion model.
    pub model: String,
    /// Countries in collection order.
    pub countries: Vec<String>,
    /// Query templates and caps.
    pub queries: QueryTable,
    /// Directory with `system.hbs` / `user.hbs` prompt overrides.
    pub prompts_dir: Option<PathBuf>,
    /// Mail relay and addressing.
    pub mail: MailSettings,
}

impl fmt::Debug for BriefingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BriefingConfig")
            .field("news_api_key", &"<redacted>")
            .field("search_endpoint", &self.search_endpoint)
            .field("openai_api_key", &"<redacted>")
            .field("openai_base_url", &self.openai_base_url)
            .field("model", &self.model)
            .field("countries", &self.countries)
            .field("queries", &self.queries)
            .field("prompts_dir", &self.prompts_dir)
            .field("mail", &self.mail)
            .finish()
    }
}

/// Optional TOML overrides for the query table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryTableFile {
    pub countries: Option<Vec<String>>,
    pub search_endpoint: Option<String>,
    pub primary_country: Option<String>,
    pub primary_cap: Option<usize>,
    pub country_cap: Option<usize>,
    pub primary_queries: Option<Vec<QueryTemplate>>,
    pub default_query: Option<QueryTemplate>,
}

impl QueryTableFile {
    /// Load overrides from a TOML file.
    pub fn load(path: &Path) -> BriefingResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BriefingError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
            .map_err(|e| BriefingError::Config(format!("{}: {e}", path.display())))
    }

    /// Parse overrides from TOML text.
    pub fn parse(content: &str) -> BriefingResult<Self> {
        toml::from_str(content).map_err(|e| BriefingError::Config(format!("invalid TOML: {e}")))
    }

    /// Apply overrides on top of a table.
    fn apply(self, mut table: QueryTable) -> QueryTable {
        if let Some(primary) = self.primary_country {
            table.primary_country = primary;
        }
        if let Some(cap) = self.primary_cap {
            table.primary_cap = cap;
        }
        if let Some(cap) = self.country_cap {
            table.country_cap = cap;
        }
        if let Some(queries) = self.primary_queries {
            table.primary_queries = queries;
        }
        if let Some(query) = self.default_query {
            table.default_query = query;
        }
        table
    }
}

impl BriefingConfig {
    /// Load configuration from the process environment.
    ///
    /// `config_path` takes precedence over `BRIEFING_CONFIG`.
    ///
    /// # Required Environment Variables
    /// - `NEWS_API_KEY`, `OPENAI_API_KEY`
    /// - `EMAIL_SENDER`, `EMAIL_PASSWORD`, `EMAIL_RECEIVER`
    pub fn from_env(config_path: Option<&Path>) -> BriefingResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), config_path)
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F, config_path: Option<&Path>) -> BriefingResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                BriefingError::Config(format!("{key} environment variable not set"))
            })
        };

        let news_api_key = require(ENV_NEWS_API_KEY)?;
        let openai_api_key = require(ENV_OPENAI_API_KEY)?;
        let sender = require(ENV_EMAIL_SENDER)?;
        let password = require(ENV_EMAIL_PASSWORD)?;
        let recipient = require(ENV_EMAIL_RECEIVER)?;

        let smtp_port = match get(ENV_SMTP_PORT) {
            Some(raw) => raw.trim().parse().map_err(|_| {
                BriefingError::Config(format!("{ENV_SMTP_PORT} is not a valid port: {raw}"))
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        let file_path = config_path
            .map(Path::to_path_buf)
            .or_else(|| get(ENV_CONFIG_PATH).map(PathBuf::from));
        let file = match &file_path {
            Some(path) => QueryTableFile::load(path)?,
            None => QueryTableFile::default(),
        };

        let mut countries = file
            .countries
            .clone()
            .unwrap_or_else(|| DEFAULT_COUNTRIES.iter().map(ToString::to_string).collect());
        if let Some(list) = get(ENV_COUNTRIES) {
            countries = parse_country_list(&list);
        }
        let search_endpoint = file
            .search_endpoint
            .clone()
            .unwrap_or_else(|| NEWS_API_URL.to_string());
        let queries = file.apply(QueryTable::default());

        let config = Self {
            news_api_key,
            search_endpoint,
            openai_api_key,
            openai_base_url: get(ENV_OPENAI_BASE_URL),
            model: get(ENV_OPENAI_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            countries,
            queries,
            prompts_dir: get(ENV_PROMPTS_DIR).map(PathBuf::from),
            mail: MailSettings {
                smtp_host: get(ENV_SMTP_HOST).unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                smtp_port,
                sender,
                password,
                recipient,
                recipient_name: get(ENV_EMAIL_RECIPIENT_NAME),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> BriefingResult<()> {
        if self.countries.is_empty() {
            return Err(BriefingError::Config("country list is empty".to_string()));
        }
        self.queries.validate()
    }
}

fn parse_country_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, String> {
        HashMap::from([
            (ENV_NEWS_API_KEY, "news-key".to_string()),
            (ENV_OPENAI_API_KEY, "openai-key".to_string()),
            (ENV_EMAIL_SENDER, "agent@example.com".to_string()),
            (ENV_EMAIL_PASSWORD, "app-password".to_string()),
            (ENV_EMAIL_RECEIVER, "coo@example.com".to_string()),
        ])
    }

    fn load(
        env: &HashMap<&'static str, String>,
        path: Option<&Path>,
    ) -> BriefingResult<BriefingConfig> {
        BriefingConfig::from_lookup(|k| env.get(k).cloned(), path)
    }

    #[test]
    fn test_defaults() {
        let config = load(&base_env(), None).unwrap();

        assert_eq!(config.countries.len(), 10);
        assert_eq!(config.countries[0], "Germany");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.search_endpoint, NEWS_API_URL);
        assert_eq!(config.mail.smtp_host, "smtp.gmail.com");
        assert_eq!(config.mail.smtp_port, 587);
        assert!(config.mail.recipient_name.is_none());
        assert_eq!(config.queries, QueryTable::default());
    }

    #[test]
    fn test_missing_required_variable() {
        let mut env = base_env();
        env.remove(ENV_EMAIL_RECEIVER);
        let err = load(&env, None).unwrap_err();
        assert!(err.to_string().contains("EMAIL_RECEIVER"));

        let mut env = base_env();
        env.insert(ENV_NEWS_API_KEY, "  ".to_string());
        let err = load(&env, None).unwrap_err();
        assert!(err.to_string().contains("NEWS_API_KEY"));
    }

    #[test]
    fn test_invalid_port() {
        let mut env = base_env();
        env.insert(ENV_SMTP_PORT, "smtp".to_string());
        let err = load(&env, None).unwrap_err();
        assert!(err.to_string().contains("SMTP_PORT"));
    }

    #[test]
    fn test_country_list_from_env() {
        let mut env = base_env();
        env.insert(ENV_COUNTRIES, "Germany, Spain ,,Chile".to_string());
        let config = load(&env, None).unwrap();
        assert_eq!(config.countries, vec!["Germany", "Spain", "Chile"]);

        env.insert(ENV_COUNTRIES, " , ".to_string());
        assert!(load(&env, None).is_err());
    }

    #[test]
    fn test_toml_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("briefing.toml");
        std::fs::write(
            &path,
            r#"
countries = ["Spain", "Portugal"]
primary_country = "Spain"
primary_cap = 4
country_cap = 3

[[primary_queries]]
terms = '(España OR Spain) AND (subasta OR "parque eólico")'
language = "es"
page_size = 3

[[primary_queries]]
terms = '(Spain) AND ("auction results")'
language = "en"
page_size = 3
"#,
        )
        .unwrap();

        let config = load(&base_env(), Some(&path)).unwrap();
        assert_eq!(config.countries, vec!["Spain", "Portugal"]);
        assert_eq!(config.queries.primary_country, "Spain");
        assert_eq!(config.queries.primary_cap, 4);
        assert_eq!(config.queries.country_cap, 3);
        assert_eq!(config.queries.primary_queries.len(), 2);
        assert_eq!(config.queries.primary_queries[0].language, "es");
        // untouched keys keep reference values
        assert_eq!(config.queries.default_query, QueryTable::default().default_query);
    }

    #[test]
    fn test_config_path_from_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("briefing.toml");
        std::fs::write(&path, "country_cap = 0\n").unwrap();

        let mut env = base_env();
        env.insert(ENV_CONFIG_PATH, path.display().to_string());
        let err = load(&env, None).unwrap_err();
        assert!(err.to_string().contains("country_cap"));
    }

    #[test]
    fn test_unknown_toml_key_rejected() {
        assert!(QueryTableFile::parse("recipients = [\"a@b.c\"]").is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&base_env(), None).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("news-key"));
        assert!(!debug.contains("openai-key"));
        assert!(!debug.contains("app-password"));
    }
}
