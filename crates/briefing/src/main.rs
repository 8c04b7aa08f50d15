//! Briefing CLI - fetch, summarize and email the daily renewable-energy news.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use briefing::{BriefingConfig, Pipeline};

/// Daily renewable-energy news briefing.
#[derive(Parser)]
#[command(name = "briefing")]
#[command(about = "Search renewable-energy news, summarize it and email the briefing")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// TOML file overriding countries and query templates
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Variables already in the environment win over .env
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("briefing=debug,info")
        } else {
            EnvFilter::new("briefing=info,warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config =
        BriefingConfig::from_env(cli.config.as_deref()).context("Failed to load configuration")?;
    tracing::debug!(?config, "Loaded configuration");

    let pipeline = Pipeline::from_config(&config).context("Failed to set up pipeline")?;

    let run_date = Local::now().date_naive();
    let report = pipeline
        .run(run_date, |stage| println!("{stage}"))
        .await
        .context("Briefing run failed")?;

    tracing::info!(
        subject = %report.subject,
        articles = report.articles,
        failed_queries = report.queries_failed,
        "Briefing delivered"
    );

    Ok(())
}
