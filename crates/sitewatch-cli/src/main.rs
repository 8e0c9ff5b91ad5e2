mod output;
mod shell;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sitewatch_client::{HtmlListingParser, ListingSelectors, ReqwestFetcher};
use sitewatch_core::config::CrawlConfig;
use sitewatch_core::report::TracingReporter;
use sitewatch_core::session::Session;
use sitewatch_db::{Database, DatabaseConfig};

use crate::shell::Shell;

#[derive(Parser)]
#[command(
    name = "sitewatch",
    version,
    about = "Periodically crawl a paginated listing site into SQLite"
)]
struct Cli {
    /// Root URL of the listing to watch
    #[arg(short, long, env = "SITEWATCH_URL")]
    url: Option<String>,

    /// Refresh interval in minutes
    #[arg(short, long, env = "SITEWATCH_INTERVAL")]
    interval: Option<String>,

    /// Number of concurrent page workers
    #[arg(short, long, env = "SITEWATCH_WORKERS", default_value_t = 1)]
    workers: usize,

    /// Minimum spacing between requests, in milliseconds
    #[arg(long, env = "SITEWATCH_RATE_LIMIT_MS", default_value_t = 200)]
    rate_limit_ms: u64,

    /// Per-request fetch timeout, in seconds
    #[arg(long, env = "SITEWATCH_FETCH_TIMEOUT_SECS", default_value_t = 30)]
    fetch_timeout_secs: u64,

    /// Largest number of pages one discovery pass enqueues
    #[arg(long, env = "SITEWATCH_MAX_PAGES", default_value_t = 500)]
    max_pages: u32,

    /// JSON file overriding the default CSS selectors
    #[arg(long)]
    selectors: Option<PathBuf>,

    /// Start crawling immediately (requires --url and --interval)
    #[arg(long, default_value_t = false)]
    start: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries command output only
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sitewatch=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = CrawlConfig::default()
        .with_workers(cli.workers)
        .with_rate_limit(Duration::from_millis(cli.rate_limit_ms))
        .with_fetch_timeout(Duration::from_secs(cli.fetch_timeout_secs))
        .with_max_pages(cli.max_pages);

    let selectors = match &cli.selectors {
        Some(path) => ListingSelectors::from_file(path)?,
        None => ListingSelectors::default(),
    };
    let parser = HtmlListingParser::with_selectors(&selectors)?;
    let fetcher = ReqwestFetcher::with_timeout(config.fetch_timeout)
        .context("Failed to create HTTP client")?;

    let db_config = DatabaseConfig::from_env()?;
    let db = Database::open(&db_config)
        .await
        .with_context(|| format!("Failed to open database {}", db_config.url))?;
    if db_config.is_in_memory() {
        tracing::info!("Using an in-memory database; listings are lost on exit");
    }

    let mut session = Session::new(
        config,
        fetcher,
        parser,
        db.listing_repo(),
        Arc::new(TracingReporter),
    )?;

    if let Some(url) = &cli.url {
        session.set_url(url)?;
    }
    if let Some(interval) = &cli.interval {
        session.set_interval_text(interval)?;
    }
    if cli.start {
        let run_id = session.start()?;
        tracing::info!(%run_id, "Crawl started from command line");
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    Shell::new(session)
        .run(stdin, std::io::stdout())
        .await
        .context("Shell I/O failed")?;

    db.pool().close().await;
    Ok(())
}
