use std::time::Duration;

use crate::error::AppError;

/// Tuning for the crawl pipeline of a session.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Number of workers spawned per active crawl.
    pub workers: usize,
    /// Minimum spacing between two fetches, across all workers.
    pub rate_limit: Duration,
    /// Upper bound for a single page fetch.
    pub fetch_timeout: Duration,
    /// Largest page count a discovery pass will enqueue.
    pub max_pages: u32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            rate_limit: Duration::from_millis(200),
            fetch_timeout: Duration::from_secs(30),
            max_pages: 500,
        }
    }
}

impl CrawlConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: Duration) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.workers == 0 {
            return Err(AppError::Config("at least one worker is required".into()));
        }
        if self.rate_limit.is_zero() {
            return Err(AppError::Config("rate limit must be greater than zero".into()));
        }
        if self.fetch_timeout.is_zero() {
            return Err(AppError::Config(
                "fetch timeout must be greater than zero".into(),
            ));
        }
        if self.max_pages == 0 {
            return Err(AppError::Config("page limit must be at least 1".into()));
        }
        Ok(())
    }
}
