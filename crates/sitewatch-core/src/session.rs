//! The operator-facing controller: schedule state plus the active crawl.
//!
//! ```text
//!          start                      stop
//! IDLE ----------------> ACTIVE ----------------> IDLE
//!                        |    ^
//!                        +----+ tick: rediscover pages
//! ```
//!
//! Stopping only ends the scheduler loop. Workers of a stopped crawl keep
//! draining the jobs already queued and exit on their own.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;
use uuid::Uuid;

use crate::config::CrawlConfig;
use crate::error::AppError;
use crate::job_queue::job_queue;
use crate::models::QueryResult;
use crate::page::PageProcessor;
use crate::pagination::PaginationDiscoverer;
use crate::report::CrawlReporter;
use crate::scheduler::Scheduler;
use crate::throttle::RateLimiter;
use crate::traits::{Fetcher, ListingParser, ListingStore};
use crate::worker::WorkerPool;

/// Whether a crawl is currently scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Idle,
    Active,
}

impl std::fmt::Display for CrawlState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrawlState::Idle => write!(f, "idle"),
            CrawlState::Active => write!(f, "active"),
        }
    }
}

/// Snapshot of a session for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub state: CrawlState,
    pub root_url: Option<String>,
    pub interval: Option<Duration>,
    pub run_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub draining_pools: usize,
}

struct ActiveCrawl {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    stop: CancellationToken,
    scheduler: JoinHandle<()>,
    workers: WorkerPool,
}

/// Longest accepted refresh interval: one year.
pub const MAX_INTERVAL_MINUTES: u64 = 365 * 24 * 60;

/// Parse an interval in whole minutes. Zero and anything above
/// [`MAX_INTERVAL_MINUTES`] are rejected.
pub fn parse_interval(text: &str) -> Result<Duration, AppError> {
    let minutes: u64 = text.trim().parse().map_err(|_| {
        AppError::InvalidInput(format!(
            "interval must be a whole number of minutes, got {text:?}"
        ))
    })?;
    interval_from_minutes(minutes)
}

fn interval_from_minutes(minutes: u64) -> Result<Duration, AppError> {
    if minutes == 0 {
        return Err(AppError::InvalidInput(
            "interval must be at least 1 minute".into(),
        ));
    }
    if minutes > MAX_INTERVAL_MINUTES {
        return Err(AppError::InvalidInput(format!(
            "interval of {minutes} minutes is too large (at most {MAX_INTERVAL_MINUTES})"
        )));
    }
    Ok(Duration::from_secs(minutes * 60))
}

/// Owns the schedule state and the collaborators of one operator.
pub struct Session<F, P, S>
where
    F: Fetcher + 'static,
    P: ListingParser + 'static,
    S: ListingStore + 'static,
{
    config: CrawlConfig,
    fetcher: F,
    parser: P,
    store: S,
    limiter: RateLimiter,
    reporter: Arc<dyn CrawlReporter>,
    root_url: Option<String>,
    interval: Option<Duration>,
    active: Option<ActiveCrawl>,
    draining: Vec<WorkerPool>,
}

impl<F, P, S> Session<F, P, S>
where
    F: Fetcher + 'static,
    P: ListingParser + 'static,
    S: ListingStore + 'static,
{
    pub fn new(
        config: CrawlConfig,
        fetcher: F,
        parser: P,
        store: S,
        reporter: Arc<dyn CrawlReporter>,
    ) -> Result<Self, AppError> {
        config.validate()?;
        let limiter = RateLimiter::new(config.rate_limit);
        Ok(Self {
            config,
            fetcher,
            parser,
            store,
            limiter,
            reporter,
            root_url: None,
            interval: None,
            active: None,
            draining: Vec::new(),
        })
    }

    pub fn state(&self) -> CrawlState {
        if self.active.is_some() {
            CrawlState::Active
        } else {
            CrawlState::Idle
        }
    }

    /// Set the crawl root. Only absolute http(s) URLs are accepted.
    ///
    /// An active crawl keeps its URL until it is restarted.
    pub fn set_url(&mut self, text: &str) -> Result<(), AppError> {
        let text = text.trim();
        let url = Url::parse(text)
            .map_err(|e| AppError::InvalidInput(format!("invalid url {text:?}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::InvalidInput(format!(
                "url scheme '{}' is not allowed (only http/https)",
                url.scheme()
            )));
        }
        self.root_url = Some(text.to_string());
        Ok(())
    }

    /// Set the refresh period. Zero is rejected.
    pub fn set_interval_minutes(&mut self, minutes: u64) -> Result<(), AppError> {
        self.interval = Some(interval_from_minutes(minutes)?);
        Ok(())
    }

    /// Set the refresh period from operator text.
    pub fn set_interval_text(&mut self, text: &str) -> Result<(), AppError> {
        self.interval = Some(parse_interval(text)?);
        Ok(())
    }

    /// Idle → Active: spawn the worker pool and the scheduler.
    ///
    /// Returns the run id used in logs.
    pub fn start(&mut self) -> Result<Uuid, AppError> {
        if let Some(active) = &self.active {
            return Err(AppError::InvalidState(format!(
                "crawl {} is already running",
                active.run_id
            )));
        }
        let root_url = self
            .root_url
            .clone()
            .ok_or_else(|| AppError::InvalidState("no url set".into()))?;
        let interval = self
            .interval
            .ok_or_else(|| AppError::InvalidState("no interval set".into()))?;

        self.draining.retain(|pool| !pool.is_finished());

        let run_id = Uuid::new_v4();
        let (queue, jobs) = job_queue();

        let workers = WorkerPool::spawn(
            self.config.workers,
            jobs,
            self.fetcher.clone(),
            PageProcessor::new(self.parser.clone(), self.store.clone()),
            self.limiter.clone(),
            Arc::clone(&self.reporter),
            CancellationToken::new(),
        );

        let stop = CancellationToken::new();
        let scheduler = Scheduler::new(
            run_id,
            root_url,
            interval,
            self.fetcher.clone(),
            PaginationDiscoverer::new(self.parser.clone(), self.config.max_pages),
            self.limiter.clone(),
            queue,
        )
        .spawn(stop.clone(), Arc::clone(&self.reporter));

        self.active = Some(ActiveCrawl {
            run_id,
            started_at: Utc::now(),
            stop,
            scheduler,
            workers,
        });

        Ok(run_id)
    }

    /// Active → Idle: end the scheduler loop.
    ///
    /// Waits for the loop to exit, including a discovery pass already in
    /// progress. Queued jobs keep draining through the stopped crawl's
    /// workers.
    pub async fn stop(&mut self) -> Result<Uuid, AppError> {
        let active = self
            .active
            .take()
            .ok_or_else(|| AppError::InvalidState("no crawl is running".into()))?;

        active.stop.cancel();
        if let Err(e) = active.scheduler.await {
            tracing::error!(run_id = %active.run_id, error = %e, "Scheduler task panicked");
        }
        self.draining.push(active.workers);

        Ok(active.run_id)
    }

    /// Forward raw query text to the store.
    pub async fn query(&self, text: &str) -> Result<QueryResult, AppError> {
        self.store.query(text).await
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.state(),
            root_url: self.root_url.clone(),
            interval: self.interval,
            run_id: self.active.as_ref().map(|a| a.run_id),
            started_at: self.active.as_ref().map(|a| a.started_at),
            draining_pools: self.draining.iter().filter(|p| !p.is_finished()).count(),
        }
    }

    /// Tear down on process exit: stop the scheduler and every worker pool.
    pub async fn shutdown(mut self) {
        if self.active.is_some() {
            let _ = self.stop().await;
        }
        for pool in &self.draining {
            pool.cancel();
        }
        for pool in self.draining.drain(..) {
            pool.join().await;
        }
    }
}
