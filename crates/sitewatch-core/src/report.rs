use uuid::Uuid;

use crate::error::AppError;
use crate::page::PageSummary;

/// Events emitted by the scheduler and workers for monitoring/logging.
#[derive(Debug, Clone, Copy)]
pub enum CrawlEvent<'a> {
    SchedulerStarted {
        run_id: Uuid,
        root_url: &'a str,
    },
    DiscoveryStarted {
        run_id: Uuid,
        root_url: &'a str,
    },
    DiscoveryCompleted {
        run_id: Uuid,
        pages: usize,
    },
    DiscoveryFailed {
        run_id: Uuid,
        error: &'a AppError,
    },
    SchedulerStopped {
        run_id: Uuid,
    },
    WorkerStarted {
        worker: usize,
    },
    JobStarted {
        worker: usize,
        url: &'a str,
    },
    PageProcessed {
        worker: usize,
        url: &'a str,
        summary: &'a PageSummary,
    },
    JobFailed {
        worker: usize,
        url: &'a str,
        error: &'a AppError,
    },
    WorkerStopped {
        worker: usize,
    },
}

/// Trait for receiving crawl events (decoupled logging).
pub trait CrawlReporter: Send + Sync {
    fn report(&self, event: CrawlEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl CrawlReporter for TracingReporter {
    fn report(&self, event: CrawlEvent<'_>) {
        match event {
            CrawlEvent::SchedulerStarted { run_id, root_url } => {
                tracing::info!(%run_id, %root_url, "Scheduler started");
            }
            CrawlEvent::DiscoveryStarted { run_id, root_url } => {
                tracing::debug!(%run_id, %root_url, "Refreshing page list");
            }
            CrawlEvent::DiscoveryCompleted { run_id, pages } => {
                tracing::info!(%run_id, %pages, "Page jobs enqueued");
            }
            CrawlEvent::DiscoveryFailed { run_id, error } => {
                tracing::warn!(%run_id, kind = error.kind(), %error, "Page list refresh failed");
            }
            CrawlEvent::SchedulerStopped { run_id } => {
                tracing::info!(%run_id, "Scheduler stopped");
            }
            CrawlEvent::WorkerStarted { worker } => {
                tracing::debug!(%worker, "Worker started");
            }
            CrawlEvent::JobStarted { worker, url } => {
                tracing::debug!(%worker, %url, "Fetching page");
            }
            CrawlEvent::PageProcessed {
                worker,
                url,
                summary,
            } => {
                tracing::info!(
                    %worker,
                    %url,
                    rows = summary.rows,
                    upserted = summary.upserted,
                    skipped = summary.skipped,
                    "Page processed"
                );
            }
            CrawlEvent::JobFailed { worker, url, error } => {
                tracing::warn!(%worker, %url, kind = error.kind(), %error, "Job dropped");
            }
            CrawlEvent::WorkerStopped { worker } => {
                tracing::debug!(%worker, "Worker stopped");
            }
        }
    }
}
