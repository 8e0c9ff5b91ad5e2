use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::AppError;
use crate::job_queue::JobQueue;
use crate::pagination::PaginationDiscoverer;
use crate::report::{CrawlEvent, CrawlReporter};
use crate::throttle::RateLimiter;
use crate::traits::{Fetcher, ListingParser};

/// Periodically re-derives the page list of a root URL and feeds the queue.
///
/// The page count is never cached: every pass fetches the root page again, so
/// a listing that grows or shrinks is picked up on the next tick.
pub struct Scheduler<F, P>
where
    F: Fetcher,
    P: ListingParser,
{
    run_id: Uuid,
    root_url: String,
    interval: Duration,
    fetcher: F,
    discoverer: PaginationDiscoverer<P>,
    limiter: RateLimiter,
    queue: JobQueue,
}

impl<F, P> Scheduler<F, P>
where
    F: Fetcher,
    P: ListingParser,
{
    pub fn new(
        run_id: Uuid,
        root_url: impl Into<String>,
        interval: Duration,
        fetcher: F,
        discoverer: PaginationDiscoverer<P>,
        limiter: RateLimiter,
        queue: JobQueue,
    ) -> Self {
        Self {
            run_id,
            root_url: root_url.into(),
            interval,
            fetcher,
            discoverer,
            limiter,
            queue,
        }
    }

    /// One discovery pass: fetch the root page and enqueue a job per page.
    ///
    /// Returns the number of jobs enqueued.
    pub async fn discover_once(&self) -> Result<usize, AppError> {
        self.limiter.acquire().await;
        let page = self.fetcher.fetch(&self.root_url).await?;
        let jobs = self.discoverer.discover(&self.root_url, &page)?;
        Ok(self.queue.push_all(jobs))
    }

    /// Run an immediate pass, then one pass per interval until `stop` fires.
    ///
    /// Consumes the scheduler; its queue handle is dropped on exit so workers
    /// can drain what is left and stop.
    pub async fn run(self, stop: CancellationToken, reporter: &dyn CrawlReporter) {
        reporter.report(CrawlEvent::SchedulerStarted {
            run_id: self.run_id,
            root_url: &self.root_url,
        });

        self.pass(reporter).await;

        // Later deadlines must stay representable as an `Instant`.
        match Instant::now().checked_add(self.interval.saturating_mul(2)) {
            Some(_) => self.tick_until(&stop, reporter).await,
            None => {
                tracing::warn!(
                    run_id = %self.run_id,
                    interval = ?self.interval,
                    "Interval too large to schedule, no further passes"
                );
                stop.cancelled().await;
            }
        }

        reporter.report(CrawlEvent::SchedulerStopped {
            run_id: self.run_id,
        });
    }

    async fn tick_until(&self, stop: &CancellationToken, reporter: &dyn CrawlReporter) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = stop.cancelled() => return,
                _ = ticker.tick() => self.pass(reporter).await,
            }
        }
    }

    async fn pass(&self, reporter: &dyn CrawlReporter) {
        reporter.report(CrawlEvent::DiscoveryStarted {
            run_id: self.run_id,
            root_url: &self.root_url,
        });
        match self.discover_once().await {
            Ok(pages) => reporter.report(CrawlEvent::DiscoveryCompleted {
                run_id: self.run_id,
                pages,
            }),
            Err(error) => reporter.report(CrawlEvent::DiscoveryFailed {
                run_id: self.run_id,
                error: &error,
            }),
        }
    }

    /// Spawn [`run`](Self::run) on the runtime.
    pub fn spawn(
        self,
        stop: CancellationToken,
        reporter: Arc<dyn CrawlReporter>,
    ) -> tokio::task::JoinHandle<()>
    where
        F: 'static,
        P: 'static,
    {
        tokio::spawn(async move { self.run(stop, reporter.as_ref()).await })
    }
}
