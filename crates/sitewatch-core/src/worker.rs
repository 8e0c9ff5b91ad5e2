use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::job_queue::JobReceiver;
use crate::models::CrawlJob;
use crate::page::PageProcessor;
use crate::report::{CrawlEvent, CrawlReporter};
use crate::throttle::RateLimiter;
use crate::traits::{Fetcher, ListingParser, ListingStore};

/// A single worker draining the job queue.
pub struct Worker<F, P, S>
where
    F: Fetcher,
    P: ListingParser,
    S: ListingStore,
{
    id: usize,
    jobs: JobReceiver,
    fetcher: F,
    processor: PageProcessor<P, S>,
    limiter: RateLimiter,
}

impl<F, P, S> Worker<F, P, S>
where
    F: Fetcher,
    P: ListingParser,
    S: ListingStore,
{
    pub fn new(
        id: usize,
        jobs: JobReceiver,
        fetcher: F,
        processor: PageProcessor<P, S>,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            id,
            jobs,
            fetcher,
            processor,
            limiter,
        }
    }

    /// Run until the queue is closed and drained, or until `shutdown` fires.
    pub async fn run(&self, shutdown: CancellationToken, reporter: &dyn CrawlReporter) {
        reporter.report(CrawlEvent::WorkerStarted { worker: self.id });

        loop {
            let job = tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                job = self.jobs.recv() => job,
            };
            let Some(job) = job else {
                break;
            };

            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                () = self.limiter.acquire() => {}
            }

            self.process_job(&job, reporter).await;
        }

        reporter.report(CrawlEvent::WorkerStopped { worker: self.id });
    }

    async fn process_job(&self, job: &CrawlJob, reporter: &dyn CrawlReporter) {
        reporter.report(CrawlEvent::JobStarted {
            worker: self.id,
            url: &job.url,
        });

        let result = match self.fetcher.fetch(&job.url).await {
            Ok(page) => self.processor.process(&job.url, &page).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(summary) => reporter.report(CrawlEvent::PageProcessed {
                worker: self.id,
                url: &job.url,
                summary: &summary,
            }),
            Err(error) => reporter.report(CrawlEvent::JobFailed {
                worker: self.id,
                url: &job.url,
                error: &error,
            }),
        }
    }
}

/// Handles of the workers spawned for one active crawl.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    shutdown: CancellationToken,
}

impl WorkerPool {
    /// Spawn `count` workers sharing one receiver and one rate limiter.
    pub fn spawn<F, P, S>(
        count: usize,
        jobs: JobReceiver,
        fetcher: F,
        processor: PageProcessor<P, S>,
        limiter: RateLimiter,
        reporter: Arc<dyn CrawlReporter>,
        shutdown: CancellationToken,
    ) -> Self
    where
        F: Fetcher + 'static,
        P: ListingParser + 'static,
        S: ListingStore + 'static,
    {
        let handles = (0..count.max(1))
            .map(|id| {
                let worker = Worker::new(
                    id,
                    jobs.clone(),
                    fetcher.clone(),
                    processor.clone(),
                    limiter.clone(),
                );
                let reporter = Arc::clone(&reporter);
                let shutdown = shutdown.clone();
                tokio::spawn(async move { worker.run(shutdown, reporter.as_ref()).await })
            })
            .collect();

        Self { handles, shutdown }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// True once every worker has exited.
    pub fn is_finished(&self) -> bool {
        self.handles.iter().all(JoinHandle::is_finished)
    }

    /// Abandon queued jobs. A page already being processed finishes first.
    pub fn cancel(&self) {
        self.shutdown.cancel();
    }

    /// Wait for every worker to exit.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Worker task panicked");
            }
        }
    }
}
