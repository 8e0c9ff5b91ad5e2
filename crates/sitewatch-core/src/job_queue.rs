use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::models::CrawlJob;

/// Producer side of the in-memory crawl job queue.
///
/// Unbounded, no deduplication, no priority. Jobs sent from one handle are
/// received in the order they were sent.
#[derive(Clone)]
pub struct JobQueue {
    tx: UnboundedSender<CrawlJob>,
}

/// Consumer side, shared by every worker of a pool.
#[derive(Clone)]
pub struct JobReceiver {
    rx: Arc<Mutex<UnboundedReceiver<CrawlJob>>>,
}

/// Create a connected queue/receiver pair.
pub fn job_queue() -> (JobQueue, JobReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        JobQueue { tx },
        JobReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

impl JobQueue {
    /// Enqueue one job. Returns false if every receiver is gone.
    pub fn push(&self, job: CrawlJob) -> bool {
        self.tx.send(job).is_ok()
    }

    /// Enqueue jobs in order, returning how many were accepted.
    pub fn push_all(&self, jobs: impl IntoIterator<Item = CrawlJob>) -> usize {
        let mut sent = 0;
        for job in jobs {
            if !self.push(job) {
                break;
            }
            sent += 1;
        }
        sent
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl JobReceiver {
    /// Wait for the next job. Returns `None` once the queue is closed and
    /// drained.
    pub async fn recv(&self) -> Option<CrawlJob> {
        self.rx.lock().await.recv().await
    }
}
