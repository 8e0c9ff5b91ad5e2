//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::models::{ListingRecord, QueryResult, RawListing};
use crate::report::{CrawlEvent, CrawlReporter};
use crate::traits::{Fetcher, ListingParser, ListingStore};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher that returns queued responses and records requested URLs.
#[derive(Clone)]
pub struct MockFetcher {
    /// Queue of responses. Each call pops the first element.
    /// If empty, returns a default HTML page.
    responses: Arc<Mutex<Vec<Result<Vec<u8>, AppError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new(html: &str) -> Self {
        Self::with_responses(vec![Ok(html.as_bytes().to_vec())])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<Vec<u8>, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError> {
        self.calls.lock().unwrap().push(url.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(b"<html><body>default</body></html>".to_vec())
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockParser
// ---------------------------------------------------------------------------

/// Mock parser returning the same rows and pagination for every page.
#[derive(Clone)]
pub struct MockParser {
    rows: Vec<RawListing>,
    last_page: Option<String>,
    malformed: bool,
}

impl MockParser {
    pub fn with_rows(rows: Vec<RawListing>) -> Self {
        Self {
            rows,
            last_page: None,
            malformed: false,
        }
    }

    pub fn with_last_page(last_page: Option<&str>) -> Self {
        Self {
            rows: Vec::new(),
            last_page: last_page.map(str::to_string),
            malformed: false,
        }
    }

    pub fn paged(rows: Vec<RawListing>, last_page: &str) -> Self {
        Self {
            rows,
            last_page: Some(last_page.to_string()),
            malformed: false,
        }
    }

    /// Every page fails to parse.
    pub fn malformed() -> Self {
        Self {
            rows: Vec::new(),
            last_page: None,
            malformed: true,
        }
    }

    fn check(&self) -> Result<(), AppError> {
        if self.malformed {
            Err(AppError::MalformedPage("mock malformed page".into()))
        } else {
            Ok(())
        }
    }
}

impl ListingParser for MockParser {
    fn rows(&self, _page: &[u8]) -> Result<Vec<RawListing>, AppError> {
        self.check()?;
        Ok(self.rows.clone())
    }

    fn last_page(&self, _page: &[u8]) -> Result<Option<String>, AppError> {
        self.check()?;
        Ok(self.last_page.clone())
    }
}

// ---------------------------------------------------------------------------
// MockStore
// ---------------------------------------------------------------------------

/// Mock store that records upserts and queries.
#[derive(Clone)]
pub struct MockStore {
    upserted: Arc<Mutex<Vec<ListingRecord>>>,
    queries: Arc<Mutex<Vec<String>>>,
    calls: Arc<Mutex<usize>>,
    /// 1-based upsert call that fails, if any.
    fail_on: Option<usize>,
}

impl MockStore {
    pub fn empty() -> Self {
        Self {
            upserted: Arc::new(Mutex::new(Vec::new())),
            queries: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(0)),
            fail_on: None,
        }
    }

    /// Store whose `call`-th upsert fails.
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Self::empty()
        }
    }

    pub fn upserted(&self) -> Vec<ListingRecord> {
        self.upserted.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl ListingStore for MockStore {
    async fn upsert(&self, record: &ListingRecord) -> Result<(), AppError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if self.fail_on == Some(call) {
            return Err(AppError::Store("database is locked".into()));
        }
        self.upserted.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn query(&self, text: &str) -> Result<QueryResult, AppError> {
        self.queries.lock().unwrap().push(text.to_string());
        Ok(QueryResult::default())
    }
}

// ---------------------------------------------------------------------------
// RecordingReporter
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Counts {
    discoveries: usize,
    discovery_failures: usize,
    schedulers_stopped: usize,
    pages_processed: usize,
    jobs_failed: usize,
    workers_stopped: usize,
}

/// Reporter that counts events for assertions.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    counts: Arc<Mutex<Counts>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn discoveries(&self) -> usize {
        self.counts.lock().unwrap().discoveries
    }

    pub fn discovery_failures(&self) -> usize {
        self.counts.lock().unwrap().discovery_failures
    }

    pub fn schedulers_stopped(&self) -> usize {
        self.counts.lock().unwrap().schedulers_stopped
    }

    pub fn pages_processed(&self) -> usize {
        self.counts.lock().unwrap().pages_processed
    }

    pub fn jobs_failed(&self) -> usize {
        self.counts.lock().unwrap().jobs_failed
    }

    pub fn workers_stopped(&self) -> usize {
        self.counts.lock().unwrap().workers_stopped
    }
}

impl CrawlReporter for RecordingReporter {
    fn report(&self, event: CrawlEvent<'_>) {
        let mut counts = self.counts.lock().unwrap();
        match event {
            CrawlEvent::DiscoveryStarted { .. } => counts.discoveries += 1,
            CrawlEvent::DiscoveryFailed { .. } => counts.discovery_failures += 1,
            CrawlEvent::SchedulerStopped { .. } => counts.schedulers_stopped += 1,
            CrawlEvent::PageProcessed { .. } => counts.pages_processed += 1,
            CrawlEvent::JobFailed { .. } => counts.jobs_failed += 1,
            CrawlEvent::WorkerStopped { .. } => counts.workers_stopped += 1,
            _ => {}
        }
    }
}
