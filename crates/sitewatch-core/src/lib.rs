pub mod config;
pub mod error;
pub mod extract;
pub mod job_queue;
pub mod mapper;
pub mod models;
pub mod page;
pub mod pagination;
pub mod report;
pub mod scheduler;
pub mod session;
pub mod throttle;
pub mod traits;
pub mod worker;

#[cfg(test)]
mod testutil;

pub use config::CrawlConfig;
pub use error::AppError;
pub use models::{CrawlJob, DetailFields, ListingRecord, QueryResult, RawListing, YearMonth};
pub use report::{CrawlEvent, CrawlReporter, TracingReporter};
pub use session::{CrawlState, Session, SessionStatus};
pub use traits::{Fetcher, ListingParser, ListingStore};
