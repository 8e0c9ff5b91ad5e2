use std::future::Future;

use crate::error::AppError;
use crate::models::{ListingRecord, QueryResult, RawListing};

/// Fetches the raw bytes behind a URL.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, AppError>> + Send;
}

/// Locates listing rows and pagination in a page's markup.
///
/// Both methods fail with [`AppError::MalformedPage`] when the bytes cannot
/// be parsed into a node tree at all.
pub trait ListingParser: Send + Sync + Clone {
    /// Text fragments of every listing row, in document order.
    fn rows(&self, page: &[u8]) -> Result<Vec<RawListing>, AppError>;

    /// Text of the "last page" control, or `None` when the page carries no
    /// pagination control.
    fn last_page(&self, page: &[u8]) -> Result<Option<String>, AppError>;
}

/// Persists listings keyed by id and answers ad-hoc read queries.
pub trait ListingStore: Send + Sync + Clone {
    /// Insert the record, or overwrite every non-key field if its id exists.
    ///
    /// Must be atomic per key; workers call this concurrently.
    fn upsert(&self, record: &ListingRecord) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Run raw query text against the store.
    fn query(&self, text: &str) -> impl Future<Output = Result<QueryResult, AppError>> + Send;
}
