use crate::error::AppError;
use crate::mapper::map_listing;
use crate::traits::{ListingParser, ListingStore};

/// Counters for one processed page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageSummary {
    pub rows: usize,
    pub upserted: usize,
    pub skipped: usize,
    pub store_failures: usize,
    pub warnings: usize,
}

/// Turns a fetched listing page into upserted records.
///
/// Each row is handled on its own: a row that fails mapping is logged and
/// skipped, and a failed upsert does not stop the rest of the page.
#[derive(Clone)]
pub struct PageProcessor<P, S>
where
    P: ListingParser,
    S: ListingStore,
{
    parser: P,
    store: S,
}

impl<P, S> PageProcessor<P, S>
where
    P: ListingParser,
    S: ListingStore,
{
    pub fn new(parser: P, store: S) -> Self {
        Self { parser, store }
    }

    /// Process one page. Only a page that cannot be parsed at all is an error.
    pub async fn process(&self, url: &str, page: &[u8]) -> Result<PageSummary, AppError> {
        let rows = self.parser.rows(page)?;
        let mut summary = PageSummary {
            rows: rows.len(),
            ..PageSummary::default()
        };

        for (index, raw) in rows.iter().enumerate() {
            let mapped = match map_listing(raw) {
                Ok(mapped) => mapped,
                Err(e) => {
                    tracing::warn!(%url, row = index, kind = e.kind(), error = %e, "Skipping listing row");
                    summary.skipped += 1;
                    continue;
                }
            };

            for warning in &mapped.warnings {
                tracing::warn!(
                    %url,
                    id = mapped.record.id,
                    slot = %warning.slot,
                    text = %warning.text,
                    "Could not extract detail field"
                );
            }
            summary.warnings += mapped.warnings.len();

            match self.store.upsert(&mapped.record).await {
                Ok(()) => summary.upserted += 1,
                Err(e) => {
                    tracing::error!(%url, id = mapped.record.id, error = %e, "Upsert failed");
                    summary.store_failures += 1;
                }
            }
        }

        Ok(summary)
    }
}
