//! Page-count discovery from the first page of a listing.

use std::num::IntErrorKind;

use crate::error::AppError;
use crate::models::CrawlJob;
use crate::traits::ListingParser;

/// Interpret the "last page" control text as a page count.
///
/// No control means a single page. Unparseable text also falls back to a
/// single page, so unexpected pagination markup under-crawls instead of
/// failing. Counts above `max_pages` are clamped.
pub fn page_count(last_page: Option<&str>, max_pages: u32) -> u32 {
    let Some(text) = last_page else {
        return 1;
    };
    let max_pages = max_pages.max(1);
    let parsed = match text.trim().parse::<u32>() {
        Ok(n) => Some(n),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(u32::MAX),
        Err(_) => None,
    };
    match parsed {
        Some(n) if n > max_pages => {
            tracing::warn!(
                text = %text,
                max_pages,
                "Last-page control exceeds the page limit, clamping"
            );
            max_pages
        }
        Some(n) => n.max(1),
        None => {
            tracing::warn!(text = %text, "Unreadable last-page control, assuming a single page");
            1
        }
    }
}

/// Jobs for `total` pages: the root itself, then `root/page2..=root/pageN`.
pub fn page_jobs(root_url: &str, total: u32) -> Vec<CrawlJob> {
    let base = root_url.trim_end_matches('/');
    let mut jobs = vec![CrawlJob::new(root_url)];
    for n in 2..=total {
        jobs.push(CrawlJob::new(format!("{base}/page{n}")));
    }
    jobs
}

/// Derives the list of page jobs from the first page of a listing.
#[derive(Clone)]
pub struct PaginationDiscoverer<P: ListingParser> {
    parser: P,
    max_pages: u32,
}

impl<P: ListingParser> PaginationDiscoverer<P> {
    pub fn new(parser: P, max_pages: u32) -> Self {
        Self { parser, max_pages }
    }

    /// Plan one job per page, root first then ascending page number.
    pub fn discover(&self, root_url: &str, first_page: &[u8]) -> Result<Vec<CrawlJob>, AppError> {
        let last = self.parser.last_page(first_page)?;
        let total = page_count(last.as_deref(), self.max_pages);
        tracing::debug!(root = %root_url, pages = total, "Pagination discovered");
        Ok(page_jobs(root_url, total))
    }
}
