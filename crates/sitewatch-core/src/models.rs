use std::fmt;

/// Build year plus optional month, as printed in a listing's detail line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: Option<u32>,
}

/// The six positional detail slots of a listing.
///
/// Slots whose extraction failed keep their zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub engine: String,
    pub year_month: YearMonth,
    pub engine_size_cc: i64,
    pub power_kw: i64,
    pub power_hp: i64,
    pub kilometers: i64,
}

/// One crawled listing. `id` is the upsert key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    pub id: i64,
    pub title: String,
    pub price: i64,
    pub details: DetailFields,
}

/// The raw text fragments of one listing row, before mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListing {
    pub id_text: String,
    pub title_text: String,
    pub price_text: String,
    pub detail_text: String,
}

/// A page to fetch. No identity beyond the URL; duplicates are legal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrawlJob {
    pub url: String,
}

impl CrawlJob {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl fmt::Display for CrawlJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Result of an ad-hoc store query, every cell rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
