//! Field extraction from noisy listing text.
//!
//! Listing fragments mix numbers with unit suffixes and locale-specific
//! thousands separators ("1 234 km", "1.598 cm³"). [`extract_int`] keeps
//! only the decimal digits, in order, and parses what is left. It is not a
//! general number parser: "1,5" becomes 15.

use crate::models::YearMonth;

/// Concatenate every run of ASCII digits in `text` and parse the result.
///
/// Returns `None` when `text` has no digits or the digits overflow `i64`.
pub fn extract_int(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Parse a `year/month` fragment such as `"2015/03"`.
///
/// The year is mandatory. The month is only read when the split yields
/// exactly two parts, and an unparseable month is treated as absent.
pub fn extract_year_month(text: &str) -> Option<YearMonth> {
    let parts: Vec<&str> = text.split('/').collect();
    let year = parts.first()?.trim().parse::<i32>().ok()?;
    let month = match parts.as_slice() {
        [_, month] => month.trim().parse::<u32>().ok(),
        _ => None,
    };
    Some(YearMonth { year, month })
}
