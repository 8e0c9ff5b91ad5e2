use std::path::Path;
use std::sync::Arc;

use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use sitewatch_core::error::AppError;
use sitewatch_core::models::RawListing;
use sitewatch_core::traits::ListingParser;

/// CSS selectors describing where listing fragments live in a page.
///
/// Defaults match the markup of the car listing site sitewatch was built
/// for. Any subset can be overridden from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListingSelectors {
    /// Listing view; every match is searched for rows.
    pub container: String,
    /// One listing row inside a container.
    pub row: String,
    /// Listing code; text of all matches is concatenated.
    pub id: String,
    /// Title; text of all matches is concatenated.
    pub title: String,
    /// Price; the last match wins.
    pub price: String,
    /// Detail block; the last match wins.
    pub details: String,
    /// Text nodes inside the detail block, concatenated.
    pub detail_text: String,
    /// Pagination control. Its absence means a single page.
    pub pagination: String,
    /// "Last page" link inside the pagination control.
    pub last_page: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            container: ".list-view".into(),
            row: ".talalati-sor".into(),
            id: ".talalatisor-hirkod".into(),
            title: "h3".into(),
            price: ".vetelar".into(),
            details: ".talalatisor-info.adatok".into(),
            detail_text: "span".into(),
            pagination: ".pagination".into(),
            last_page: ".last".into(),
        }
    }
}

impl ListingSelectors {
    /// Load selector overrides from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!(
                "Failed to read selectors file {}: {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&text)
            .map_err(|e| AppError::Config(format!("Invalid selectors file: {e}")))
    }
}

struct Compiled {
    container: Selector,
    row: Selector,
    id: Selector,
    title: Selector,
    price: Selector,
    details: Selector,
    detail_text: Selector,
    pagination: Selector,
    last_page: Selector,
}

/// HTML listing parser using scraper.
#[derive(Clone)]
pub struct HtmlListingParser {
    selectors: Arc<Compiled>,
}

impl HtmlListingParser {
    pub fn new() -> Result<Self, AppError> {
        Self::with_selectors(&ListingSelectors::default())
    }

    pub fn with_selectors(selectors: &ListingSelectors) -> Result<Self, AppError> {
        let compiled = Compiled {
            container: compile("container", &selectors.container)?,
            row: compile("row", &selectors.row)?,
            id: compile("id", &selectors.id)?,
            title: compile("title", &selectors.title)?,
            price: compile("price", &selectors.price)?,
            details: compile("details", &selectors.details)?,
            detail_text: compile("detail_text", &selectors.detail_text)?,
            pagination: compile("pagination", &selectors.pagination)?,
            last_page: compile("last_page", &selectors.last_page)?,
        };
        Ok(Self {
            selectors: Arc::new(compiled),
        })
    }

    fn row_fragments(&self, row: ElementRef<'_>) -> RawListing {
        let s = &self.selectors;
        RawListing {
            id_text: all_text(row, &s.id),
            title_text: all_text(row, &s.title),
            price_text: row.select(&s.price).last().map(text_of).unwrap_or_default(),
            detail_text: row
                .select(&s.details)
                .last()
                .map(|block| all_text(block, &s.detail_text))
                .unwrap_or_default(),
        }
    }
}

fn compile(name: &str, selector: &str) -> Result<Selector, AppError> {
    Selector::parse(selector)
        .map_err(|e| AppError::Config(format!("Invalid {name} selector '{selector}': {e}")))
}

// Invalid UTF-8 sequences become U+FFFD; the HTML5 tree builder recovers
// from any markup, so a page never fails to parse.
fn parse_document(page: &[u8]) -> Html {
    Html::parse_document(&String::from_utf8_lossy(page))
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

fn all_text(scope: ElementRef<'_>, selector: &Selector) -> String {
    scope.select(selector).map(text_of).collect()
}

impl ListingParser for HtmlListingParser {
    fn rows(&self, page: &[u8]) -> Result<Vec<RawListing>, AppError> {
        let document = parse_document(page);
        let s = &self.selectors;
        let rows = document
            .select(&s.container)
            .flat_map(|container| container.select(&s.row))
            .map(|row| self.row_fragments(row))
            .collect();
        Ok(rows)
    }

    fn last_page(&self, page: &[u8]) -> Result<Option<String>, AppError> {
        let document = parse_document(page);
        let s = &self.selectors;
        let Some(pagination) = document.select(&s.pagination).next() else {
            return Ok(None);
        };
        Ok(Some(
            pagination
                .select(&s.last_page)
                .next()
                .map(text_of)
                .unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const PAGE: &str = r#"
<html><body>
<div class="list-view">
  <div class="talalati-sor">
    <h3><a href="/a">Skoda Octavia 1.6 CR TDI</a></h3>
    <div class="vetelar">Akciós ár</div>
    <div class="vetelar">3.290.000 Ft</div>
    <div class="talalatisor-info adatok"><span>Dízel, 2015/03, 1 598 cm³, </span><span>81 kW, 110 LE, 152 000 km</span></div>
    <div class="talalatisor-hirkod">Kód: 15838406</div>
  </div>
  <div class="talalati-sor">
    <h3>Opel Astra</h3>
    <div class="vetelar">990.000 Ft</div>
    <div class="talalatisor-info">ignored, 1999</div>
    <div class="talalatisor-hirkod">Kód: 100</div>
  </div>
</div>
<ul class="pagination"><li class="first">1</li><li class="last">17</li></ul>
</body></html>
"#;

    #[test]
    fn test_extracts_rows_in_order() {
        let parser = HtmlListingParser::new().unwrap();
        let rows = parser.rows(PAGE.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id_text, "Kód: 15838406");
        assert_eq!(rows[0].title_text, "Skoda Octavia 1.6 CR TDI");
        assert_eq!(rows[0].price_text, "3.290.000 Ft");
        assert_eq!(
            rows[0].detail_text,
            "Dízel, 2015/03, 1 598 cm³, 81 kW, 110 LE, 152 000 km"
        );
        assert_eq!(rows[1].id_text, "Kód: 100");
        assert_eq!(rows[1].detail_text, "");
    }

    #[test]
    fn test_rows_outside_container_are_ignored() {
        let html = r#"<div class="talalati-sor"><div class="talalatisor-hirkod">1</div></div>"#;
        let parser = HtmlListingParser::new().unwrap();
        assert!(parser.rows(html.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_last_page_text() {
        let parser = HtmlListingParser::new().unwrap();
        assert_eq!(
            parser.last_page(PAGE.as_bytes()).unwrap().as_deref(),
            Some("17")
        );
    }

    #[test]
    fn test_no_pagination_control() {
        let parser = HtmlListingParser::new().unwrap();
        let html = "<html><body><div class=\"list-view\"></div></body></html>";
        assert_eq!(parser.last_page(html.as_bytes()).unwrap(), None);
    }

    #[test]
    fn test_pagination_without_last_link_is_empty_text() {
        let parser = HtmlListingParser::new().unwrap();
        let html = r#"<ul class="pagination"><li>1</li></ul>"#;
        assert_eq!(
            parser.last_page(html.as_bytes()).unwrap().as_deref(),
            Some("")
        );
    }

    #[test]
    fn test_stray_non_utf8_bytes_keep_the_page() {
        // "Dízel" in Latin-2 is a lone 0xED byte.
        let (head, tail) = PAGE.split_once("Dízel").unwrap();
        let mut page = head.as_bytes().to_vec();
        page.extend_from_slice(b"D\xEDzel");
        page.extend_from_slice(tail.as_bytes());

        let parser = HtmlListingParser::new().unwrap();
        let rows = parser.rows(&page).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id_text, "Kód: 15838406");
        assert!(rows[0].detail_text.starts_with("D\u{FFFD}zel, 2015/03"));
        assert_eq!(parser.last_page(&page).unwrap().as_deref(), Some("17"));
    }

    #[test]
    fn test_garbage_bytes_parse_to_empty_page() {
        let parser = HtmlListingParser::new().unwrap();
        assert!(parser.rows(b"\xff\xfe\x00<<<").unwrap().is_empty());
        assert_eq!(parser.last_page(b"\xc3\x28").unwrap(), None);
    }

    #[test]
    fn test_invalid_selector_is_config_error() {
        let selectors = ListingSelectors {
            row: "div[".into(),
            ..ListingSelectors::default()
        };
        let err = HtmlListingParser::with_selectors(&selectors).err().unwrap();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains("row")));
    }

    #[test]
    fn test_selectors_file_overrides_subset() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"row": ".item", "price": ".price"}}"#).unwrap();

        let selectors = ListingSelectors::from_file(file.path()).unwrap();
        assert_eq!(selectors.row, ".item");
        assert_eq!(selectors.price, ".price");
        assert_eq!(selectors.container, ".list-view");
    }

    #[test]
    fn test_custom_selectors() {
        let selectors = ListingSelectors {
            container: "table.results".into(),
            row: "tr".into(),
            id: "td.code".into(),
            title: "td.name".into(),
            price: "td.price".into(),
            details: "td.info".into(),
            detail_text: "em".into(),
            pagination: "nav".into(),
            last_page: "a.end".into(),
        };
        let html = r#"<table class="results"><tr><td class="code">#42</td><td class="name">Fiat</td>
            <td class="price">500 EUR</td><td class="info"><em>Benzin, 2001</em></td></tr></table>
            <nav><a class="end">3</a></nav>"#;

        let parser = HtmlListingParser::with_selectors(&selectors).unwrap();
        let rows = parser.rows(html.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id_text, "#42");
        assert_eq!(rows[0].detail_text, "Benzin, 2001");
        assert_eq!(
            parser.last_page(html.as_bytes()).unwrap().as_deref(),
            Some("3")
        );
    }
}
