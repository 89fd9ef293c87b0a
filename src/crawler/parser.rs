//! Catalog page parsing
//!
//! This module extracts what the crawler needs from the catalog's pages:
//! - The total number of listing pages (from the homepage pagination)
//! - Book page links (from a listing page)
//! - Category, PDF link and summary (from a book page)
//!
//! Everything is located with literal markers (see [`crate::extract`]). The only DOM
//! parsing happens on the summary fragment, to strip its markup.

use crate::extract::{
    find_between, find_between_from, find_from, rfind_before, scan_sections, ExtractError,
    ExtractResult,
};
use scraper::Html;

const QUOTE: &str = "\"";

/// Literal markers describing the catalog's page layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteMarkers {
    /// Pagination link to the last listing page; the count follows in `>N<`
    pub last_page: String,
    /// Opens a book entry on a listing page
    pub entry_section: String,
    /// Precedes the book page link inside an entry
    pub link_open: String,
    /// Separates the site host from the category path
    pub site_root: String,
    /// Marks the category link on a book page
    pub category_rel: String,
    /// Prefix of every downloadable file link
    pub file_host: String,
    /// Heading that precedes the book summary
    pub summary_heading: String,
    /// First markup after the book summary
    pub summary_end: String,
}

impl Default for SiteMarkers {
    fn default() -> Self {
        Self {
            last_page: r#"title="Last Page"#.to_string(),
            entry_section: r#""entry-title""#.to_string(),
            link_open: r#"<a href=""#.to_string(),
            site_root: ".com/".to_string(),
            category_rel: r#"rel="category""#.to_string(),
            file_host: "http://file.allitebooks.com".to_string(),
            summary_heading: "<h3>Book Description:</h3>".to_string(),
            summary_end: "<div class=".to_string(),
        }
    }
}

/// Metadata extracted from a book page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMetadata {
    /// Category path relative to the site root, e.g. `programming/web/`
    pub category: String,
    /// Absolute link to the PDF
    pub pdf_download_url: String,
    /// Plain-text book description
    pub summary: String,
}

/// Reads the total number of listing pages from the homepage
///
/// # Returns
///
/// * `Ok(u64)` - The page count
/// * `Err(ExtractError::MarkerNotFound)` - No last-page link on the page
/// * `Err(ExtractError::InvalidValue)` - The link text is not a number
pub fn extract_total_pages(html: &str, markers: &SiteMarkers) -> ExtractResult<u64> {
    let anchor = find_from(html, &markers.last_page, 0)?;
    let count = find_between_from(html, ">", "<", anchor + markers.last_page.len())?;
    let text = count.text.trim();

    text.parse().map_err(|_| ExtractError::InvalidValue {
        marker: markers.last_page.clone(),
        value: text.to_string(),
    })
}

/// Lists the book page links of a listing page, in page order
///
/// A listing page without any book entry means the layout changed.
pub fn extract_book_links(html: &str, markers: &SiteMarkers) -> ExtractResult<Vec<String>> {
    let links = scan_sections(html, &markers.entry_section, &markers.link_open, QUOTE)
        .map(|found| found.map(|m| m.text.to_string()))
        .collect::<ExtractResult<Vec<_>>>()?;

    if links.is_empty() {
        return Err(ExtractError::missing(&markers.entry_section));
    }

    Ok(links)
}

/// Extracts category, PDF link and summary from a book page
///
/// # Example
///
/// ```
/// use shelf_sweep::crawler::{extract_book_metadata, SiteMarkers};
///
/// let html = r#"<a href="http://www.allitebooks.com/web-development/" rel="category">Web</a>
/// <a href="http://file.allitebooks.com/20170101/Book.pdf">PDF</a>
/// <h3>Book Description:</h3><p>All about <b>books</b>.</p><div class="x">"#;
///
/// let metadata = extract_book_metadata(html, &SiteMarkers::default()).unwrap();
/// assert_eq!(metadata.category, "web-development/");
/// assert_eq!(metadata.pdf_download_url, "http://file.allitebooks.com/20170101/Book.pdf");
/// assert_eq!(metadata.summary, "All about books.");
/// ```
pub fn extract_book_metadata(html: &str, markers: &SiteMarkers) -> ExtractResult<BookMetadata> {
    Ok(BookMetadata {
        category: extract_category(html, markers)?.to_string(),
        pdf_download_url: extract_pdf_link(html, markers)?.to_string(),
        summary: extract_summary(html, markers)?,
    })
}

/// Category path of the link that carries the category marker
///
/// The link's href is found by searching backwards from the marker for the site root,
/// then forwards for the closing quote.
fn extract_category<'a>(html: &'a str, markers: &SiteMarkers) -> ExtractResult<&'a str> {
    let rel_at = find_from(html, &markers.category_rel, 0)?;
    let root_at = rfind_before(html, &markers.site_root, rel_at)?;
    let start = root_at + markers.site_root.len();
    let end = find_from(html, QUOTE, start)?;

    Ok(&html[start..end])
}

fn extract_pdf_link<'a>(html: &'a str, markers: &SiteMarkers) -> ExtractResult<&'a str> {
    let start = find_from(html, &markers.file_host, 0)?;
    let end = find_from(html, QUOTE, start)?;

    Ok(&html[start..end])
}

fn extract_summary(html: &str, markers: &SiteMarkers) -> ExtractResult<String> {
    let fragment = find_between(html, &markers.summary_heading, &markers.summary_end)?;
    Ok(strip_tags(fragment).trim().replace("\n\n", "\n"))
}

/// Concatenates the text nodes of an HTML fragment
fn strip_tags(fragment: &str) -> String {
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .collect()
}
