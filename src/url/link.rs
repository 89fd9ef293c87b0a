use crate::UrlError;
use url::Url;

/// Placeholder replaced by the page number in a page URL template
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Builds the URL of a listing page from a template
///
/// # Examples
///
/// ```
/// use shelf_sweep::url::page_url;
///
/// let url = page_url("http://www.allitebooks.com/page/{page}/", 7).unwrap();
/// assert_eq!(url.as_str(), "http://www.allitebooks.com/page/7/");
/// ```
pub fn page_url(template: &str, page_number: u64) -> Result<Url, UrlError> {
    if !template.contains(PAGE_PLACEHOLDER) {
        return Err(UrlError::Malformed(format!(
            "page URL template has no {} placeholder: {}",
            PAGE_PLACEHOLDER, template
        )));
    }

    encode_link(&template.replace(PAGE_PLACEHOLDER, &page_number.to_string()))
}

/// Turns a link scraped from HTML into a request URL
///
/// Spaces are percent-encoded; only HTTP and HTTPS links are accepted.
///
/// # Examples
///
/// ```
/// use shelf_sweep::url::encode_link;
///
/// let url = encode_link("http://file.example.com/Some Book.pdf").unwrap();
/// assert_eq!(url.as_str(), "http://file.example.com/Some%20Book.pdf");
/// ```
pub fn encode_link(link: &str) -> Result<Url, UrlError> {
    let encoded = link.trim().replace(' ', "%20");
    let url = Url::parse(&encoded).map_err(|e| UrlError::Parse(format!("{}: {}", e, link)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(UrlError::InvalidScheme(other.to_string())),
    }
}

/// Returns the last path segment of a link, as it appears in the link
///
/// # Examples
///
/// ```
/// use shelf_sweep::url::filename_from_link;
///
/// assert_eq!(filename_from_link("http://file.example.com/a/b/Book.pdf"), "Book.pdf");
/// ```
pub fn filename_from_link(link: &str) -> &str {
    match link.rfind('/') {
        Some(index) => &link[index + 1..],
        None => link,
    }
}
