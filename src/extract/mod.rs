//! Marker-based text extraction
//!
//! Pages are not parsed into a DOM. Regions of interest are located by scanning the raw
//! HTML for fixed literal anchors and slicing the text between them. A missing anchor
//! means the page layout no longer matches what the crawler expects, so every lookup
//! reports it as an error instead of returning an empty value.

use thiserror::Error;

/// Errors produced while scanning a document for anchors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Marker not found: {marker:?}")]
    MarkerNotFound { marker: String },

    #[error("Unexpected value {value:?} after marker {marker:?}")]
    InvalidValue { marker: String, value: String },
}

impl ExtractError {
    pub(crate) fn missing(marker: &str) -> Self {
        Self::MarkerNotFound {
            marker: marker.to_string(),
        }
    }
}

/// Result type alias for extraction operations
pub type ExtractResult<T> = Result<T, ExtractError>;

/// A slice of a document located between two anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Between<'a> {
    /// Text strictly between the anchors
    pub text: &'a str,
    /// Byte offset where `text` starts
    pub start: usize,
    /// Byte offset where the end anchor starts (`start + text.len()`)
    pub end: usize,
    /// Byte offset just past the end anchor
    pub next: usize,
}

/// Returns the text between the first `start_anchor` and the following `end_anchor`
///
/// # Example
///
/// ```
/// use shelf_sweep::extract::find_between;
///
/// assert_eq!(find_between("xxSTARTyyENDzz", "START", "END").unwrap(), "yy");
/// assert!(find_between("xxSTARTyy", "START", "END").is_err());
/// ```
pub fn find_between<'a>(doc: &'a str, start_anchor: &str, end_anchor: &str) -> ExtractResult<&'a str> {
    find_between_from(doc, start_anchor, end_anchor, 0).map(|m| m.text)
}

/// Like [`find_between`], but the start anchor is searched at or after `search_from`
///
/// # Returns
///
/// * `Ok(Between)` - The located text with its offsets
/// * `Err(ExtractError::MarkerNotFound)` - Either anchor is absent
pub fn find_between_from<'a>(
    doc: &'a str,
    start_anchor: &str,
    end_anchor: &str,
    search_from: usize,
) -> ExtractResult<Between<'a>> {
    let anchor_at = find_from(doc, start_anchor, search_from)?;
    let start = anchor_at + start_anchor.len();
    let end = find_from(doc, end_anchor, start)?;

    Ok(Between {
        text: &doc[start..end],
        start,
        end,
        next: end + end_anchor.len(),
    })
}

/// Byte offset of the first `anchor` at or after `from`
pub fn find_from(doc: &str, anchor: &str, from: usize) -> ExtractResult<usize> {
    doc.get(from..)
        .and_then(|rest| rest.find(anchor))
        .map(|offset| from + offset)
        .ok_or_else(|| ExtractError::missing(anchor))
}

/// Byte offset of the last `anchor` that starts before `limit`
///
/// The anchor may not overlap `limit`: the whole occurrence must lie in `doc[..limit]`.
pub fn rfind_before(doc: &str, anchor: &str, limit: usize) -> ExtractResult<usize> {
    doc.get(..limit)
        .and_then(|head| head.rfind(anchor))
        .ok_or_else(|| ExtractError::missing(anchor))
}

/// Iterates over repeating sections of a document
///
/// For every occurrence of `section_anchor`, yields the first `start_anchor ... end_anchor`
/// region after it. Each search resumes just past the end anchor of the previous region.
/// A section without a complete region yields an error and ends the iteration.
///
/// # Example
///
/// ```
/// use shelf_sweep::extract::scan_sections;
///
/// let doc = r#"<h2 class="title"><a href="/one">1</a><h2 class="title"><a href="/two">2</a>"#;
/// let links: Vec<&str> = scan_sections(doc, "class=\"title\"", "href=\"", "\"")
///     .map(|m| m.unwrap().text)
///     .collect();
/// assert_eq!(links, vec!["/one", "/two"]);
/// ```
pub fn scan_sections<'a, 'm>(
    doc: &'a str,
    section_anchor: &'m str,
    start_anchor: &'m str,
    end_anchor: &'m str,
) -> ScanSections<'a, 'm> {
    ScanSections {
        doc,
        section_anchor,
        start_anchor,
        end_anchor,
        position: Some(0),
    }
}

/// Iterator returned by [`scan_sections`]
#[derive(Debug, Clone)]
pub struct ScanSections<'a, 'm> {
    doc: &'a str,
    section_anchor: &'m str,
    start_anchor: &'m str,
    end_anchor: &'m str,
    position: Option<usize>,
}

impl<'a, 'm> Iterator for ScanSections<'a, 'm> {
    type Item = ExtractResult<Between<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.position?;
        let Ok(section_at) = find_from(self.doc, self.section_anchor, position) else {
            self.position = None;
            return None;
        };

        let search_from = section_at + self.section_anchor.len();
        match find_between_from(self.doc, self.start_anchor, self.end_anchor, search_from) {
            Ok(found) => {
                self.position = Some(found.next);
                Some(Ok(found))
            }
            Err(e) => {
                self.position = None;
                Some(Err(e))
            }
        }
    }
}
