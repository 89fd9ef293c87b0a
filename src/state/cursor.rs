/// Reorders a listing from site order (newest first) to processing order (oldest first)
pub fn processing_order(mut links: Vec<String>) -> Vec<String> {
    links.reverse();
    links
}

/// Drops every link up to and including the resume cursor
///
/// `links` must already be in processing order. When the cursor is absent from the
/// listing (it belongs to another page, or the page contents shifted) the listing is
/// returned unchanged.
pub fn skip_processed(links: Vec<String>, cursor: Option<&str>) -> Vec<String> {
    let Some(cursor) = cursor else {
        return links;
    };

    match links.iter().position(|link| link == cursor) {
        Some(index) => links.into_iter().skip(index + 1).collect(),
        None => links,
    }
}
