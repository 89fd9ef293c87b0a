//! URL handling module for shelf-sweep
//!
//! This module builds listing-page URLs from the configured template, prepares
//! scraped links for requests, and derives download filenames from links.

mod link;

pub use link::{encode_link, filename_from_link, page_url, PAGE_PLACEHOLDER};
