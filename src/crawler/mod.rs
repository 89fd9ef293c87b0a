//! Crawler module for catalog traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching of catalog pages and PDF downloads
//! - Marker-based parsing of homepage, listing and book pages
//! - Overall crawl coordination and resumption

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{Coordinator, CrawlOutcome};
pub use fetcher::{
    build_http_client, download_file, fetch_book_metadata, fetch_page, DownloadError,
    DOWNLOAD_CHUNK_SIZE,
};
pub use parser::{
    extract_book_links, extract_book_metadata, extract_total_pages, BookMetadata, SiteMarkers,
};

use crate::config::Config;
use crate::interrupt::Interrupt;
use crate::SweepError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Load the progress file, blacklist and log file
/// 2. Read the page count from the homepage
/// 3. Start trapping SIGINT and SIGTERM
/// 4. Crawl the listing pages from the oldest to the newest
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `fresh` - Ignore the stored progress record
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Crawl completed or was stopped by a signal
/// * `Err(SweepError)` - Crawl failed
pub async fn run_crawl(config: Config, fresh: bool) -> Result<CrawlOutcome, SweepError> {
    let interrupt = Interrupt::new();
    let mut coordinator = Coordinator::new(config, fresh, interrupt.clone())?;

    let pages = coordinator.prepare().await?;

    let listener = interrupt.listen();
    let outcome = coordinator.crawl(pages).await;
    listener.abort();

    outcome
}
