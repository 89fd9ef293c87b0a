//! Run statistics
//!
//! Counters collected by the coordinator while it crawls, printed once the run ends.

use chrono::{DateTime, Local};

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// When the run started
    pub started_at: DateTime<Local>,

    /// Listing pages whose links were exhausted
    pub pages_crawled: u64,

    /// Book links found on crawled pages (after the resume cursor)
    pub books_seen: u64,

    /// Books whose PDF and summary were written
    pub books_downloaded: u64,

    /// Links dropped because they precede the resume cursor
    pub books_skipped_processed: u64,

    /// Links dropped because they are blacklisted
    pub books_skipped_blacklisted: u64,

    /// Downloads that failed and were skipped
    pub downloads_failed: u64,

    /// Total size of written PDFs
    pub bytes_downloaded: u64,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            pages_crawled: 0,
            books_seen: 0,
            books_downloaded: 0,
            books_skipped_processed: 0,
            books_skipped_blacklisted: 0,
            downloads_failed: 0,
            bytes_downloaded: 0,
        }
    }

    /// Share of attempted downloads that succeeded, in percent
    pub fn success_rate(&self) -> f64 {
        let attempted = self.books_downloaded + self.downloads_failed;
        if attempted > 0 {
            (self.books_downloaded as f64 / attempted as f64) * 100.0
        } else {
            0.0
        }
    }
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    let elapsed = Local::now() - stats.started_at;

    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!(
        "  Started: {}",
        stats.started_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("  Duration: {}s", elapsed.num_seconds());
    println!("  Pages crawled: {}", stats.pages_crawled);
    println!("  Books seen: {}", stats.books_seen);
    println!();

    println!("Books:");
    println!("  Downloaded: {}", stats.books_downloaded);
    println!(
        "  Downloaded size: {:.1} MiB",
        stats.bytes_downloaded as f64 / (1024.0 * 1024.0)
    );
    println!("  Skipped (already processed): {}", stats.books_skipped_processed);
    println!("  Skipped (blacklisted): {}", stats.books_skipped_blacklisted);
    println!("  Failed downloads: {}", stats.downloads_failed);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} downloads)",
        stats.success_rate(),
        stats.books_downloaded,
        stats.books_downloaded + stats.downloads_failed
    );
}
