//! Shelf-Sweep: a resumable book-catalog crawler
//!
//! This crate walks a paginated book catalog from its oldest listing page to its newest,
//! downloads every book's PDF together with a summary, and keeps a small progress file so
//! an interrupted run resumes exactly where it stopped.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod interrupt;
pub mod logging;
pub mod output;
pub mod state;
pub mod store;
pub mod url;

use thiserror::Error;

/// Main error type for shelf-sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Progress store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Page structure changed at {url}: {source}")]
    Extraction {
        url: String,
        source: extract::ExtractError,
    },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Download failed for {url}: {source}")]
    DownloadFailed {
        url: String,
        source: crawler::DownloadError,
    },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SweepError {
    /// Returns true for failures that only affect a single book
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DownloadFailed { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for shelf-sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator, CrawlOutcome};
pub use interrupt::{Interrupt, Signal};
pub use state::{Progress, ProgressRecord};
