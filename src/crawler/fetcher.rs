//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client from the site configuration
//! - GET requests for listing and book pages (sent with the configured User-Agent)
//! - Streaming PDF downloads (sent without one)
//! - Classifying download failures so a single bad file does not stop the crawl

use crate::config::SiteConfig;
use crate::crawler::parser::{extract_book_metadata, BookMetadata, SiteMarkers};
use crate::url::{encode_link, filename_from_link};
use crate::SweepError;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Download progress is reported once per this many bytes
pub const DOWNLOAD_CHUNK_SIZE: usize = 1024 * 1024;

/// Upper bound for preallocating a download buffer from `Content-Length`
const MAX_PREALLOCATION: usize = 64 * DOWNLOAD_CHUNK_SIZE;

/// Why a file download failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    /// The server answered with a non-success status
    #[error("{status}, {reason}")]
    Status { status: u16, reason: String },

    /// Connection, timeout or body error
    #[error("{0}")]
    Network(String),

    /// The scraped link cannot be turned into a request URL
    #[error("invalid link: {0}")]
    InvalidLink(String),
}

impl DownloadError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Network("Request timeout".to_string())
        } else if e.is_connect() {
            Self::Network("Connection refused".to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// No default User-Agent is set: page requests add the configured one explicitly and
/// file downloads go out without it.
///
/// # Arguments
///
/// * `config` - The site configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use shelf_sweep::config::SiteConfig;
/// use shelf_sweep::crawler::build_http_client;
///
/// let client = build_http_client(&SiteConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &SiteConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().gzip(true).brotli(true);

    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build()
}

/// Fetches a catalog page and returns its body
///
/// Any transport failure or non-success status is an error: without the page the crawl
/// cannot continue.
pub async fn fetch_page(client: &Client, user_agent: &str, url: &str) -> Result<String, SweepError> {
    let request_url = encode_link(url)?;
    let http_error = |source| SweepError::Http {
        url: url.to_string(),
        source,
    };

    let response = client
        .get(request_url)
        .header(USER_AGENT, user_agent)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(http_error)?;

    let body = response.text().await.map_err(http_error)?;
    tracing::trace!("Fetched {} ({} bytes)", url, body.len());

    Ok(body)
}

/// Fetches a book page and extracts its metadata
pub async fn fetch_book_metadata(
    client: &Client,
    user_agent: &str,
    url: &str,
    markers: &SiteMarkers,
) -> Result<BookMetadata, SweepError> {
    let html = fetch_page(client, user_agent, url).await?;

    extract_book_metadata(&html, markers).map_err(|source| SweepError::Extraction {
        url: url.to_string(),
        source,
    })
}

/// Downloads a file into memory
///
/// The request carries no User-Agent header. The body is read chunk by chunk so
/// progress on large files shows up in the trace log.
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - The complete file content
/// * `Err(DownloadError::Status)` - The server answered with a non-success status
/// * `Err(DownloadError::Network)` - The connection failed or the body was cut short
/// * `Err(DownloadError::InvalidLink)` - The link is not a URL or names no file
pub async fn download_file(client: &Client, url: &str) -> Result<Vec<u8>, DownloadError> {
    if filename_from_link(url.trim()).is_empty() {
        return Err(DownloadError::InvalidLink(format!("no file name in {}", url)));
    }
    let request_url = encode_link(url).map_err(|e| DownloadError::InvalidLink(e.to_string()))?;

    let mut response = client
        .get(request_url)
        .send()
        .await
        .map_err(DownloadError::from_reqwest)?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        });
    }

    let capacity = response
        .content_length()
        .map_or(DOWNLOAD_CHUNK_SIZE, |len| (len as usize).min(MAX_PREALLOCATION));
    let mut body = Vec::with_capacity(capacity);
    let mut next_report = DOWNLOAD_CHUNK_SIZE;

    while let Some(chunk) = response.chunk().await.map_err(DownloadError::from_reqwest)? {
        body.extend_from_slice(&chunk);
        if body.len() >= next_report {
            tracing::trace!("{}: {} MiB received", url, body.len() / DOWNLOAD_CHUNK_SIZE);
            next_report = (body.len() / DOWNLOAD_CHUNK_SIZE + 1) * DOWNLOAD_CHUNK_SIZE;
        }
    }

    tracing::debug!("Downloaded {} ({} bytes)", url, body.len());
    Ok(body)
}
