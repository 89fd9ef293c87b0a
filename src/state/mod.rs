//! State module for tracking crawl progress
//!
//! This module provides the resume state the crawler carries between runs.
//!
//! # Components
//!
//! - `Progress`: typed view over the progress file (resume cursor, page counters)
//! - `skip_processed`: drops already-handled links from a freshly listed page
//! - `Blacklist`: links that are never processed

mod blacklist;
mod cursor;
mod progress;

// Re-export main types
pub use blacklist::Blacklist;
pub use cursor::{processing_order, skip_processed};
pub use progress::{pages_to_crawl, Progress, ProgressRecord};
