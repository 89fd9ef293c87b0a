//! Output module for crawl results
//!
//! This module handles:
//! - Laying out downloaded books on disk (PDF plus summary text)
//! - Recording and printing run statistics

mod artifacts;
pub mod stats;

pub use artifacts::{artifact_paths, assure_directory, write_artifacts, ArtifactPaths, GENERAL_DIRECTORY};
pub use stats::{print_statistics, CrawlStatistics};
