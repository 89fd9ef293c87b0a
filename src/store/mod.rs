//! Flat key-value progress store
//!
//! This module persists crawl progress in a plain text file of `key=value` lines:
//! - loading tolerates a missing file (first run)
//! - values made only of digits are read back as integers
//! - saving writes keys in sorted order inside a critical section

mod kv;

pub use kv::{KvStore, Value};

use thiserror::Error;

/// Errors that can occur while reading or writing the store file
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Malformed line {line_number} in {path}: {line:?} (expected key=value)")]
    Parse {
        path: String,
        line_number: usize,
        line: String,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
