//! Configuration module for shelf-sweep
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; missing sections and keys fall back to the settings
//! of the catalog site the crawler was written for.
//!
//! # Example
//!
//! ```no_run
//! use shelf_sweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("shelf-sweep.toml")).unwrap();
//! println!("Homepage: {}", config.site.homepage);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, LoggingConfig, PathsConfig, ProgressConfig, SiteConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
