use crate::logging::LogLevel;
use serde::Deserialize;

/// Main configuration structure for shelf-sweep
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
}

/// Catalog site and HTTP behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Homepage carrying the total page count
    pub homepage: String,

    /// Listing page URL with a `{page}` placeholder
    #[serde(rename = "page-url-template")]
    pub page_url_template: String,

    /// User-Agent sent with page requests (not with file downloads)
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds; requests wait indefinitely when unset
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            homepage: "http://www.allitebooks.com".to_string(),
            page_url_template: "http://www.allitebooks.com/page/{page}/".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            request_timeout_secs: None,
        }
    }
}

/// File locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Progress file (key=value lines)
    #[serde(rename = "progress-file")]
    pub progress_file: String,

    /// Blacklist file (one link per line)
    #[serde(rename = "blacklist-file")]
    pub blacklist_file: String,

    /// Root directory for downloaded artifacts
    #[serde(rename = "download-root")]
    pub download_root: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            progress_file: "Allitebook.ini".to_string(),
            blacklist_file: "blacklist.txt".to_string(),
            download_root: "allitebook".to_string(),
        }
    }
}

/// Durable log file settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    #[serde(rename = "log-file")]
    pub log_file: String,

    /// Minimum level written to the log file
    pub level: LogLevel,

    /// Prefix each line with a local timestamp
    #[serde(rename = "include-time")]
    pub include_time: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: "web.log".to_string(),
            level: LogLevel::Warning,
            include_time: true,
        }
    }
}

/// Progress persistence settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Save the progress file after this many downloads (0 = only on exit)
    #[serde(rename = "save-every-books")]
    pub save_every_books: u64,
}
