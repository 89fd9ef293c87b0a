use crate::config::types::{Config, LoggingConfig, PathsConfig, SiteConfig};
use crate::url::PAGE_PLACEHOLDER;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_paths_config(&config.paths)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_http_url("homepage", &config.homepage)?;

    if !config.page_url_template.contains(PAGE_PLACEHOLDER) {
        return Err(ConfigError::Validation(format!(
            "page-url-template must contain {}, got '{}'",
            PAGE_PLACEHOLDER, config.page_url_template
        )));
    }
    let sample = config.page_url_template.replace(PAGE_PLACEHOLDER, "1");
    validate_http_url("page-url-template", &sample)?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates file locations
fn validate_paths_config(config: &PathsConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("progress-file", &config.progress_file),
        ("blacklist-file", &config.blacklist_file),
        ("download-root", &config.download_root),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

fn validate_logging_config(config: &LoggingConfig) -> Result<(), ConfigError> {
    if config.log_file.is_empty() {
        return Err(ConfigError::Validation(
            "log-file cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Parses `value` and requires an HTTP(S) URL
fn validate_http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use HTTP or HTTPS",
            name, value
        )));
    }

    Ok(())
}
