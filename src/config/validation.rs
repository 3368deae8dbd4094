use crate::config::types::{Config, FetchConfig, JobConfig, PageConfig, SearchConfig, StoreConfig};
use crate::url::parse_url;
use crate::ConfigError;
use regex::Regex;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_job_config(&config.job)?;
    validate_fetch_config(&config.fetch)?;
    validate_store_config(&config.store)?;
    if let Some(search) = &config.search {
        validate_search_config(search)?;
    }
    if let Some(page) = &config.page {
        validate_page_config(page)?;
    }
    Ok(())
}

/// Validates the job section
///
/// The download directory's existence is checked when the job is built,
/// not here, so a config can be validated on another machine.
fn validate_job_config(config: &JobConfig) -> Result<(), ConfigError> {
    if parse_url(&config.start_url).domain.is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "start-url '{}' has no domain",
            config.start_url
        )));
    }

    if config.download_path.is_empty() {
        return Err(ConfigError::Validation(
            "download-path cannot be empty".to_string(),
        ));
    }

    if config.limit < 1 {
        return Err(ConfigError::Validation(format!(
            "limit must be >= 1, got {}",
            config.limit
        )));
    }

    validate_substrings("allow", &config.allow)?;
    validate_substrings("avoid", &config.avoid)?;

    Ok(())
}

/// Empty substrings would match (or exclude) every link
fn validate_substrings(name: &str, substrings: &[String]) -> Result<(), ConfigError> {
    if substrings.iter().any(|s| s.is_empty()) {
        return Err(ConfigError::Validation(format!(
            "{} entries cannot be empty",
            name
        )));
    }
    Ok(())
}

/// Validates transport settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.connect_timeout_secs < 1 || config.read_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeouts must be at least 1 second".to_string(),
        ));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the store section
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.redis_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid redis-url: {}", e)))?;
    if url.scheme() != "redis" && url.scheme() != "rediss" {
        return Err(ConfigError::InvalidUrl(format!(
            "redis-url '{}' must use the redis:// or rediss:// scheme",
            config.redis_url
        )));
    }

    if config.sqlite_path.is_empty() {
        return Err(ConfigError::Validation(
            "sqlite-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates paginated search settings
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if !config.path_template.contains("{page}") {
        return Err(ConfigError::Validation(format!(
            "path-template '{}' must contain a {{page}} placeholder",
            config.path_template
        )));
    }

    if config.start_page < 1 || config.max_page < config.start_page {
        return Err(ConfigError::Validation(format!(
            "search pages must satisfy 1 <= start-page <= max-page, got {}..{}",
            config.start_page, config.max_page
        )));
    }

    validate_selector("sentinel-selector", &config.sentinel_selector)?;

    Regex::new(&config.sentinel_pattern).map_err(|e| {
        ConfigError::Validation(format!("Invalid sentinel-pattern: {}", e))
    })?;

    Ok(())
}

/// Validates trimmed page settings
fn validate_page_config(config: &PageConfig) -> Result<(), ConfigError> {
    validate_selector("content-selector", &config.content_selector)?;
    if let Some(selector) = &config.image_selector {
        validate_selector("image-selector", selector)?;
    }
    if config.image_attr.is_empty() {
        return Err(ConfigError::Validation(
            "image-attr cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_selector(name: &str, selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::Validation(format!("Invalid {} '{}': {}", name, selector, e)))
}
