//! Paginated search helpers

use crate::config::SearchConfig;
use crate::crawler::document::{parse_selector, Document};
use crate::{ConfigError, CrawlError, Result};
use regex::Regex;
use scraper::Selector;

/// Placeholder replaced by the page number in a path template
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Builds the path of one search results page
///
/// # Examples
///
/// ```
/// use domain_trawler::crawler::search_path;
///
/// assert_eq!(search_path("/search?page={page}", 7), "/search?page=7");
/// ```
pub fn search_path(template: &str, page: u32) -> String {
    template.replace(PAGE_PLACEHOLDER, &page.to_string())
}

/// Marker for the page past the last page of results
pub struct Sentinel {
    selector: Selector,
    pattern: Regex,
}

impl Sentinel {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let pattern = Regex::new(&config.sentinel_pattern).map_err(|e| {
            CrawlError::Config(ConfigError::Validation(format!(
                "invalid sentinel pattern: {}",
                e
            )))
        })?;

        Ok(Self {
            selector: parse_selector(&config.sentinel_selector)?,
            pattern,
        })
    }

    /// True if any element matching the selector has matching text
    pub fn is_present(&self, body: &[u8]) -> bool {
        Document::parse(body)
            .texts(&self.selector)
            .iter()
            .any(|text| self.pattern.is_match(text))
    }
}
