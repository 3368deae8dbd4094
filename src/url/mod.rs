//! URL scoping for Domain-Trawler
//!
//! This module turns URLs and href attributes into (scheme, domain, path)
//! pieces and decides whether a link stays on the crawl's domain. Paths
//! are the frontier's unit of work, so everything here is string-level and
//! deliberately lenient: inputs that are not full URLs are treated as paths.

mod domain;
mod href;
mod parse;

// Re-export main functions
pub use domain::{comparable_domain, same_domain};
pub use href::{resolve_href, LinkCandidate};
pub use parse::{parse_url, UrlParts};

/// Builds the absolute URL for a frontier path
///
/// # Examples
///
/// ```
/// use domain_trawler::url::absolute_url;
///
/// assert_eq!(
///     absolute_url("https://website.com", "/recipes"),
///     "https://website.com/recipes"
/// );
/// ```
pub fn absolute_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url, path)
}
