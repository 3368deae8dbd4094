//! Crawler module for fetching and processing pages
//!
//! This module contains the core crawling logic, including:
//! - HTTP transport with bounded retries and same-host redirects
//! - HTML parsing and link discovery
//! - Redirect consolidation against the frontier
//! - Page persistence strategies
//! - The domain, search, and drain crawl loops

mod document;
mod engine;
mod handler;
mod job;
mod links;
mod redirect;
mod search;
mod transport;

pub use document::{parse_selector, Document, LinkElement};
pub use engine::Crawler;
pub use handler::{PageContext, PageHandler, RawPage, TrimmedPage};
pub use job::CrawlJob;
pub use links::{
    discover_links, is_avoided, is_hidden_element, is_messy_path, link_candidates, MAX_PATH_LEN,
};
pub use redirect::consolidate_redirect;
pub use search::{search_path, Sentinel, PAGE_PLACEHOLDER};
pub use transport::{build_http_client, FetchResponse, HttpTransport, Transport, TransportError};
