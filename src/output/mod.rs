//! Output module for everything a crawl writes besides the frontier
//!
//! This module handles:
//! - Writing pages and images to the download directory
//! - Appending failures to the JSON lines error log
//! - Summarizing a domain's crawl for `--stats`

mod errors;
mod pages;
pub mod stats;

pub use errors::{ErrorLog, ErrorRecord, ERROR_LOG_FILE};
pub use pages::{flatten_path, image_extension, PageWriter};
pub use stats::{load_statistics, print_statistics, CrawlStatistics};
