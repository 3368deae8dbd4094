//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `FrontierSet`: the three disjoint sets a domain's paths move between
//! - `PageOutcome`: what happened to a single path during one fetch cycle
//! - `CrawlReport`: counters and stop reason returned by a crawl loop

mod frontier_set;
mod outcome;

// Re-export main types
pub use frontier_set::{samples_key, FrontierSet};
pub use outcome::{CrawlReport, PageOutcome, StopReason};
