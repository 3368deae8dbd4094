//! Statistics for a domain's crawl
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the frontier store and the error log.

use crate::output::ErrorLog;
use crate::storage::{frontier_counts, FrontierCounts, FrontierStore};
use crate::Result;
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Domain the statistics describe
    pub domain: String,

    /// Size of each frontier set
    pub counts: FrontierCounts,

    /// In-progress depth, sampled every ten pages
    pub depth_samples: Vec<u64>,

    /// Logged errors by kind
    pub error_summary: HashMap<String, u64>,
}

/// Loads statistics from the store and the error log
///
/// # Arguments
///
/// * `store` - The frontier store holding the domain's sets
/// * `domain` - The crawl's domain key
/// * `errors` - The error log of the crawl's download directory
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(CrawlError)` - Failed to query the store or read the log
pub async fn load_statistics(
    store: &dyn FrontierStore,
    domain: &str,
    errors: &ErrorLog,
) -> Result<CrawlStatistics> {
    let counts = frontier_counts(store, domain).await?;
    let depth_samples = store.samples(domain).await?;

    let mut error_summary = HashMap::new();
    for record in errors.read_all()? {
        *error_summary.entry(record.error_kind).or_insert(0) += 1;
    }

    Ok(CrawlStatistics {
        domain: domain.to_string(),
        counts,
        depth_samples,
        error_summary,
    })
}

impl CrawlStatistics {
    /// Share of seen paths that finished, as a percentage
    pub fn success_rate(&self) -> f64 {
        let done = self.counts.finished + self.counts.errored;
        if done > 0 {
            (self.counts.finished as f64 / done as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Largest sampled frontier depth
    pub fn peak_depth(&self) -> Option<u64> {
        self.depth_samples.iter().copied().max()
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics: {} ===\n", stats.domain);

    println!("Frontier:");
    println!("  In progress: {}", stats.counts.in_progress);
    println!("  Finished: {}", stats.counts.finished);
    println!("  Errored: {}", stats.counts.errored);
    println!("  Total paths seen: {}", stats.counts.total());
    println!();

    if !stats.depth_samples.is_empty() {
        println!("Depth Samples ({}):", stats.depth_samples.len());
        if let Some(peak) = stats.peak_depth() {
            println!("  Peak: {}", peak);
        }
        if let Some(last) = stats.depth_samples.last() {
            println!("  Latest: {}", last);
        }
        println!();
    }

    if !stats.error_summary.is_empty() {
        println!("Error Summary:");
        let mut error_counts: Vec<_> = stats.error_summary.iter().collect();
        error_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (kind, count) in error_counts {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} finished, {} errored)",
        stats.success_rate(),
        stats.counts.finished,
        stats.counts.errored
    );
}
