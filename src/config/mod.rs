//! Configuration module for Domain-Trawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use domain_trawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Crawler will stop after {} pages", config.job.limit);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FetchConfig, JobConfig, PageConfig, SearchConfig, StoreBackend, StoreConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
