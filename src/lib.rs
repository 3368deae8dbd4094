//! Domain-Trawler: a frontier-driven single-domain crawler
//!
//! This crate crawls one web domain at a time, keeping its work queue in a
//! shared set store so that a crawl can be resumed by a fresh process (or
//! drained by several cooperating ones). Pages and images are written to a
//! download directory; failures are appended to a JSON lines log.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Domain-Trawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error for {url}: {source}")]
    Transport {
        url: String,
        source: crawler::TransportError,
    },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Malformed link: {0}")]
    MalformedLink(String),

    #[error("Missing redirect target after requesting {path} (final URL {final_url})")]
    MissingRedirectTarget { path: String, final_url: String },

    #[error("Frontier store error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document error: {0}")]
    Document(String),
}

impl CrawlError {
    /// Short, stable name of the error variant, written to the error log
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "ConfigurationError",
            Self::Transport { source, .. } => source.kind(),
            Self::HttpStatus { .. } => "HttpStatus",
            Self::MalformedLink(_) => "MalformedLink",
            Self::MissingRedirectTarget { .. } => "MissingRedirectTarget",
            Self::Store(_) => "StoreError",
            Self::Io(_) => "IoError",
            Self::Document(_) => "DocumentError",
        }
    }

    /// Returns true if the error must abort the crawl instead of being
    /// recorded against a single path
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::MissingRedirectTarget { .. } | Self::Store(_)
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Download directory does not exist: {0}")]
    MissingDirectory(String),
}

/// Result type alias for Domain-Trawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlJob, Crawler};
pub use state::{FrontierSet, PageOutcome};
pub use storage::FrontierStore;
