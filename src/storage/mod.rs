//! Storage module for the crawl frontier
//!
//! This module provides the shared set store that owns every domain's
//! frontier, including:
//! - The `FrontierStore` trait with atomic single-key operations
//! - A Redis backend for crawls shared between processes
//! - A SQLite backend for durable single-machine crawls
//! - An in-memory backend for tests and throwaway runs

mod memory;
mod redis_store;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use sqlite::SqliteStore;
pub use traits::{FrontierStore, StoreError, StoreResult};

use crate::config::{StoreBackend, StoreConfig};
use crate::state::FrontierSet;
use std::path::Path;
use std::sync::Arc;

/// Opens the frontier store described by the configuration
///
/// # Arguments
///
/// * `config` - The `[store]` section of the configuration
///
/// # Returns
///
/// * `Ok(Arc<dyn FrontierStore>)` - A store handle to pass to crawlers
/// * `Err(StoreError)` - Failed to connect or open the database
pub async fn open_store(config: &StoreConfig) -> StoreResult<Arc<dyn FrontierStore>> {
    match config.backend {
        StoreBackend::Redis => {
            let store = RedisStore::connect(&config.redis_url).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Sqlite => {
            let store = SqliteStore::new(Path::new(&config.sqlite_path))?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Snapshot of a domain's frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierCounts {
    pub in_progress: u64,
    pub finished: u64,
    pub errored: u64,
}

impl FrontierCounts {
    /// Total number of paths the domain's crawl has seen
    pub fn total(&self) -> u64 {
        self.in_progress + self.finished + self.errored
    }
}

/// Reads the size of all three sets of a domain
///
/// The three counts are separate store calls and may not be mutually
/// consistent while another process is crawling the domain.
pub async fn frontier_counts(
    store: &dyn FrontierStore,
    domain: &str,
) -> StoreResult<FrontierCounts> {
    Ok(FrontierCounts {
        in_progress: store.count(domain, FrontierSet::InProgress).await?,
        finished: store.count(domain, FrontierSet::Finished).await?,
        errored: store.count(domain, FrontierSet::Errored).await?,
    })
}

/// True if `path` has already been attempted, successfully or not
///
/// Such a path must not be queued again.
pub async fn is_settled(store: &dyn FrontierStore, domain: &str, path: &str) -> StoreResult<bool> {
    Ok(store.contains(domain, FrontierSet::Finished, path).await?
        || store.contains(domain, FrontierSet::Errored, path).await?)
}
