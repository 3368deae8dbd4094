//! Frontier store trait and error types
//!
//! This module defines the contract every frontier backend implements.
//! Each operation is atomic on its own; nothing spans several keys, so
//! callers must not rely on two calls observing a consistent snapshot.

use crate::state::FrontierSet;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during frontier store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Store lock poisoned: {0}")]
    Poisoned(String),
}

/// Result type for frontier store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for shared frontier backends
///
/// The store owns every domain's frontier; a crawl only holds the domain
/// string used to address it. Implementations must be safe to share
/// between tasks and, for networked backends, between processes.
#[async_trait]
pub trait FrontierStore: Send + Sync {
    // ===== Set Operations =====

    /// Counts the paths in one of a domain's sets
    async fn count(&self, domain: &str, set: FrontierSet) -> StoreResult<u64>;

    /// Adds a path to a set
    ///
    /// Re-adding an existing member is a no-op.
    ///
    /// # Returns
    ///
    /// `true` if the path was not already a member
    async fn add(&self, domain: &str, set: FrontierSet, path: &str) -> StoreResult<bool>;

    /// Removes a path from a set
    ///
    /// # Returns
    ///
    /// `true` if the path was present
    async fn remove(&self, domain: &str, set: FrontierSet, path: &str) -> StoreResult<bool>;

    /// Checks whether a path is a member of a set
    async fn contains(&self, domain: &str, set: FrontierSet, path: &str) -> StoreResult<bool>;

    /// Returns any member of a set without removing it
    ///
    /// No ordering is guaranteed. Two processes calling this concurrently
    /// may receive the same path.
    async fn pick_arbitrary(&self, domain: &str, set: FrontierSet) -> StoreResult<Option<String>>;

    /// Removes and returns any member of a set in a single atomic step
    ///
    /// This is what the crawl loops use to claim work, so that cooperating
    /// processes never start on the same path.
    async fn take_arbitrary(&self, domain: &str, set: FrontierSet) -> StoreResult<Option<String>>;

    /// Lists every member of a set (order unspecified)
    async fn members(&self, domain: &str, set: FrontierSet) -> StoreResult<Vec<String>>;

    // ===== Depth Samples =====

    /// Appends an in-progress count to the domain's sample log
    async fn append_sample(&self, domain: &str, in_progress: u64) -> StoreResult<()>;

    /// Reads the whole sample log, oldest first
    async fn samples(&self, domain: &str) -> StoreResult<Vec<u64>>;

    // ===== Maintenance =====

    /// Drops every set and the sample log of a domain
    async fn clear(&self, domain: &str) -> StoreResult<()>;
}
