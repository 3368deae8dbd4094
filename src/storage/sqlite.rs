//! SQLite frontier store
//!
//! A durable local backend: a crawl killed halfway can be resumed by the
//! next process that opens the same database file. Every trait operation is
//! a single statement (or a single transaction for `take_arbitrary`) run
//! under the connection mutex.

use crate::state::FrontierSet;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{FrontierStore, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite frontier backend
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a frontier database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StoreError)` - Failed to open database
    pub fn new(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

#[async_trait]
impl FrontierStore for SqliteStore {
    async fn count(&self, domain: &str, set: FrontierSet) -> StoreResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM frontier WHERE domain = ?1 AND set_name = ?2",
            params![domain, set.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    async fn add(&self, domain: &str, set: FrontierSet, path: &str) -> StoreResult<bool> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO frontier (domain, set_name, path, added_at) VALUES (?1, ?2, ?3, ?4)",
            params![domain, set.to_db_string(), path, Utc::now().to_rfc3339()],
        )?;
        Ok(inserted > 0)
    }

    async fn remove(&self, domain: &str, set: FrontierSet, path: &str) -> StoreResult<bool> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM frontier WHERE domain = ?1 AND set_name = ?2 AND path = ?3",
            params![domain, set.to_db_string(), path],
        )?;
        Ok(removed > 0)
    }

    async fn contains(&self, domain: &str, set: FrontierSet, path: &str) -> StoreResult<bool> {
        let conn = self.lock()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM frontier WHERE domain = ?1 AND set_name = ?2 AND path = ?3",
                params![domain, set.to_db_string(), path],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    async fn pick_arbitrary(&self, domain: &str, set: FrontierSet) -> StoreResult<Option<String>> {
        let conn = self.lock()?;
        let path = conn
            .query_row(
                "SELECT path FROM frontier WHERE domain = ?1 AND set_name = ?2 LIMIT 1",
                params![domain, set.to_db_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(path)
    }

    async fn take_arbitrary(&self, domain: &str, set: FrontierSet) -> StoreResult<Option<String>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let path: Option<String> = tx
            .query_row(
                "SELECT path FROM frontier WHERE domain = ?1 AND set_name = ?2 LIMIT 1",
                params![domain, set.to_db_string()],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(path) = &path {
            tx.execute(
                "DELETE FROM frontier WHERE domain = ?1 AND set_name = ?2 AND path = ?3",
                params![domain, set.to_db_string(), path],
            )?;
        }
        tx.commit()?;
        Ok(path)
    }

    async fn members(&self, domain: &str, set: FrontierSet) -> StoreResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT path FROM frontier WHERE domain = ?1 AND set_name = ?2")?;
        let paths = stmt
            .query_map(params![domain, set.to_db_string()], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(paths)
    }

    async fn append_sample(&self, domain: &str, in_progress: u64) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO depth_samples (domain, in_progress, sampled_at) VALUES (?1, ?2, ?3)",
            params![domain, in_progress as i64, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    async fn samples(&self, domain: &str) -> StoreResult<Vec<u64>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT in_progress FROM depth_samples WHERE domain = ?1 ORDER BY id")?;
        let samples = stmt
            .query_map(params![domain], |row| row.get::<_, i64>(0))?
            .map(|value| value.map(|v| v as u64))
            .collect::<Result<Vec<u64>, _>>()?;
        Ok(samples)
    }

    async fn clear(&self, domain: &str) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM frontier WHERE domain = ?1", params![domain])?;
        conn.execute("DELETE FROM depth_samples WHERE domain = ?1", params![domain])?;
        Ok(())
    }
}
