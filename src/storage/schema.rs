//! Database schema definitions
//!
//! This module contains the SQL schema used by the SQLite frontier store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Frontier membership: one row per (domain, set, path)
CREATE TABLE IF NOT EXISTS frontier (
    domain TEXT NOT NULL,
    set_name TEXT NOT NULL,
    path TEXT NOT NULL,
    added_at TEXT NOT NULL,
    PRIMARY KEY (domain, set_name, path)
);

CREATE INDEX IF NOT EXISTS idx_frontier_domain_set ON frontier(domain, set_name);

-- Append-only log of in-progress counts
CREATE TABLE IF NOT EXISTS depth_samples (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    domain TEXT NOT NULL,
    in_progress INTEGER NOT NULL,
    sampled_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_depth_samples_domain ON depth_samples(domain);
"#;

/// Creates the frontier tables if they are missing
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
