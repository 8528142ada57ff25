//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the CineIndex database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per crawled directory
CREATE TABLE IF NOT EXISTS dirs (
    url TEXT PRIMARY KEY,
    root TEXT NOT NULL,
    parent TEXT,
    name TEXT NOT NULL,
    modified TEXT
);

CREATE INDEX IF NOT EXISTS idx_dirs_root ON dirs(root);

-- One row per indexed media file
CREATE TABLE IF NOT EXISTS media (
    url TEXT PRIMARY KEY,
    root TEXT NOT NULL,
    path TEXT NOT NULL,
    filename TEXT NOT NULL,
    modified TEXT,
    size TEXT
);

CREATE INDEX IF NOT EXISTS idx_media_root_path ON media(root, path);
CREATE INDEX IF NOT EXISTS idx_media_filename ON media(filename);

-- Track crawl runs per root
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    root TEXT NOT NULL,
    mode TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    dirs_processed INTEGER NOT NULL DEFAULT 0,
    dirs_skipped INTEGER NOT NULL DEFAULT 0,
    files_indexed INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_runs_root ON runs(root);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
