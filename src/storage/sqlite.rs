//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the [`IndexStore`] trait.
//! Crawler writes are grouped into an explicit transaction that is opened lazily
//! by the first write and closed by [`IndexStore::commit`].

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{IndexStore, StorageError, StorageResult};
use crate::storage::{DirectoryRecord, MediaFileRecord, RootSummary, RunRecord, RunStatus};
use crate::IndexError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(IndexError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, IndexError> {
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

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, IndexError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Opens the write transaction if none is active
    fn begin_if_needed(&self) -> StorageResult<()> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }
        Ok(())
    }

    /// Discards every write since the last commit
    pub fn rollback(&mut self) -> StorageResult<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    // ===== Run Management =====

    /// Records the start of a crawl run and returns its ID
    pub fn create_run(&mut self, root: &str, mode: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (root, mode, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![root, mode, now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Marks a run as completed with its final counters
    pub fn complete_run(
        &mut self,
        run_id: i64,
        dirs_processed: u64,
        dirs_skipped: u64,
        files_indexed: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, dirs_processed = ?3,
             dirs_skipped = ?4, files_indexed = ?5 WHERE id = ?6",
            params![
                RunStatus::Completed.to_db_string(),
                now,
                dirs_processed as i64,
                dirs_skipped as i64,
                files_indexed as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    /// Marks a run as failed
    pub fn fail_run(&mut self, run_id: i64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![RunStatus::Failed.to_db_string(), now, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    /// Gets a run by ID
    pub fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, root, mode, started_at, finished_at, config_hash, status,
                 dirs_processed, dirs_skipped, files_indexed FROM runs WHERE id = ?1",
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    /// Gets the most recent runs, newest first
    pub fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, root, mode, started_at, finished_at, config_hash, status,
             dirs_processed, dirs_skipped, files_indexed FROM runs ORDER BY id DESC LIMIT ?1",
        )?;

        let runs = stmt
            .query_map(params![limit as i64], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(runs)
    }

    // ===== Lookups =====

    /// Gets a directory by URL
    pub fn get_directory(&self, url: &str) -> StorageResult<Option<DirectoryRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT url, root, parent, name, modified FROM dirs WHERE url = ?1",
                params![url],
                |row| {
                    Ok(DirectoryRecord {
                        url: row.get(0)?,
                        root: row.get(1)?,
                        parent: row.get(2)?,
                        name: row.get(3)?,
                        modified: row.get(4)?,
                    })
                },
            )
            .optional()?;

        Ok(record)
    }

    /// Gets the media files of one directory, ordered by filename
    pub fn media_in_path(&self, root: &str, path: &str) -> StorageResult<Vec<MediaFileRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, root, path, filename, modified, size FROM media
             WHERE root = ?1 AND path = ?2 ORDER BY filename",
        )?;

        let files = stmt
            .query_map(params![root, path], |row| {
                Ok(MediaFileRecord {
                    url: row.get(0)?,
                    root: row.get(1)?,
                    path: row.get(2)?,
                    filename: row.get(3)?,
                    modified: row.get(4)?,
                    size: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(files)
    }

    // ===== Statistics =====

    /// Gets total directory count
    pub fn count_directories(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM dirs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Gets total media file count
    pub fn count_media_files(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM media", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Gets per-root directory and media counts, sorted by root URL
    ///
    /// `latest_modified` is the plain string maximum of the stored tokens.
    pub fn root_summaries(&self) -> StorageResult<Vec<RootSummary>> {
        let query = "
            SELECT r.root,
                   (SELECT COUNT(*) FROM dirs d WHERE d.root = r.root),
                   (SELECT COUNT(*) FROM media m WHERE m.root = r.root),
                   (SELECT MAX(d.modified) FROM dirs d WHERE d.root = r.root)
            FROM (SELECT root FROM dirs UNION SELECT root FROM media) r
            ORDER BY r.root
        ";

        let mut stmt = self.conn.prepare(query)?;
        let summaries = stmt
            .query_map([], |row| {
                Ok(RootSummary {
                    root: row.get(0)?,
                    directories: row.get::<_, i64>(1)? as u64,
                    media_files: row.get::<_, i64>(2)? as u64,
                    latest_modified: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(summaries)
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        root: row.get(1)?,
        mode: row.get(2)?,
        started_at: row.get(3)?,
        finished_at: row.get(4)?,
        config_hash: row.get(5)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(6)?)
            .unwrap_or(RunStatus::Failed),
        dirs_processed: row.get::<_, i64>(7)? as u64,
        dirs_skipped: row.get::<_, i64>(8)? as u64,
        files_indexed: row.get::<_, i64>(9)? as u64,
    })
}

impl IndexStore for SqliteStore {
    fn upsert_directory(&mut self, record: &DirectoryRecord) -> StorageResult<()> {
        self.begin_if_needed()?;
        self.conn.execute(
            "INSERT INTO dirs (url, root, parent, name, modified)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(url) DO UPDATE SET
                root = excluded.root,
                parent = excluded.parent,
                name = excluded.name,
                modified = excluded.modified",
            params![
                record.url,
                record.root,
                record.parent,
                record.name,
                record.modified
            ],
        )?;
        Ok(())
    }

    fn upsert_media_file(&mut self, record: &MediaFileRecord) -> StorageResult<()> {
        self.begin_if_needed()?;
        self.conn.execute(
            "INSERT INTO media (url, root, path, filename, modified, size)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(url) DO UPDATE SET
                root = excluded.root,
                path = excluded.path,
                filename = excluded.filename,
                modified = excluded.modified,
                size = excluded.size",
            params![
                record.url,
                record.root,
                record.path,
                record.filename,
                record.modified,
                record.size
            ],
        )?;
        Ok(())
    }

    fn delete_directories_for_root(&mut self, root: &str) -> StorageResult<u64> {
        self.begin_if_needed()?;
        let deleted = self
            .conn
            .execute("DELETE FROM dirs WHERE root = ?1", params![root])?;
        Ok(deleted as u64)
    }

    fn delete_media_for_root(&mut self, root: &str) -> StorageResult<u64> {
        self.begin_if_needed()?;
        let deleted = self
            .conn
            .execute("DELETE FROM media WHERE root = ?1", params![root])?;
        Ok(deleted as u64)
    }

    fn delete_media_for_path(&mut self, root: &str, path: &str) -> StorageResult<u64> {
        self.begin_if_needed()?;
        let deleted = self.conn.execute(
            "DELETE FROM media WHERE root = ?1 AND path = ?2",
            params![root, path],
        )?;
        Ok(deleted as u64)
    }

    fn directory_freshness(&self, url: &str) -> StorageResult<Option<Option<String>>> {
        let token = self
            .conn
            .query_row(
                "SELECT modified FROM dirs WHERE url = ?1",
                params![url],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(token)
    }

    fn commit(&mut self) -> StorageResult<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }
}
