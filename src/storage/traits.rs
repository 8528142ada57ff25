//! Storage traits and error types
//!
//! This module defines the store contract the crawler writes through and the
//! associated error types.

use crate::storage::{DirectoryRecord, MediaFileRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Store contract used by the crawler
///
/// Directories and media files are both keyed by URL; upserts overwrite every
/// column of an existing row with the same key. Writes become durable only at
/// [`IndexStore::commit`], so a crash loses at most the writes since the last commit.
pub trait IndexStore {
    /// Inserts or replaces the directory row keyed by `record.url`
    fn upsert_directory(&mut self, record: &DirectoryRecord) -> StorageResult<()>;

    /// Inserts or replaces the media file row keyed by `record.url`
    fn upsert_media_file(&mut self, record: &MediaFileRecord) -> StorageResult<()>;

    /// Deletes every directory row owned by `root`, returning the number removed
    fn delete_directories_for_root(&mut self, root: &str) -> StorageResult<u64>;

    /// Deletes every media row owned by `root`, returning the number removed
    fn delete_media_for_root(&mut self, root: &str) -> StorageResult<u64>;

    /// Deletes the media rows of one directory of `root`, returning the number removed
    fn delete_media_for_path(&mut self, root: &str, path: &str) -> StorageResult<u64>;

    /// Looks up the stored freshness token of a directory
    ///
    /// The outer `Option` is `None` when no row exists for `url`; the inner one is
    /// the stored token, which may itself be absent.
    fn directory_freshness(&self, url: &str) -> StorageResult<Option<Option<String>>>;

    /// Makes all pending writes durable
    fn commit(&mut self) -> StorageResult<()>;
}
