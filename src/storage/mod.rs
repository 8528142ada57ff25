//! Storage module for persisting the media index
//!
//! This module handles all database operations for the indexer, including:
//! - SQLite database initialization and schema management
//! - Directory and media file upserts keyed by URL
//! - Root-scoped and directory-scoped bulk deletion
//! - Crawl run tracking and index statistics

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{IndexStore, StorageError, StorageResult};

use crate::IndexError;
use std::path::Path;

/// Opens (creating if needed) the index database at `path`
pub fn open_store(path: &Path) -> Result<SqliteStore, IndexError> {
    SqliteStore::new(path)
}

/// One crawled directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    pub url: String,
    pub root: String,
    pub parent: Option<String>,
    pub name: String,
    pub modified: Option<String>,
}

/// One indexed media file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFileRecord {
    pub url: String,
    pub root: String,
    pub path: String,
    pub filename: String,
    pub modified: Option<String>,
    pub size: Option<String>,
}

/// Represents a crawl run of one root
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub root: String,
    pub mode: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub dirs_processed: u64,
    pub dirs_skipped: u64,
    pub files_indexed: u64,
}

/// Per-root totals for statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootSummary {
    pub root: String,
    pub directories: u64,
    pub media_files: u64,
    /// Maximum freshness token over the root's directories
    pub latest_modified: Option<String>,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_from_db() {
        assert_eq!(RunStatus::from_db_string("running"), Some(RunStatus::Running));
        assert_eq!(
            RunStatus::from_db_string(RunStatus::Failed.to_db_string()),
            Some(RunStatus::Failed)
        );
    }

    #[test]
    fn test_run_status_invalid() {
        assert_eq!(RunStatus::from_db_string("interrupted"), None);
    }
}
