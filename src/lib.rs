//! CineIndex: a media indexer for directory-listing web servers
//!
//! This crate crawls autoindex-style directory listings (plain autoindex tables,
//! h5ai fallback pages and DataTables listings) into a SQLite catalog of directories
//! and media files, and re-crawls incrementally by comparing per-directory freshness
//! tokens so unchanged subtrees are not processed again.

pub mod config;
pub mod crawler;
pub mod output;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for CineIndex operations
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
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
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, Root};
pub use crawler::{parse_listing, run_index, CrawlMode, CrawlPolicy, CrawlReport, ParsedPage};
pub use storage::{IndexStore, SqliteStore};
