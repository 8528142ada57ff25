//! Configuration module for CineIndex
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use cineindex::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("cineindex.toml")).unwrap();
//! println!("Commit every {} directories", config.crawler.commit_interval);
//! ```

mod parser;
mod root;
mod types;
mod validation;

// Re-export types
pub use root::Root;
pub use types::{Config, CrawlerConfig, OutputConfig, RootEntry};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
