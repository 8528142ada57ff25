use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for CineIndex
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "root")]
    pub roots: Vec<RootEntry>,

    /// Directory the configuration was loaded from; relative cookie paths resolve
    /// against it
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// File extensions to index; empty means every file is indexed
    #[serde(rename = "video-extensions", default)]
    pub video_extensions: Vec<String>,

    /// Directory names whose whole subtree is never crawled
    #[serde(rename = "blocked-dirs", default)]
    pub blocked_dirs: Vec<String>,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Number of processed directories between commits
    #[serde(rename = "commit-interval", default = "default_commit_interval")]
    pub commit_interval: usize,

    /// User agent sent with every listing request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            video_extensions: Vec::new(),
            blocked_dirs: Vec::new(),
            request_timeout_secs: default_request_timeout(),
            commit_interval: default_commit_interval(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_request_timeout() -> u64 {
    15
}

fn default_commit_interval() -> usize {
    20
}

fn default_user_agent() -> String {
    format!("cineindex/{}", env!("CARGO_PKG_VERSION"))
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// A crawl root as written in the configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct RootEntry {
    /// Root URL of the directory listing
    pub url: String,

    /// Optional Netscape-format cookie file used when fetching this root
    #[serde(default)]
    pub cookie: Option<String>,

    /// Optional short label shown in statistics
    #[serde(default)]
    pub tag: Option<String>,
}
