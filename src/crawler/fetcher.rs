//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - The [`PageFetcher`] seam the coordinator fetches listing pages through
//! - Building HTTP clients with a user agent and per-request timeout
//! - Loading Netscape-format cookie files as per-root credentials
//! - Error classification into [`FetchError`]
//!
//! Fetch failures are never retried here; the crawler skips the directory.

use crate::config::CrawlerConfig;
use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::Client;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a listing page could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Retrieves the raw text of a listing page
///
/// `credential` is the root's cookie file, if it has one.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, credential: Option<&Path>) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - User agent sent with every request
/// * `timeout` - Per-request timeout
/// * `cookies` - Optional cookie jar for authenticated roots
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    user_agent: &str,
    timeout: Duration,
    cookies: Option<Arc<Jar>>,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true);

    if let Some(jar) = cookies {
        builder = builder.cookie_provider(jar);
    }

    builder.build()
}

/// [`PageFetcher`] backed by `reqwest`
///
/// One client is built per distinct cookie file and reused for every request
/// made with that credential.
pub struct HttpFetcher {
    user_agent: String,
    timeout: Duration,
    clients: Mutex<HashMap<Option<PathBuf>, Client>>,
}

impl HttpFetcher {
    pub fn new(user_agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            user_agent: user_agent.into(),
            timeout,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a fetcher from the crawler section of the configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            config.user_agent.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn client_for(&self, credential: Option<&Path>) -> Result<Client, FetchError> {
        let key = credential.map(Path::to_path_buf);
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(client) = clients.get(&key) {
            return Ok(client.clone());
        }

        let jar = credential.and_then(|path| match load_cookie_jar(path) {
            Ok(jar) => Some(Arc::new(jar)),
            Err(e) => {
                tracing::warn!(
                    "Failed to load cookie file {}: {}; continuing without cookies",
                    path.display(),
                    e
                );
                None
            }
        });

        let client = build_http_client(&self.user_agent, self.timeout, jar)
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        clients.insert(key, client.clone());

        Ok(client)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, credential: Option<&Path>) -> Result<String, FetchError> {
        let client = self.client_for(credential)?;

        let response = client.get(url).send().await.map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

fn classify_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if let Some(status) = error.status() {
        FetchError::Status {
            status: status.as_u16(),
        }
    } else {
        FetchError::Transport(error.to_string())
    }
}

/// One line of a Netscape cookie file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetscapeCookie {
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    pub name: String,
    pub value: String,
}

impl NetscapeCookie {
    /// URL the cookie is scoped to, used to register it in a jar
    fn origin(&self) -> Option<Url> {
        let scheme = if self.secure { "https" } else { "http" };
        Url::parse(&format!(
            "{}://{}{}",
            scheme,
            self.domain.trim_start_matches('.'),
            self.path
        ))
        .ok()
    }

    /// `Set-Cookie` style representation
    fn header_value(&self) -> String {
        let mut cookie = format!("{}={}; Path={}", self.name, self.value, self.path);
        if self.include_subdomains {
            cookie.push_str(&format!("; Domain={}", self.domain.trim_start_matches('.')));
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Parses the Netscape/Mozilla `cookies.txt` format
///
/// Expiry is ignored, as are comments and malformed lines. `#HttpOnly_` prefixed
/// lines are cookies, not comments.
pub fn parse_cookie_file(content: &str) -> Vec<NetscapeCookie> {
    content
        .lines()
        .filter_map(|raw| {
            let line = raw.trim_end_matches('\r');
            let line = match line.strip_prefix("#HttpOnly_") {
                Some(rest) => rest,
                None if line.trim().is_empty() || line.starts_with('#') => return None,
                None => line,
            };

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 7 {
                return None;
            }

            Some(NetscapeCookie {
                domain: fields[0].to_string(),
                include_subdomains: fields[1].eq_ignore_ascii_case("TRUE"),
                path: fields[2].to_string(),
                secure: fields[3].eq_ignore_ascii_case("TRUE"),
                name: fields[5].to_string(),
                value: fields[6].to_string(),
            })
        })
        .collect()
}

/// Loads a Netscape cookie file into a jar
pub fn load_cookie_jar(path: &Path) -> std::io::Result<Jar> {
    let content = std::fs::read_to_string(path)?;
    let jar = Jar::default();

    for cookie in parse_cookie_file(&content) {
        if let Some(origin) = cookie.origin() {
            jar.add_cookie_str(&cookie.header_value(), &origin);
        }
    }

    Ok(jar)
}
