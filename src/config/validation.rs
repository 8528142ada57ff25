use crate::config::types::{Config, CrawlerConfig, OutputConfig, RootEntry};
use crate::url::normalize_root_url;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    validate_roots(&config.roots)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.commit_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "commit_interval must be >= 1, got {}",
            config.commit_interval
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    validate_name_list("video_extensions", &config.video_extensions)?;
    validate_name_list("blocked_dirs", &config.blocked_dirs)?;

    Ok(())
}

/// Extensions and blocked directory names are matched exactly, so globs are rejected
fn validate_name_list(field: &str, values: &[String]) -> Result<(), ConfigError> {
    for value in values {
        let trimmed = value.trim().trim_start_matches('.');
        if trimmed.is_empty() {
            return Err(ConfigError::Validation(format!(
                "{} cannot contain empty entries",
                field
            )));
        }

        if trimmed.contains(['*', '?', '/']) {
            return Err(ConfigError::Validation(format!(
                "{} entries are matched exactly and cannot contain '*', '?' or '/', got '{}'",
                field, value
            )));
        }
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates root entries
fn validate_roots(roots: &[RootEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in roots {
        if entry.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "root url cannot be empty".to_string(),
            ));
        }

        let url = Url::parse(entry.url.trim()).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid root URL '{}': {}", entry.url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Root URL '{}' must use the http or https scheme",
                entry.url
            )));
        }

        let normalized = normalize_root_url(&entry.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid root URL '{}': {}", entry.url, e))
        })?;

        if !seen.insert(normalized.clone()) {
            return Err(ConfigError::Validation(format!(
                "Root '{}' is configured more than once",
                normalized
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(url: &str) -> RootEntry {
        RootEntry {
            url: url.to_string(),
            cookie: None,
            tag: None,
        }
    }

    #[test]
    fn test_validate_roots() {
        assert!(validate_roots(&[root("http://x/Movies/"), root("https://y/TV")]).is_ok());
        assert!(validate_roots(&[]).is_ok());

        assert!(validate_roots(&[root("")]).is_err());
        assert!(validate_roots(&[root("ftp://x/Movies/")]).is_err());
        assert!(validate_roots(&[root("not a url")]).is_err());
    }

    #[test]
    fn test_duplicate_roots_after_normalization() {
        let result = validate_roots(&[root("http://x/Movies"), root("http://x/Movies/")]);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_name_list() {
        assert!(validate_name_list("video_extensions", &["mkv".into(), ".MP4".into()]).is_ok());

        assert!(validate_name_list("video_extensions", &["".into()]).is_err());
        assert!(validate_name_list("video_extensions", &[".".into()]).is_err());
        assert!(validate_name_list("blocked_dirs", &["sample*".into()]).is_err());
        assert!(validate_name_list("blocked_dirs", &["a/b".into()]).is_err());
    }

    #[test]
    fn test_validate_crawler_limits() {
        let mut config = CrawlerConfig::default();
        assert!(validate_crawler_config(&config).is_ok());

        config.commit_interval = 0;
        assert!(validate_crawler_config(&config).is_err());

        config = CrawlerConfig::default();
        config.request_timeout_secs = 0;
        assert!(validate_crawler_config(&config).is_err());
    }
}
