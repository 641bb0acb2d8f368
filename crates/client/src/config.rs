//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `INKPOST_API_URL` - Base URL of the blog API (default: `http://127.0.0.1:3000/`)
//! - `INKPOST_SESSION_FILE` - Where the session is persisted
//!   (default: `<local data dir>/inkpost/session.json`)
//! - `INKPOST_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: none)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://127.0.0.1:3000/";
const SESSION_DIR: &str = "inkpost";
const SESSION_FILE: &str = "session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the blog API, always ending in `/`.
    pub api_url: Url,
    /// Path of the persisted session file.
    pub session_file: PathBuf,
    /// Optional request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
    /// Sentry environment name.
    pub sentry_environment: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("INKPOST_API_URL", DEFAULT_API_URL))
            .map_err(|e| ConfigError::InvalidEnvVar("INKPOST_API_URL".to_string(), e))?;

        let session_file =
            get_optional_env("INKPOST_SESSION_FILE").map_or_else(default_session_file, PathBuf::from);

        let timeout = get_optional_env("INKPOST_HTTP_TIMEOUT_SECS")
            .map(|raw| parse_timeout(&raw))
            .transpose()
            .map_err(|e| ConfigError::InvalidEnvVar("INKPOST_HTTP_TIMEOUT_SECS".to_string(), e))?;

        Ok(Self {
            api_url,
            session_file,
            timeout,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Replace the API base URL (e.g. from a command-line flag).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL cannot be used as a base.
    pub fn with_api_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_api_url(raw)
            .map_err(|e| ConfigError::InvalidEnvVar("--api-url".to_string(), e))?;
        Ok(self)
    }
}

/// Parse a base URL and make sure relative paths append to it.
///
/// `http://host/api` becomes `http://host/api/` so that endpoints land under
/// `/api/` instead of replacing the last segment.
///
/// # Errors
///
/// Returns a description of the problem if the URL does not parse or cannot
/// carry a path.
pub fn parse_api_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() {
        return Err(format!("{raw} cannot be used as a base URL"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Parse a request timeout given in whole seconds.
///
/// # Errors
///
/// Returns a description of the problem if `raw` is not a non-negative
/// integer.
pub fn parse_timeout(raw: &str) -> Result<Duration, String> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| format!("{raw:?} is not a number of seconds: {e}"))
}

/// Default location of the session file.
#[must_use]
pub fn default_session_file() -> PathBuf {
    dirs::data_local_dir().map_or_else(
        || PathBuf::from(".inkpost-session.json"),
        |dir| dir.join(SESSION_DIR).join(SESSION_FILE),
    )
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_url_adds_trailing_slash() {
        let url = parse_api_url("http://localhost:3000/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/");
    }

    #[test]
    fn test_parse_api_url_keeps_root() {
        let url = parse_api_url("http://172.28.64.1:3000").unwrap();
        assert_eq!(url.as_str(), "http://172.28.64.1:3000/");
    }

    #[test]
    fn test_parse_api_url_rejects_garbage() {
        assert!(parse_api_url("not a url").is_err());
        assert!(parse_api_url("mailto:a@x.com").is_err());
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout(" 30 ").unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_timeout_rejects_non_numbers() {
        let err = parse_timeout("soon").unwrap_err();
        assert!(err.starts_with("\"soon\" is not a number of seconds"));
        assert!(parse_timeout("-5").is_err());
        assert!(parse_timeout("1.5").is_err());
    }

    #[test]
    fn test_default_session_file_name() {
        let path = default_session_file();
        assert!(path.to_string_lossy().ends_with("session.json"));
    }

    #[test]
    fn test_with_api_url_override() {
        let config = ClientConfig {
            api_url: parse_api_url(DEFAULT_API_URL).unwrap(),
            session_file: PathBuf::from("session.json"),
            timeout: None,
            sentry_dsn: None,
            sentry_environment: None,
        };
        let config = config.with_api_url("https://blog.example.com").unwrap();
        assert_eq!(config.api_url.as_str(), "https://blog.example.com/");
    }
}
