//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREKEEPER_API_BASE_URL` - Persistence service base URL (default: `http://localhost:3001/api`)
//! - `STOREKEEPER_API_TOKEN` - Bearer token sent with every request
//! - `STOREKEEPER_HTTP_TIMEOUT_SECS` - Request timeout (default: transport default)
//! - `STOREKEEPER_CATALOG_CACHE_TTL_SECS` - Product/category cache TTL (default: 300)
//! - `STOREKEEPER_DATA_DIR` - Directory for per-user cart/wishlist files (default: `.storekeeper`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_DATA_DIR: &str = ".storekeeper";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Persistence service settings
    pub api: ApiConfig,
    /// Directory backing the durable local store
    pub data_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Persistence service configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL the collection paths are appended to
    pub base_url: Url,
    /// Optional bearer token
    pub token: Option<SecretString>,
    /// Request timeout; `None` keeps the transport default
    pub timeout: Option<Duration>,
    /// TTL for cached product and category lists
    pub catalog_cache_ttl: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("catalog_cache_ttl", &self.catalog_cache_ttl)
            .finish()
    }
}

impl ApiConfig {
    /// Configuration pointing at `base_url` with defaults for everything else.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            token: None,
            timeout: None,
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api = ApiConfig::from_env()?;
        let data_dir = PathBuf::from(get_env_or_default("STOREKEEPER_DATA_DIR", DEFAULT_DATA_DIR));
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            api,
            data_dir,
            sentry_dsn,
            sentry_environment,
        })
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_base_url(&get_env_or_default(
            "STOREKEEPER_API_BASE_URL",
            DEFAULT_API_BASE_URL,
        ))
        .map_err(|e| ConfigError::InvalidEnvVar("STOREKEEPER_API_BASE_URL".to_string(), e))?;

        let timeout = get_optional_env("STOREKEEPER_HTTP_TIMEOUT_SECS")
            .map(|v| parse_secs("STOREKEEPER_HTTP_TIMEOUT_SECS", &v))
            .transpose()?;

        let catalog_cache_ttl = parse_secs(
            "STOREKEEPER_CATALOG_CACHE_TTL_SECS",
            &get_env_or_default(
                "STOREKEEPER_CATALOG_CACHE_TTL_SECS",
                &DEFAULT_CATALOG_CACHE_TTL_SECS.to_string(),
            ),
        )?;

        Ok(Self {
            base_url,
            token: get_optional_env("STOREKEEPER_API_TOKEN").map(SecretString::from),
            timeout,
            catalog_cache_ttl,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as absent.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a whole number of seconds.
fn parse_secs(key: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse the API base URL, normalizing away a trailing slash.
fn parse_base_url(value: &str) -> Result<Url, String> {
    let url = Url::parse(value.trim_end_matches('/')).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() {
        return Err(format!("{value} cannot be used as a base URL"));
    }
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme: {other}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_strips_trailing_slash() {
        let url = parse_base_url("https://api.example.com/api/").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api");
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        assert!(parse_base_url("ftp://example.com/api").is_err());
        assert!(parse_base_url("mailto:someone@example.com").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(
            parse_secs("X", "30").unwrap(),
            Duration::from_secs(30)
        );
        assert!(matches!(
            parse_secs("X", "-1"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_api_config_debug_redacts_token() {
        let mut config = ApiConfig::new(Url::parse("http://localhost:3001/api").unwrap());
        config.token = Some(SecretString::from("super_secret_token"));

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("localhost:3001"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
    }

    #[test]
    fn test_api_config_defaults() {
        let config = ApiConfig::new(Url::parse(DEFAULT_API_BASE_URL).unwrap());
        assert!(config.timeout.is_none());
        assert!(config.token.is_none());
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
    }
}
