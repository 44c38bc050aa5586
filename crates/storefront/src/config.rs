//! Cart engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `JERSEY_SHOP_API_URL` - Base URL of the shop API (catalog and cart)
//!
//! ## Optional
//! - `JERSEY_SHOP_DATA_DIR` - Directory for on-device storage (default: .jersey-shop)
//! - `JERSEY_SHOP_STORAGE_QUOTA_BYTES` - On-device storage quota (default: 5 MiB)
//! - `JERSEY_SHOP_HTTP_TIMEOUT_SECS` - Request timeout for API calls (default: 10)
//! - `JERSEY_SHOP_TOKEN` - Access token of a signed-in customer

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Browsers typically grant 5 MiB of local storage per origin.
const DEFAULT_STORAGE_QUOTA_BYTES: u64 = 5 * 1024 * 1024;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart engine configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Base URL of the shop API, always ending in `/`
    pub api_url: Url,
    /// Directory backing on-device storage
    pub data_dir: PathBuf,
    /// Maximum bytes on-device storage may hold
    pub storage_quota_bytes: u64,
    /// Timeout applied to every API request
    pub http_timeout: Duration,
    /// Access token of the signed-in customer, if any
    pub access_token: Option<SecretString>,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("api_url", &self.api_url.as_str())
            .field("data_dir", &self.data_dir)
            .field("storage_quota_bytes", &self.storage_quota_bytes)
            .field("http_timeout", &self.http_timeout)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_required_env("JERSEY_SHOP_API_URL")?)?;
        let data_dir = PathBuf::from(get_env_or_default("JERSEY_SHOP_DATA_DIR", ".jersey-shop"));
        let storage_quota_bytes = get_env_or_default(
            "JERSEY_SHOP_STORAGE_QUOTA_BYTES",
            &DEFAULT_STORAGE_QUOTA_BYTES.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("JERSEY_SHOP_STORAGE_QUOTA_BYTES".to_string(), e.to_string())
        })?;
        let http_timeout = get_env_or_default(
            "JERSEY_SHOP_HTTP_TIMEOUT_SECS",
            &DEFAULT_HTTP_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| {
            ConfigError::InvalidEnvVar("JERSEY_SHOP_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
        })?;
        let access_token = get_optional_env("JERSEY_SHOP_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);

        Ok(Self {
            api_url,
            data_dir,
            storage_quota_bytes,
            http_timeout,
            access_token,
        })
    }

    /// Configuration for a given API base URL with every optional value at
    /// its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_url` is not an http(s) URL.
    pub fn for_api_url(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            data_dir: PathBuf::from(".jersey-shop"),
            storage_quota_bytes: DEFAULT_STORAGE_QUOTA_BYTES,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            access_token: None,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the API base URL, forcing a trailing slash so relative joins keep
/// the full path (`https://shop/api/` + `cart` = `https://shop/api/cart`).
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("JERSEY_SHOP_API_URL".to_string(), msg);

    let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
