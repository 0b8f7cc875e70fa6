//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront; `https://` enables secure cookies
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STORE_REGION_ID` - Region used for prices and visibility (default: 1)
//! - `STORE_PATH` - Path prefix of product pages (default: `/store/`)
//! - `QUICK_ORDER_ROWS` - Rows on the quick order form (default: 10)
//! - `CART_MAX_ENTRIES` - Distinct entries allowed per cart (default: 100)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0 to 1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

use tidewater_core::RegionId;

use crate::services::DEFAULT_MAX_ENTRIES;
use crate::services::quick_order::DEFAULT_ROWS;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Store settings
    pub store: StoreConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Merchandising settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Region whose prices and item visibility apply
    pub region: RegionId,
    /// Path prefix of product pages, with leading and trailing slash
    pub path: String,
    /// Number of rows on the quick order form
    pub quick_order_rows: usize,
    /// Distinct entries allowed per sub-cart
    pub cart_max_entries: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            region: RegionId::new(1),
            path: "/store/".to_owned(),
            quick_order_rows: DEFAULT_ROWS,
            cart_max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl StoreConfig {
    /// Link to a product page given its category path.
    #[must_use]
    pub fn product_link(&self, path: &str) -> String {
        format!("{}{}", self.path, path.trim_start_matches('/'))
    }

    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            region: RegionId::new(parse_env_or_default("STORE_REGION_ID", 1)?),
            path: normalize_store_path(&get_env_or_default("STORE_PATH", "/store/")),
            quick_order_rows: parse_env_or_default("QUICK_ORDER_ROWS", DEFAULT_ROWS)?,
            cart_max_entries: parse_env_or_default("CART_MAX_ENTRIES", DEFAULT_MAX_ENTRIES)?,
        })
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

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = parse_env_or_default("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_env_or_default("STOREFRONT_PORT", 3000_u16)?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let store = StoreConfig::from_env()?;

        let sentry_sample_rate = parse_env_or_default("SENTRY_SAMPLE_RATE", 1.0_f32)?;
        let sentry_traces_sample_rate = parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", 0.0_f32)?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            store,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating blank as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, using `default` when it is unset.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Ensure the store path starts and ends with a slash.
fn normalize_store_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        format!("/{trimmed}/")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: base_url.to_string(),
            store: StoreConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config("http://localhost:3000").socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure() {
        assert!(!config("http://localhost:3000").is_secure());
        assert!(config("https://shop.example.com").is_secure());
    }

    #[test]
    fn test_store_defaults() {
        let store = StoreConfig::default();
        assert_eq!(store.region, RegionId::new(1));
        assert_eq!(store.quick_order_rows, 10);
        assert_eq!(store.cart_max_entries, 100);
    }

    #[test]
    fn test_normalize_store_path() {
        assert_eq!(normalize_store_path("store"), "/store/");
        assert_eq!(normalize_store_path("/shop/"), "/shop/");
        assert_eq!(normalize_store_path(""), "/");
    }

    #[test]
    fn test_product_link() {
        let store = StoreConfig::default();
        assert_eq!(store.product_link("tools/saw"), "/store/tools/saw");
        assert_eq!(store.product_link("/tools/saw"), "/store/tools/saw");
    }

    #[test]
    fn test_parse_env_or_default_unset() {
        let value: usize = parse_env_or_default("TIDEWATER_TEST_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }
}
