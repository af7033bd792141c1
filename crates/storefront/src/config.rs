//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `DELIVERY_BASE_FEE` - Delivery fee when no settings row exists (default: 5.00)
//! - `DELIVERY_FREE_THRESHOLD` - Subtotal for free delivery when no settings row exists (default: 50.00)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name (e.g. production)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rust_decimal::Decimal;
use saffron_core::DeliverySettings;
use secrecy::SecretString;
use thiserror::Error;

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
    /// Delivery fees used until an operator stores settings in the database
    pub default_delivery: DeliverySettings,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
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
        let host = parse_env_value::<IpAddr>(
            "STOREFRONT_HOST",
            &get_env_or_default("STOREFRONT_HOST", "127.0.0.1"),
        )?;
        let port = parse_env_value::<u16>(
            "STOREFRONT_PORT",
            &get_env_or_default("STOREFRONT_PORT", "3000"),
        )?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;

        let defaults = DeliverySettings::default();
        let default_delivery = DeliverySettings {
            base_fee: get_optional_amount("DELIVERY_BASE_FEE")?.unwrap_or(defaults.base_fee),
            free_threshold: get_optional_amount("DELIVERY_FREE_THRESHOLD")?
                .unwrap_or(defaults.free_threshold),
        };

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            default_delivery,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should be marked `Secure`.
    #[must_use]
    pub fn is_https(&self) -> bool {
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

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a raw value, reporting the variable name on failure.
fn parse_env_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a non-negative money amount.
fn parse_amount(key: &str, raw: &str) -> Result<Decimal, ConfigError> {
    let amount = parse_env_value::<Decimal>(key, raw)?;
    if amount.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "amount cannot be negative".to_string(),
        ));
    }
    Ok(amount)
}

fn get_optional_amount(key: &str) -> Result<Option<Decimal>, ConfigError> {
    get_optional_env(key)
        .map(|raw| parse_amount(key, &raw))
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/saffron_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            default_delivery: DeliverySettings::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_https() {
        let mut config = config();
        assert!(!config.is_https());
        config.base_url = "https://order.saffron.example".to_string();
        assert!(config.is_https());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(
            parse_amount("DELIVERY_BASE_FEE", " 4.50 ").unwrap(),
            Decimal::new(450, 2)
        );
        assert!(matches!(
            parse_amount("DELIVERY_BASE_FEE", "-1"),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "DELIVERY_BASE_FEE"
        ));
        assert!(parse_amount("DELIVERY_BASE_FEE", "free").is_err());
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_env_value::<u16>("STOREFRONT_PORT", "8080").unwrap(), 8080);
        let err = parse_env_value::<u16>("STOREFRONT_PORT", "99999").unwrap_err();
        assert!(err.to_string().starts_with("Invalid environment variable STOREFRONT_PORT"));
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let debug_output = format!("{:?}", config());
        assert!(!debug_output.contains("saffron_test"));
    }
}
