//! Identity service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `IDENTITY_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//! - `JWT_SECRET` - Credential signing secret shared with the order service
//!   (min 32 chars, high entropy)
//!
//! ## Optional
//! - `IDENTITY_HOST` - Bind address (default: 127.0.0.1)
//! - `IDENTITY_PORT` - Listen port (default: 5000)
//! - `TOKEN_TTL_HOURS` - Lifetime of issued credentials (default: 24)
//! - `TRUST_PROXY_HEADERS` - Rate limit on `x-forwarded-for`/`x-real-ip`
//!   instead of the peer address; set only behind an ingress (default: false)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_TRACES_SAMPLE_RATE`

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use tech_commerce_core::check_signing_secret;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Identity service configuration.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Database connection URL (contains password)
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    /// Credential signing secret
    pub jwt_secret: SecretString,
    /// Hours an issued credential stays valid
    pub token_ttl_hours: u32,
    /// Whether client address headers come from a trusted ingress
    pub trust_proxy_headers: bool,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_traces_sample_rate: f32,
}

impl IdentityConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the signing secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = std::env::var("IDENTITY_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .map(SecretString::from)
            .map_err(|_| ConfigError::MissingEnvVar("IDENTITY_DATABASE_URL".to_string()))?;

        let jwt_secret = SecretString::from(
            std::env::var("JWT_SECRET")
                .map_err(|_| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?,
        );
        check_signing_secret(&jwt_secret)
            .map_err(|e| ConfigError::InsecureSecret("JWT_SECRET".to_string(), e.to_string()))?;

        let token_ttl_hours: u32 = parse_env("TOKEN_TTL_HOURS", "24")?;
        if token_ttl_hours == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "TOKEN_TTL_HOURS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            host: parse_env("IDENTITY_HOST", "127.0.0.1")?,
            port: parse_env("IDENTITY_PORT", "5000")?,
            jwt_secret,
            token_ttl_hours,
            trust_proxy_headers: parse_env("TRUST_PROXY_HEADERS", "false")?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Lifetime of issued credentials.
    #[must_use]
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.token_ttl_hours))
    }
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> IdentityConfig {
        IdentityConfig {
            database_url: SecretString::from("postgres://user:hunter2@db/identity"),
            host: "0.0.0.0".parse().unwrap(),
            port: 5000,
            jwt_secret: SecretString::from("super-signing-value"),
            token_ttl_hours: 24,
            trust_proxy_headers: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_socket_addr_and_ttl() {
        let config = config();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:5000");
        assert_eq!(config.token_ttl(), chrono::Duration::hours(24));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug_output = format!("{:?}", config());
        assert!(!debug_output.contains("hunter2"));
        assert!(!debug_output.contains("super-signing-value"));
    }

    #[test]
    fn test_parse_env_default() {
        let port: u16 = parse_env("TC_IDENTITY_TEST_UNSET_PORT", "5000").unwrap();
        assert_eq!(port, 5000);

        let trust: bool = parse_env("TC_IDENTITY_TEST_UNSET_TRUST", "false").unwrap();
        assert!(!trust);
    }
}
