//! Kasir configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! ## Backend
//! - `KASIR_API_URL` - Mock backend base URL (default: `http://localhost:3001`)
//! - `KASIR_API_TIMEOUT_MS` - Per-request timeout (default: 5000)
//! - `KASIR_API_RETRY_ATTEMPTS` - Connection attempts before giving up (default: 3)
//! - `KASIR_API_RETRY_DELAY_MS` - Wait before probing other ports (default: 1000)
//! - `KASIR_API_RETRY_BACKOFF` - Multiplier applied to the delay per attempt (default: 1)
//! - `KASIR_API_SCAN_START_PORT` - First port probed for the backend (default: 3001)
//! - `KASIR_API_SCAN_SPAN` - Number of consecutive ports probed (default: 10)
//!
//! ## Server
//! - `KASIR_HOST` - Bind address (default: 127.0.0.1)
//! - `KASIR_PORT` - Listen port (default: 3000)
//! - `KASIR_STATIC_DIR` - Static assets directory (default: `crates/web/static`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default backend URL, where `json-server --port 3001` listens.
pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Kasir application configuration.
#[derive(Debug, Clone)]
pub struct KasirConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Backend connection settings
    pub api: ApiConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// How to reach the mock backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL the client starts from.
    pub base_url: Url,
    /// Timeout applied to every request.
    pub timeout: Duration,
    /// Retry policy used while resolving a reachable backend.
    pub retry: RetryPolicy,
    /// Port window probed when the base URL stops answering.
    pub scan: PortScan,
}

/// Fixed-attempt retry with an optional multiplicative backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total connection checks, including the first one.
    pub max_attempts: u32,
    /// Wait after the first failed check.
    pub delay: Duration,
    /// Factor applied to `delay` after every further failure (1 = fixed).
    pub backoff: u32,
}

/// A window of consecutive ports to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortScan {
    pub start_port: u16,
    pub span: u16,
}

impl KasirConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            host: get_parsed_or_default("KASIR_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: get_parsed_or_default("KASIR_PORT", 3000)?,
            static_dir: PathBuf::from(get_env_or_default("KASIR_STATIC_DIR", "crates/web/static")),
            api: ApiConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ApiConfig {
    /// Settings for a backend at `base_url` with the default timeout,
    /// retry policy and port window.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_millis(5000),
            retry: RetryPolicy::default(),
            scan: PortScan::default(),
        }
    }

    /// Load backend settings from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_base_url(&get_env_or_default("KASIR_API_URL", DEFAULT_API_URL))?;
        let defaults = Self::new(base_url);

        let retry = RetryPolicy {
            max_attempts: get_parsed_or_default(
                "KASIR_API_RETRY_ATTEMPTS",
                defaults.retry.max_attempts,
            )?,
            delay: Duration::from_millis(get_parsed_or_default(
                "KASIR_API_RETRY_DELAY_MS",
                millis(defaults.retry.delay),
            )?),
            backoff: get_parsed_or_default("KASIR_API_RETRY_BACKOFF", defaults.retry.backoff)?,
        };
        if retry.max_attempts == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "KASIR_API_RETRY_ATTEMPTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let scan = PortScan {
            start_port: get_parsed_or_default(
                "KASIR_API_SCAN_START_PORT",
                defaults.scan.start_port,
            )?,
            span: get_parsed_or_default("KASIR_API_SCAN_SPAN", defaults.scan.span)?,
        };

        Ok(Self {
            timeout: Duration::from_millis(get_parsed_or_default(
                "KASIR_API_TIMEOUT_MS",
                millis(defaults.timeout),
            )?),
            retry,
            scan,
            ..defaults
        })
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        // The literal is a valid absolute URL
        #[allow(clippy::expect_used)]
        Self::new(Url::parse(DEFAULT_API_URL).expect("default API URL is valid"))
    }
}

impl RetryPolicy {
    /// Wait before the port probe that follows failed attempt `attempt`
    /// (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self
            .backoff
            .max(1)
            .saturating_pow(attempt.saturating_sub(1));
        self.delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(1000),
            backoff: 1,
        }
    }
}

impl PortScan {
    /// Ports in the window, in probe order.
    pub fn ports(&self) -> impl Iterator<Item = u16> + use<> {
        let start = self.start_port;
        (0..self.span).map_while(move |offset| start.checked_add(offset))
    }
}

impl Default for PortScan {
    fn default() -> Self {
        Self {
            start_port: 3001,
            span: 10,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate and parse the backend base URL.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("KASIR_API_URL".to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            "KASIR_API_URL".to_string(),
            format!("expected an http(s) URL with a host, got {raw}"),
        ));
    }

    Ok(url)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn get_parsed_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url.as_str(), "http://localhost:3001/");
        assert_eq!(config.timeout, Duration::from_millis(5000));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay, Duration::from_millis(1000));
        assert_eq!(config.scan.start_port, 3001);
        assert_eq!(config.scan.span, 10);
    }

    #[test]
    fn test_fixed_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_after(2), Duration::from_millis(1000));
    }

    #[test]
    fn test_backoff_delay() {
        let policy = RetryPolicy {
            max_attempts: 4,
            delay: Duration::from_millis(100),
            backoff: 2,
        };
        assert_eq!(policy.delay_after(1), Duration::from_millis(100));
        assert_eq!(policy.delay_after(2), Duration::from_millis(200));
        assert_eq!(policy.delay_after(3), Duration::from_millis(400));
    }

    #[test]
    fn test_zero_backoff_is_fixed() {
        let policy = RetryPolicy {
            backoff: 0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_after(3), policy.delay);
    }

    #[test]
    fn test_scan_ports() {
        let scan = PortScan::default();
        let ports: Vec<u16> = scan.ports().collect();
        assert_eq!(ports.len(), 10);
        assert_eq!(ports.first(), Some(&3001));
        assert_eq!(ports.last(), Some(&3010));
    }

    #[test]
    fn test_scan_stops_at_port_limit() {
        let scan = PortScan {
            start_port: u16::MAX - 1,
            span: 10,
        };
        assert_eq!(scan.ports().collect::<Vec<_>>(), vec![u16::MAX - 1, u16::MAX]);
    }

    #[test]
    fn test_parse_base_url() {
        assert!(parse_base_url("http://localhost:3001").is_ok());
        assert!(parse_base_url("https://kasir.test/api").is_ok());
        assert!(parse_base_url("localhost:3001").is_err());
        assert!(parse_base_url("ftp://localhost").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = KasirConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            static_dir: PathBuf::from("static"),
            api: ApiConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }
}
