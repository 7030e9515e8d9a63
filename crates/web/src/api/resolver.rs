//! Resolution of a reachable backend endpoint.
//!
//! The mock backend is a development server that may come up on a different
//! port than configured. Before every request the resolver checks the current
//! endpoint; when it stops answering, it retries according to the
//! [`RetryPolicy`], scanning the configured port window between attempts, and
//! adopts the first endpoint that answers.

use std::fmt;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use url::Url;

use crate::config::{ApiConfig, PortScan, RetryPolicy};

use super::probe::{check_server_connection, get_available_port};

/// Base URL of a backend instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    base_url: Url,
}

impl ApiEndpoint {
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.base_url
    }

    /// Port of the endpoint, falling back to the scheme's default.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.base_url.port_or_known_default()
    }

    /// The same endpoint on another port.
    #[must_use]
    pub fn with_port(&self, port: u16) -> Option<Self> {
        let mut base_url = self.base_url.clone();
        base_url.set_port(Some(port)).ok()?;
        Some(Self { base_url })
    }

    /// Absolute URL of `path` below the base URL.
    #[must_use]
    pub fn collection(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl fmt::Display for ApiEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_url.as_str())
    }
}

/// No backend answered within the retry policy.
#[derive(Debug, Clone, Error)]
#[error("no backend answered after {attempts} attempts (last tried {last_tried})")]
pub struct Unreachable {
    pub attempts: u32,
    pub last_tried: String,
}

/// Owns the endpoint every request is sent to.
pub struct ConnectionResolver {
    http: reqwest::Client,
    current: RwLock<ApiEndpoint>,
    retry: RetryPolicy,
    scan: PortScan,
}

impl ConnectionResolver {
    #[must_use]
    pub fn new(http: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            http,
            current: RwLock::new(ApiEndpoint::new(config.base_url.clone())),
            retry: config.retry,
            scan: config.scan,
        }
    }

    /// The endpoint requests are currently sent to.
    pub async fn current(&self) -> ApiEndpoint {
        self.current.read().await.clone()
    }

    /// Whether the current endpoint answers right now, without retrying.
    pub async fn is_reachable(&self) -> bool {
        let endpoint = self.current().await;
        check_server_connection(&self.http, &endpoint).await
    }

    /// Return an endpoint that answers, switching ports if needed.
    ///
    /// The first attempt checks the current endpoint. Every failed attempt
    /// except the last waits for the policy delay, scans the port window and,
    /// if a backend answers there, moves the candidate to that port.
    ///
    /// # Errors
    ///
    /// Returns [`Unreachable`] once every attempt has failed.
    #[instrument(skip(self))]
    pub async fn resolve(&self) -> Result<ApiEndpoint, Unreachable> {
        let current = self.current().await;
        let mut candidate = current.clone();

        for attempt in 1..=self.retry.max_attempts {
            if check_server_connection(&self.http, &candidate).await {
                if candidate != current {
                    info!(from = %current, to = %candidate, "Switched backend endpoint");
                    *self.current.write().await = candidate.clone();
                }
                return Ok(candidate);
            }

            warn!(
                attempt,
                max_attempts = self.retry.max_attempts,
                endpoint = %candidate,
                "Backend not reachable"
            );

            if attempt < self.retry.max_attempts {
                tokio::time::sleep(self.retry.delay_after(attempt)).await;

                if let Some(port) = get_available_port(&self.http, &candidate, self.scan).await
                    && let Some(moved) = candidate.with_port(port)
                {
                    candidate = moved;
                }
            }
        }

        Err(Unreachable {
            attempts: self.retry.max_attempts,
            last_tried: candidate.to_string(),
        })
    }
}
