//! Reachability probes for the mock backend.
//!
//! Both probes issue `GET /categories`, the cheapest collection the backend
//! serves, and treat any 2xx answer as "alive". Neither ever fails: transport
//! errors simply mean "not here".

use tracing::{debug, instrument};

use crate::config::PortScan;

use super::resolver::ApiEndpoint;

const PROBE_PATH: &str = "categories";

/// Check whether the backend at `endpoint` answers.
#[instrument(skip(http), fields(endpoint = %endpoint))]
pub async fn check_server_connection(http: &reqwest::Client, endpoint: &ApiEndpoint) -> bool {
    match http.get(endpoint.collection(PROBE_PATH)).send().await {
        Ok(response) => {
            let ok = response.status().is_success();
            debug!(status = %response.status(), ok, "Probe answered");
            ok
        }
        Err(e) => {
            debug!(error = %e, "Probe failed");
            false
        }
    }
}

/// Find the first port in `scan` where a backend answers on `endpoint`'s
/// host.
///
/// Ports are tried one after another, never concurrently.
#[instrument(skip(http), fields(endpoint = %endpoint, start = scan.start_port, span = scan.span))]
pub async fn get_available_port(
    http: &reqwest::Client,
    endpoint: &ApiEndpoint,
    scan: PortScan,
) -> Option<u16> {
    for port in scan.ports() {
        let Some(candidate) = endpoint.with_port(port) else {
            continue;
        };
        if check_server_connection(http, &candidate).await {
            debug!(port, "Found backend");
            return Some(port);
        }
    }
    None
}
