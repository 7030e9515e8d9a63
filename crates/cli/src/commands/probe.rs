//! Backend reachability checks.

use kasir_web::api::{ApiEndpoint, KasirApi, probe};
use kasir_web::config::ApiConfig;
use tracing::info;

/// Resolve a reachable backend the way the web front-end does.
///
/// With `scan_only`, skip the retry policy and report the first port in the
/// scan window that answers.
///
/// # Errors
///
/// Returns an error if no backend answers.
pub async fn run(config: &ApiConfig, scan_only: bool) -> Result<(), Box<dyn std::error::Error>> {
    if scan_only {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let endpoint = ApiEndpoint::new(config.base_url.clone());

        info!(
            host = %endpoint,
            start = config.scan.start_port,
            span = config.scan.span,
            "Scanning ports"
        );

        let port = probe::get_available_port(&http, &endpoint, config.scan)
            .await
            .ok_or("No backend answered in the scan window")?;
        info!(port, "Backend found");
        return Ok(());
    }

    let api = KasirApi::new(config)?;
    let endpoint = api.resolver().resolve().await?;

    if endpoint.url() == &config.base_url {
        info!(endpoint = %endpoint, "Backend reachable");
    } else {
        info!(
            configured = %config.base_url,
            endpoint = %endpoint,
            "Backend reachable on another port"
        );
    }
    Ok(())
}
