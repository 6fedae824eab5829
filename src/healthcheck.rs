//! Client side of the `healthcheck` subcommand used by container probes.

use std::time::Duration;

use thiserror::Error;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum HealthcheckError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Unhealthy {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Probe `GET /v1/health` on the loopback interface.
pub async fn healthcheck_with_port(port: u16) -> Result<(), HealthcheckError> {
    let client = reqwest::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()
        .map_err(HealthcheckError::Client)?;

    let url = format!("http://127.0.0.1:{port}/v1/health");
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|source| HealthcheckError::Request {
            url: url.clone(),
            source,
        })?;

    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(HealthcheckError::Unhealthy { url, status })
    }
}
