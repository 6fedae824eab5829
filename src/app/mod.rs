pub mod router;
pub mod server;
pub mod state;
pub mod tracing;

use crate::config;
use crate::error::AffinityError;
use ::tracing::{info, instrument};
use tokio_util::sync::CancellationToken;

const SERVICE_NAME: &str = "lane-affinity";

/// Application entry point.
///
/// `healthcheck` probes a running instance, `train` runs one training pass
/// against postgres and exits, anything else starts the HTTP server.
pub async fn run() -> Result<(), AffinityError> {
    let command = std::env::args().nth(1);

    // Handle healthcheck subcommand (for Docker healthcheck in distroless image)
    if command.as_deref() == Some("healthcheck") {
        let port = config::get_http_port()?;
        if let Err(e) = crate::healthcheck_with_port(port).await {
            eprintln!("Healthcheck failed: {e}");
            std::process::exit(1);
        }
        return Ok(());
    }

    let settings = config::get_configuration()?;
    tracing::init_tracing(settings.log_format);

    dispatch(command.as_deref(), settings).await
}

#[instrument(skip_all, fields(service = SERVICE_NAME))]
async fn dispatch(command: Option<&str>, settings: config::Settings) -> Result<(), AffinityError> {
    info!(backend = ?settings.store_backend, "Loaded settings");
    let http_port = settings.http_port;

    if command == Some("train") {
        settings.require_persistent_store("train")?;
        let app_state = state::AppState::from_settings(settings).await?;
        let summary = app_state.trainer.train().await?;
        info!(
            record_count = summary.record_count,
            lane_count = summary.lane_count,
            "Training run finished"
        );
        return Ok(());
    }

    let app_state = state::AppState::from_settings(settings).await?;
    let app = router::router(app_state);
    server::serve(app, http_port, CancellationToken::new()).await
}
