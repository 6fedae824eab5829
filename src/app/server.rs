use crate::error::AffinityError;
use axum::Router;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Serve `app` until SIGINT/SIGTERM or until `shutdown_token` is cancelled.
pub async fn serve(
    app: Router,
    http_port: u16,
    shutdown_token: CancellationToken,
) -> Result<(), AffinityError> {
    let bind_addr = format!("0.0.0.0:{http_port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AffinityError::Bind {
            address: bind_addr.clone(),
            source: e,
        })?;
    info!("Server listening on {}", listener.local_addr()?);
    info!("  - GET  /v1/health              (health check)");
    info!("  - POST /v1/recommendations     (ranked drivers for a lane)");
    info!("  - POST /v1/model/train         (retrain affinity model)");
    info!("  - GET  /v1/model               (snapshot info)");
    info!("  - GET  /v1/model/lanes         (stable lane report)");
    info!("  - POST /v1/events/assignments  (completed assignment fact)");
    info!("  - POST /v1/events/votes        (feedback vote fact)");
    info!("  - PUT  /v1/drivers/{{id}}        (roster upsert)");

    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_token.cancelled_owned())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT (Ctrl+C) for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, initiating graceful shutdown"),
        () = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
