use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{error, info};

use crate::app::state::AppState;
use crate::handler::error_response;

#[derive(Debug, Deserialize)]
pub struct UpsertDriverRequest {
    pub active: bool,
}

/// Handler for PUT /v1/drivers/{driver_id}
pub async fn upsert_driver_handler(
    State(state): State<AppState>,
    Path(driver_id): Path<String>,
    Json(request): Json<UpsertDriverRequest>,
) -> Response {
    match state
        .roster
        .upsert_driver(driver_id.clone(), request.active)
        .await
    {
        Ok(()) => {
            info!(driver_id = %driver_id, active = request.active, "Updated roster entry");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!("Failed to update roster entry for {driver_id}: {e}");
            error_response(&e)
        }
    }
}
