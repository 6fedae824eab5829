use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::app::state::AppState;
use crate::error::AffinityError;
use crate::handler::error_response;
use crate::report::{DEFAULT_MIN_LANE_EVENTS, lane_report};

/// Handler for POST /v1/model/train
pub async fn train_handler(State(state): State<AppState>) -> Response {
    info!("Training run requested");
    match state.trainer.train().await {
        Ok(summary) => Json(summary).into_response(),
        Err(AffinityError::TrainingInProgress) => {
            warn!("Rejected training request while another run is active");
            error_response(&AffinityError::TrainingInProgress)
        }
        Err(e) => {
            error!("Training run failed: {e}");
            error_response(&e)
        }
    }
}

/// Handler for GET /v1/model
pub async fn model_info_handler(State(state): State<AppState>) -> Response {
    match state.store.snapshot_info().await {
        Ok(info) => Json(info).into_response(),
        Err(e) => {
            error!("Failed to read snapshot info: {e}");
            error_response(&e)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LaneReportParams {
    pub min_events: Option<u64>,
}

/// Handler for GET /v1/model/lanes
pub async fn lane_report_handler(
    State(state): State<AppState>,
    Query(params): Query<LaneReportParams>,
) -> Response {
    let min_events = params.min_events.unwrap_or(DEFAULT_MIN_LANE_EVENTS);
    match state.store.all_records().await {
        Ok(records) => Json(lane_report(&records, min_events)).into_response(),
        Err(e) => {
            error!("Failed to build lane report: {e}");
            error_response(&e)
        }
    }
}
