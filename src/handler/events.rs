use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, info};

use crate::app::state::AppState;
use crate::domain::{AssignmentFact, VoteFact};
use crate::error::AffinityError;
use crate::handler::error_response;

fn require(field: &str, value: Option<&String>) -> Result<(), AffinityError> {
    match value.map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(()),
        _ => Err(AffinityError::InvalidRequest(format!("{field} is required"))),
    }
}

fn validate_refs(load_id: Option<&String>, driver_id: Option<&String>) -> Result<(), AffinityError> {
    require("load_id", load_id)?;
    require("driver_id", driver_id)
}

/// Handler for POST /v1/events/assignments
pub async fn record_assignment_handler(
    State(state): State<AppState>,
    Json(fact): Json<AssignmentFact>,
) -> Response {
    if let Err(e) = validate_refs(fact.load_id.as_ref(), fact.driver_id.as_ref()) {
        return error_response(&e);
    }

    match state.outcome_log.record_assignment(fact).await {
        Ok(()) => {
            info!("Recorded completed assignment");
            StatusCode::ACCEPTED.into_response()
        }
        Err(e) => {
            error!("Failed to record assignment: {e}");
            error_response(&e)
        }
    }
}

/// Handler for POST /v1/events/votes
pub async fn record_vote_handler(
    State(state): State<AppState>,
    Json(fact): Json<VoteFact>,
) -> Response {
    if let Err(e) = validate_refs(fact.load_id.as_ref(), fact.driver_id.as_ref()) {
        return error_response(&e);
    }

    match state.outcome_log.record_vote(fact).await {
        Ok(()) => {
            info!("Recorded feedback vote");
            StatusCode::ACCEPTED.into_response()
        }
        Err(e) => {
            error!("Failed to record vote: {e}");
            error_response(&e)
        }
    }
}
