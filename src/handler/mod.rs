pub mod drivers;
pub mod events;
pub mod health;
pub mod model;
pub mod recommend;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::AffinityError;

/// JSON error body with a status derived from the error kind.
pub(crate) fn error_response(error: &AffinityError) -> Response {
    let status = match error {
        AffinityError::TrainingInProgress => StatusCode::CONFLICT,
        AffinityError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}
