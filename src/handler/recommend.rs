use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{error, info};

use crate::app::state::AppState;
use crate::handler::error_response;
use crate::resolver::RecommendationQuery;

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Handler for POST /v1/recommendations
///
/// Always answers with a list; lanes without training data get roster
/// fallback entries.
pub async fn recommend_handler(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Response {
    let query = RecommendationQuery {
        limit: state.settings.effective_limit(request.limit),
        origin: request.origin,
        destination: request.destination,
    };

    match state.resolver.recommend(&query).await {
        Ok(recommendations) => {
            info!(
                limit = query.limit,
                returned = recommendations.len(),
                "Served recommendations"
            );
            Json(recommendations).into_response()
        }
        Err(e) => {
            error!("Failed to resolve recommendations: {e}");
            error_response(&e)
        }
    }
}
