use crate::app::state::AppState;
use crate::handler::drivers::upsert_driver_handler;
use crate::handler::events::{record_assignment_handler, record_vote_handler};
use crate::handler::health::health_handler;
use crate::handler::model::{lane_report_handler, model_info_handler, train_handler};
use crate::handler::recommend::recommend_handler;
use axum::Router;
use axum::routing::{get, post, put};

/// Build the HTTP router (health, recommendations, model, ingestion).
pub fn router(state: AppState) -> Router {
    let v1_health_router = Router::new().route("/v1/health", get(health_handler));

    let v1_api_router = Router::new()
        .route("/v1/recommendations", post(recommend_handler))
        .route("/v1/model", get(model_info_handler))
        .route("/v1/model/train", post(train_handler))
        .route("/v1/model/lanes", get(lane_report_handler))
        .route("/v1/events/assignments", post(record_assignment_handler))
        .route("/v1/events/votes", post(record_vote_handler))
        .route("/v1/drivers/{driver_id}", put(upsert_driver_handler))
        .with_state(state);

    Router::new().merge(v1_health_router).merge(v1_api_router)
}
