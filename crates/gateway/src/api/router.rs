use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api::{checks, health};
use crate::state::AppState;

pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(health::health))
        .route("/v1/checks", get(checks::list_checks))
        .route("/v1/checks/:name", get(checks::get_check))
        .route("/v1/history", get(checks::history))
        .route("/v1/flush", post(checks::flush))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
