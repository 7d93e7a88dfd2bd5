//! GET /v1/health — process liveness, independent of any check's
//! outcome (a daemon with every check failing is still "healthy" in
//! the sense that it's running and reachable).

use axum::response::{IntoResponse, Json};

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
