//! Read-only check state plus the operator-initiated `flush`.
//!
//! - `GET  /v1/checks`        — every check, with an aggregate status
//! - `GET  /v1/checks/:name`  — a single check by name
//! - `GET  /v1/history`       — the scheduler-wide outcome ring
//! - `POST /v1/flush`         — force every pending check to run now

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::checks::Status;
use crate::state::AppState;

fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// `ok` iff every check's last outcome is `ok`; a check that has never
/// run counts as `ok` (it hasn't failed yet).
fn overall_status(snapshots: &[crate::checks::CheckSnapshot]) -> Status {
    if snapshots.iter().all(|s| s.last_outcome.status.is_ok()) {
        Status::Ok
    } else {
        Status::Err
    }
}

pub async fn list_checks(State(state): State<AppState>) -> impl IntoResponse {
    let snapshots: Vec<_> = state.checks.iter().map(|c| c.snapshot()).collect();
    let overall = overall_status(&snapshots);
    Json(serde_json::json!({
        "checks": snapshots,
        "overall_status": overall,
    }))
}

pub async fn get_check(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.find_check(&name) {
        Some(check) => Json(check.snapshot()).into_response(),
        None => api_error(StatusCode::NOT_FOUND, format!("no such check: {name}")),
    }
}

pub async fn history(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.scheduler.global_history_snapshot())
}

pub async fn flush(State(state): State<AppState>) -> impl IntoResponse {
    state.scheduler.flush().await;
    Json(serde_json::json!({ "flushed": true }))
}
