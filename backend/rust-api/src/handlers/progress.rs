use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::{
    extractors::{AppJson, ValidatedJson},
    models::answer::{
        AddBadgeRequest, RecordAttemptRequest, ResetProgressRequest, SetDifficultyRequest,
    },
    services::AppState,
};

/// GET /api/v1/progress
pub async fn get_progress(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let progress = state.progress.snapshot();
    Ok((StatusCode::OK, Json(json!(progress.view()))))
}

/// POST /api/v1/progress/attempts
pub async fn record_attempt(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RecordAttemptRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!(
        "Recording attempt: table={}, correct={}, points={}",
        req.table,
        req.correct,
        req.points
    );

    let progress = state
        .progress
        .record_attempt(req.correct, req.table, req.points);
    Ok((StatusCode::OK, Json(json!(progress.view()))))
}

/// POST /api/v1/progress/badges
pub async fn add_badge(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<AddBadgeRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let added = state.progress.add_badge(req.id.trim());
    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(json!({
            "badge": req.id.trim(),
            "added": added,
            "badges": state.progress.snapshot().badges,
        })),
    ))
}

/// PUT /api/v1/progress/difficulty
pub async fn set_difficulty(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SetDifficultyRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let progress = state.progress.set_difficulty(req.difficulty);
    Ok((StatusCode::OK, Json(json!(progress.view()))))
}

/// POST /api/v1/progress/reset
pub async fn reset_progress(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ResetProgressRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if !req.confirm {
        return Err((
            StatusCode::BAD_REQUEST,
            "Resetting progress requires \"confirm\": true".to_string(),
        ));
    }

    tracing::warn!("Player progress reset requested");
    let progress = state.progress.reset();
    Ok((StatusCode::OK, Json(json!(progress.view()))))
}
