use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::services::{dashboard_service, AppState};

/// GET /api/v1/dashboard
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let progress = state.progress.snapshot();
    let player_name = state.preferences.get().player_name;

    let report = dashboard_service::build_dashboard(&progress, player_name);
    Ok((StatusCode::OK, Json(json!(report))))
}
