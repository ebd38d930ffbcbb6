use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::{
    extractors::ValidatedJson, models::preferences::UpdatePreferencesRequest, services::AppState,
};

/// GET /api/v1/preferences
pub async fn get_preferences(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    Ok((StatusCode::OK, Json(state.preferences.get())))
}

/// PUT /api/v1/preferences
pub async fn update_preferences(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<UpdatePreferencesRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req
        .player_name
        .as_deref()
        .is_some_and(|name| name.trim().is_empty())
    {
        return Err((
            StatusCode::BAD_REQUEST,
            "Player name must not be blank".to_string(),
        ));
    }

    let preferences = state.preferences.update(&req);
    Ok((StatusCode::OK, Json(preferences)))
}
