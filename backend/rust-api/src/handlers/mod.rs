use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::metrics;
use crate::services::session_service::SessionError;
use crate::services::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // Probe the store with a read; a missing key still counts as healthy.
    let (status, storage) = match state.store.get("health-probe") {
        Ok(_) => ("healthy", json!({ "backend": state.store.backend(), "status": "healthy" })),
        Err(e) => (
            "degraded",
            json!({
                "backend": state.store.backend(),
                "status": "unhealthy",
                "error": e.to_string()
            }),
        ),
    };

    let status_code = if status == "healthy" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(json!({
            "status": status,
            "service": "timestables-api",
            "version": env!("CARGO_PKG_VERSION"),
            "dependencies": { "storage": storage }
        })),
    )
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render metrics: {}", e),
        ),
    }
}

/// Maps session failures onto HTTP status codes.
pub(crate) fn session_error(e: SessionError) -> (StatusCode, String) {
    let status = match &e {
        SessionError::NotFound(_) | SessionError::CardNotFound(_) => StatusCode::NOT_FOUND,
        SessionError::UnknownChallenge(_) => StatusCode::NOT_FOUND,
        SessionError::ChallengeLocked(_) => StatusCode::FORBIDDEN,
        SessionError::InvalidState { .. }
        | SessionError::NoQuestion
        | SessionError::StreamAttached(_) => StatusCode::CONFLICT,
        SessionError::WrongMode(_) | SessionError::MissingChallenge | SessionError::NotTimed => {
            StatusCode::BAD_REQUEST
        }
    };

    if status == StatusCode::NOT_FOUND {
        tracing::debug!("{}", e);
    } else {
        tracing::warn!("Session request rejected: {}", e);
    }

    (status, e.to_string())
}

pub mod dashboard;
pub mod preferences;
pub mod progress;
pub mod questions;
pub mod sessions;
pub mod sse;
