use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    extractors::{AppJson, ValidatedJson},
    models::{
        answer::SubmitAnswerRequest, memory::FlipCardRequest, CreateSessionRequest, TickRequest,
    },
    services::AppState,
};

use super::session_error;

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateSessionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!(
        "Creating session: mode={}, division={}",
        req.mode,
        req.allow_division
    );

    let view = state.sessions.create(&req).map_err(session_error)?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let view = state.sessions.get(session_id).map_err(session_error)?;
    Ok((StatusCode::OK, Json(view)))
}

pub async fn start_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!("Starting session: {}", session_id);

    let view = state.sessions.start(session_id).map_err(session_error)?;
    Ok((StatusCode::OK, Json(view)))
}

pub async fn abandon_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state.sessions.abandon(session_id).map_err(session_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    AppJson(req): AppJson<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::debug!("Submitting answer for session: {}", session_id);

    let response = state
        .sessions
        .submit_answer(session_id, &req.answer)
        .map_err(session_error)?;
    Ok((StatusCode::OK, Json(response)))
}

pub async fn flip_card(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    AppJson(req): AppJson<FlipCardRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let response = state
        .sessions
        .flip_card(session_id, req.card_id)
        .map_err(session_error)?;
    Ok((StatusCode::OK, Json(response)))
}

/// POST /api/v1/sessions/{id}/tick
///
/// The body is optional; without one the countdown advances by one second.
pub async fn tick_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    body: Bytes,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let req: TickRequest = if body.is_empty() {
        TickRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid JSON: {}", e)))?
    };

    let response = state
        .sessions
        .tick(session_id, req.seconds.unwrap_or(1))
        .map_err(session_error)?;
    Ok((StatusCode::OK, Json(response)))
}
