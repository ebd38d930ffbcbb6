#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use timestables_api::{
    config::Config,
    create_router,
    services::{feedback::SilentFeedback, storage::MemoryStore, AppState},
};
use tower::ServiceExt;

pub const TEST_SEED: u64 = 2024;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Router over a fresh in-memory store with seeded sessions.
pub fn create_test_app() -> Router {
    create_test_app_with(test_config())
}

pub fn create_test_app_with(config: Config) -> Router {
    init_tracing();

    let app_state = Arc::new(AppState::with_store(
        config,
        Arc::new(MemoryStore::new()),
        Arc::new(SilentFeedback),
    ));

    create_router(app_state)
}

pub fn test_config() -> Config {
    Config {
        rng_seed: Some(TEST_SEED),
        sse_tick_interval_ms: 10,
        ..Config::in_memory()
    }
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body)).await
}

/// Creates and starts a session, returning its id.
pub async fn start_session(app: &Router, body: Value) -> String {
    let (status, created) = post(app, "/api/v1/sessions", body).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", created);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, started) = send(app, "POST", &format!("/api/v1/sessions/{}/start", id), None).await;
    assert_eq!(status, StatusCode::OK, "start failed: {}", started);
    assert_eq!(started["status"], "active");
    id
}

/// Reads the pending question and derives its answer from the operands.
pub async fn current_answer(app: &Router, id: &str) -> u64 {
    let (_, session) = get(app, &format!("/api/v1/sessions/{}", id)).await;
    let question = &session["current_question"];
    let a = question["operand_a"].as_u64().unwrap();
    let b = question["operand_b"].as_u64().unwrap();
    if question["is_division"].as_bool().unwrap() {
        a / b
    } else {
        a * b
    }
}

pub async fn answer(app: &Router, id: &str, answer: u64) -> Value {
    let (status, body) = post(
        app,
        &format!("/api/v1/sessions/{}/answers", id),
        serde_json::json!({ "answer": answer.to_string() }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "answer failed: {}", body);
    body
}
