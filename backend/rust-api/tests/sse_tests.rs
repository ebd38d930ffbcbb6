use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

mod common;

use common::{get, post, start_session};

#[tokio::test]
async fn test_stream_counts_down_and_expires_session() {
    let app = common::create_test_app();
    let id = start_session(&app, json!({ "mode": "speed" })).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/sessions/{}/stream", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-trace-id"));
    assert_eq!(
        response.headers()["content-type"],
        "text/event-stream"
    );

    // The stream ends on its own once the countdown reaches zero.
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8_lossy(&body);

    assert_eq!(text.matches("event: timer-tick").count(), 60);
    assert_eq!(text.matches("event: time-expired").count(), 1);
    assert!(text.contains("\"remaining_seconds\":60"));

    let (_, session) = get(&app, &format!("/api/v1/sessions/{}", id)).await;
    assert_eq!(session["status"], "complete");
    assert_eq!(session["seconds_remaining"], 0);
}

#[tokio::test]
async fn test_stream_requires_timed_active_session() {
    let app = common::create_test_app();

    let quiz = start_session(&app, json!({ "mode": "quiz" })).await;
    let (status, _) = get(&app, &format!("/api/v1/sessions/{}/stream", quiz)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, idle) = post(&app, "/api/v1/sessions", json!({ "mode": "speed" })).await;
    let idle = idle["id"].as_str().unwrap();
    let (status, _) = get(&app, &format!("/api/v1/sessions/{}/stream", idle)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = get(
        &app,
        "/api/v1/sessions/550e8400-e29b-41d4-a716-446655440000/stream",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_second_stream_and_manual_ticks_conflict() {
    let app = common::create_test_app();
    let id = start_session(&app, json!({ "mode": "speed" })).await;
    let stream_uri = format!("/api/v1/sessions/{}/stream", id);

    let first = app
        .clone()
        .oneshot(Request::builder().uri(&stream_uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let (status, _) = get(&app, &stream_uri).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = post(
        &app,
        &format!("/api/v1/sessions/{}/tick", id),
        json!({ "seconds": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Dropping the open stream hands the countdown back.
    drop(first);

    let (status, tick) = post(
        &app,
        &format!("/api/v1/sessions/{}/tick", id),
        json!({ "seconds": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tick["seconds_remaining"], 55);
}
