use axum::http::StatusCode;
use serde_json::json;

mod common;

use common::{get, post, send};

#[tokio::test]
async fn test_fresh_progress_has_defaults() {
    let app = common::create_test_app();

    let (status, progress) = get(&app, "/api/v1/progress").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["totalAttempted"], 0);
    assert_eq!(progress["level"], 1);
    assert_eq!(progress["difficultyLevel"], "beginner");
    assert_eq!(progress["badges"], json!([]));
}

#[tokio::test]
async fn test_record_attempts_updates_counters() {
    let app = common::create_test_app();

    for (correct, points) in [(true, 10), (true, 10), (false, 0)] {
        let (status, _) = post(
            &app,
            "/api/v1/progress/attempts",
            json!({ "correct": correct, "table": 4, "points": points }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, progress) = get(&app, "/api/v1/progress").await;
    assert_eq!(progress["totalAttempted"], 3);
    assert_eq!(progress["totalCorrect"], 2);
    assert_eq!(progress["currentStreak"], 0);
    assert_eq!(progress["bestStreak"], 2);
    assert_eq!(progress["pointsEarned"], 20);
    assert_eq!(progress["completedTables"], json!([4]));
}

#[tokio::test]
async fn test_record_attempt_rejects_out_of_range_table() {
    let app = common::create_test_app();

    let (status, body) = post(
        &app,
        "/api/v1/progress/attempts",
        json!({ "correct": true, "table": 21, "points": 10 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_malformed_json_returns_json_error() {
    let app = common::create_test_app();

    let (status, body) = post(&app, "/api/v1/progress/attempts", json!({ "table": "four" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Failed to parse JSON request body"));
}

#[tokio::test]
async fn test_add_badge_is_idempotent() {
    let app = common::create_test_app();

    let (status, first) = post(&app, "/api/v1/progress/badges", json!({ "id": "first-steps" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["added"], true);

    let (status, second) = post(&app, "/api/v1/progress/badges", json!({ "id": "first-steps" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["added"], false);
    assert_eq!(second["badges"], json!(["first-steps"]));
}

#[tokio::test]
async fn test_set_difficulty_only_changes_difficulty() {
    let app = common::create_test_app();
    post(
        &app,
        "/api/v1/progress/attempts",
        json!({ "correct": true, "table": 3, "points": 10 }),
    )
    .await;

    let (status, progress) = send(
        &app,
        "PUT",
        "/api/v1/progress/difficulty",
        Some(json!({ "difficulty": "advanced" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["difficultyLevel"], "advanced");
    assert_eq!(progress["pointsEarned"], 10);
}

#[tokio::test]
async fn test_reset_requires_confirmation() {
    let app = common::create_test_app();
    post(
        &app,
        "/api/v1/progress/attempts",
        json!({ "correct": true, "table": 3, "points": 1500 }),
    )
    .await;

    let (status, _) = post(&app, "/api/v1/progress/reset", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, progress) = get(&app, "/api/v1/progress").await;
    assert_eq!(progress["level"], 2);

    let (status, progress) = post(&app, "/api/v1/progress/reset", json!({ "confirm": true })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["pointsEarned"], 0);
    assert_eq!(progress["level"], 1);
}

#[tokio::test]
async fn test_question_endpoint_respects_options() {
    let app = common::create_test_app();

    let (status, body) = get(&app, "/api/v1/questions?difficulty=advanced&choices=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["difficulty"], "advanced");

    let options = body["question"]["options"].as_array().unwrap();
    assert_eq!(options.len(), 4);
    assert!(options.contains(&body["correct_answer"]));

    let (_, body) = get(&app, "/api/v1/questions").await;
    assert!(body["question"].get("options").is_none());
}

#[tokio::test]
async fn test_table_listing() {
    let app = common::create_test_app();

    let (status, body) = get(&app, "/api/v1/tables/7").await;
    assert_eq!(status, StatusCode::OK);

    let facts = body["facts"].as_array().unwrap();
    assert_eq!(facts.len(), 5);
    assert_eq!(facts[4], json!({ "multiplier": 5, "result": 35 }));

    let (status, _) = get(&app, "/api/v1/tables/0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_challenges_unlock_from_badges() {
    let app = common::create_test_app();

    let (_, challenges) = get(&app, "/api/v1/challenges").await;
    let challenges = challenges.as_array().unwrap();
    assert_eq!(challenges.len(), 5);
    assert_eq!(challenges[0]["unlocked"], true);
    assert_eq!(challenges[1]["unlocked"], false);

    post(&app, "/api/v1/progress/badges", json!({ "id": "level-1" })).await;

    let (_, challenges) = get(&app, "/api/v1/challenges").await;
    assert_eq!(challenges[0]["completed"], true);
    assert_eq!(challenges[1]["unlocked"], true);
    assert_eq!(challenges[2]["unlocked"], false);
}
