use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::{
    models::{
        challenge::{is_unlocked, CHALLENGES},
        ChallengeStatus, Difficulty, NumberRange, QuestionPrompt,
    },
    services::{question_generator, AppState},
};

const MAX_TABLE: u32 = 20;

#[derive(Debug, Deserialize)]
pub struct QuestionQuery {
    /// Defaults to the player's stored difficulty.
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub division: bool,
    #[serde(default)]
    pub choices: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct TableQuery {
    pub difficulty: Option<Difficulty>,
}

/// GET /api/v1/questions
pub async fn get_question(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuestionQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let difficulty = query
        .difficulty
        .unwrap_or_else(|| state.progress.difficulty());
    let range = question_generator::range(difficulty);

    let mut rng = rand::rng();
    let question = if query.choices {
        question_generator::multiple_choice(&mut rng, range, query.division)
    } else {
        question_generator::generate(&mut rng, range, query.division)
    };

    // Standalone questions are checked by the client, so the answer goes along.
    Ok((
        StatusCode::OK,
        Json(json!({
            "question": QuestionPrompt::from(&question),
            "correct_answer": question.correct_answer,
            "difficulty": difficulty,
        })),
    ))
}

/// GET /api/v1/tables/{table}
pub async fn get_table(
    State(state): State<Arc<AppState>>,
    Path(table): Path<u32>,
    Query(query): Query<TableQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if !NumberRange::new(1, MAX_TABLE).contains(table) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Table must be between 1 and {}", MAX_TABLE),
        ));
    }

    let difficulty = query
        .difficulty
        .unwrap_or_else(|| state.progress.difficulty());
    let facts = question_generator::table_facts(table, difficulty.range());

    Ok((
        StatusCode::OK,
        Json(json!({
            "table": table,
            "difficulty": difficulty,
            "facts": facts,
        })),
    ))
}

/// GET /api/v1/challenges
pub async fn list_challenges(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let progress = state.progress.snapshot();

    let challenges: Vec<ChallengeStatus> = CHALLENGES
        .iter()
        .map(|challenge| ChallengeStatus {
            challenge: *challenge,
            unlocked: is_unlocked(challenge.id, |badge| progress.has_badge(badge)),
            completed: progress.has_badge(&challenge.badge_id()),
        })
        .collect();

    Ok((StatusCode::OK, Json(challenges)))
}
