use serde::{Deserialize, Serialize};
use validator::Validate;

use super::memory::FlipOutcome;
use super::{QuestionPrompt, SessionStatus};

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    /// Raw text as typed or picked by the player; non-numeric input is ignored.
    pub answer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitAnswerResponse {
    /// False when the answer could not be read as a number.
    pub accepted: bool,
    pub correct: bool,
    pub points_awarded: u32,
    pub correct_answer: Option<u32>,
    pub session_score: u32,
    pub current_streak: u32,
    pub status: SessionStatus,
    pub badges_awarded: Vec<String>,
    pub next_question: Option<QuestionPrompt>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlipCardResponse {
    #[serde(flatten)]
    pub outcome: FlipOutcome,
    pub status: SessionStatus,
    pub moves: u32,
    pub matches: u32,
    pub score: u32,
    pub badges_awarded: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickResponse {
    pub seconds_remaining: u32,
    pub status: SessionStatus,
    pub score: u32,
    pub passed: Option<bool>,
    pub badges_awarded: Vec<String>,
}

/// One answered question, as forwarded to the progress store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    pub correct: bool,
    pub table: u32,
    pub points: u32,
}

/// Direct attempt recording (learning mode and external activities).
#[derive(Debug, Deserialize, Validate)]
pub struct RecordAttemptRequest {
    pub correct: bool,

    #[validate(range(min = 1, max = 20, message = "Table must be between 1 and 20"))]
    pub table: u32,

    #[serde(default)]
    #[validate(range(max = 10000, message = "Points must not exceed 10000"))]
    pub points: u32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddBadgeRequest {
    #[validate(length(min = 1, max = 64, message = "Badge id must be between 1 and 64 characters"))]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct SetDifficultyRequest {
    pub difficulty: super::Difficulty,
}

#[derive(Debug, Deserialize)]
pub struct ResetProgressRequest {
    #[serde(default)]
    pub confirm: bool,
}
