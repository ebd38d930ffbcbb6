use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

pub mod answer;
pub mod assessment;
pub mod challenge;
pub mod dashboard;
pub mod memory;
pub mod preferences;
pub mod progress;
pub mod question;
pub mod timer;

pub use challenge::{Challenge, ChallengeStatus};
pub use progress::{Difficulty, PlayerProgress, ProgressView};
pub use question::{NumberRange, Question, QuestionPrompt, TableFact};

use assessment::AssessmentReport;
use memory::CardView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Quiz,
    Speed,
    Levels,
    Memory,
    Assessment,
}

impl GameMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Quiz => "quiz",
            GameMode::Speed => "speed",
            GameMode::Levels => "levels",
            GameMode::Memory => "memory",
            GameMode::Assessment => "assessment",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Active,
    Complete,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Active => "active",
            SessionStatus::Complete => "complete",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionRequest {
    pub mode: GameMode,
    #[serde(default)]
    pub allow_division: bool,
    /// Levels mode only.
    pub challenge_id: Option<u8>,
    /// Memory mode only, defaults to 1.
    #[validate(range(
        min = 1,
        max = 4,
        message = "Memory level must be between 1 and 4"
    ))]
    pub memory_level: Option<u32>,
    /// Overrides the player's stored difficulty for this session.
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TickRequest {
    pub seconds: Option<u32>,
}

/// Client-facing state of a game session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: SessionDetails,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SessionDetails {
    Round(RoundView),
    Memory(MemoryView),
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundView {
    pub score: u32,
    pub answered: u32,
    pub correct: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub question_limit: Option<u32>,
    pub seconds_remaining: Option<u32>,
    pub time_limit_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<QuestionPrompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<Challenge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
    pub badges_awarded: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<AssessmentReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemoryView {
    pub level: u32,
    pub pairs: u32,
    pub moves: u32,
    pub matches: u32,
    pub score: u32,
    pub cards: Vec<CardView>,
    pub badges_awarded: Vec<String>,
}
