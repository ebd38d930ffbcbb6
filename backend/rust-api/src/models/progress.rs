use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::question::NumberRange;

pub const POINTS_PER_LEVEL: u64 = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Numeric range the question generator draws tables from.
    pub fn range(self) -> NumberRange {
        match self {
            Difficulty::Beginner => NumberRange::new(1, 5),
            Difficulty::Intermediate => NumberRange::new(1, 12),
            Difficulty::Advanced => NumberRange::new(1, 20),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!("Unknown difficulty level: {}", other)),
        }
    }
}

/// Cumulative statistics for the single player of an installation.
///
/// The level is not a field: it is always derived from `points_earned`
/// (see [`PlayerProgress::level`]) so the two can never diverge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerProgress {
    pub total_correct: u32,
    pub total_attempted: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub points_earned: u64,
    pub badges: BTreeSet<String>,
    pub completed_tables: BTreeSet<u32>,
    pub difficulty_level: Difficulty,
}

impl PlayerProgress {
    pub fn level(&self) -> u32 {
        (self.points_earned / POINTS_PER_LEVEL + 1) as u32
    }

    /// Accuracy in percent, 0 when nothing was attempted yet.
    pub fn accuracy(&self) -> f64 {
        if self.total_attempted == 0 {
            return 0.0;
        }
        self.total_correct as f64 / self.total_attempted as f64 * 100.0
    }

    pub fn points_to_next_level(&self) -> u64 {
        POINTS_PER_LEVEL - self.points_earned % POINTS_PER_LEVEL
    }

    pub fn has_badge(&self, id: &str) -> bool {
        self.badges.contains(id)
    }

    /// Applies one answered question to the counters.
    pub fn apply_attempt(&mut self, correct: bool, table: u32, points_if_correct: u32) {
        self.total_attempted = self.total_attempted.saturating_add(1);

        if correct {
            self.total_correct = self.total_correct.saturating_add(1);
            self.current_streak = self.current_streak.saturating_add(1);
            self.points_earned = self.points_earned.saturating_add(points_if_correct as u64);
            self.best_streak = self.best_streak.max(self.current_streak);
            self.completed_tables.insert(table);
        } else {
            self.current_streak = 0;
        }
    }

    /// Returns true when the badge was not held before.
    pub fn insert_badge(&mut self, id: &str) -> bool {
        if self.badges.contains(id) {
            return false;
        }
        self.badges.insert(id.to_string())
    }

    /// A record read back from storage is only trusted when its counters agree.
    pub fn is_consistent(&self) -> bool {
        self.total_correct <= self.total_attempted && self.current_streak <= self.best_streak
    }

    pub fn view(&self) -> ProgressView<'_> {
        ProgressView {
            progress: self,
            level: self.level(),
            accuracy: self.accuracy(),
        }
    }
}

/// Serialized form handed to readers and written to storage: the record plus
/// its derived values.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView<'a> {
    #[serde(flatten)]
    pub progress: &'a PlayerProgress,
    pub level: u32,
    pub accuracy: f64,
}
