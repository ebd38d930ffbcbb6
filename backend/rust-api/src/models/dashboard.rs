use serde::Serialize;

use super::ProgressView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceLevel {
    Excellent,
    Good,
    Fair,
    NeedsPractice,
}

impl PerformanceLevel {
    pub fn description(self) -> &'static str {
        match self {
            PerformanceLevel::Excellent => "Outstanding performance!",
            PerformanceLevel::Good => "Solid understanding",
            PerformanceLevel::Fair => "Room for improvement",
            PerformanceLevel::NeedsPractice => "Requires more practice",
        }
    }
}

/// Parent-facing summary of the player's progress.
#[derive(Debug, Serialize)]
pub struct DashboardReport<'a> {
    pub player_name: Option<String>,
    pub progress: ProgressView<'a>,
    pub performance: PerformanceLevel,
    pub performance_description: &'static str,
    pub points_to_next_level: u64,
    pub recommendations: Vec<&'static str>,
}
