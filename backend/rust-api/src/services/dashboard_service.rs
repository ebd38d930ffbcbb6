use crate::models::dashboard::{DashboardReport, PerformanceLevel};
use crate::models::PlayerProgress;

pub fn performance_level(accuracy: f64) -> PerformanceLevel {
    if accuracy >= 90.0 {
        PerformanceLevel::Excellent
    } else if accuracy >= 75.0 {
        PerformanceLevel::Good
    } else if accuracy >= 60.0 {
        PerformanceLevel::Fair
    } else {
        PerformanceLevel::NeedsPractice
    }
}

pub fn recommendations(progress: &PlayerProgress) -> Vec<&'static str> {
    let mut recommendations = Vec::new();

    if progress.accuracy() < 70.0 {
        recommendations.push("Focus on learning mode to build foundation");
    }
    if progress.best_streak < 5 {
        recommendations.push("Practice consistently to improve focus");
    }
    if progress.completed_tables.len() < 5 {
        recommendations.push("Work on mastering basic tables (1-5) first");
    }
    if progress.badges.len() < 3 {
        recommendations.push("Play different game modes to earn badges");
    }
    if recommendations.is_empty() {
        recommendations.push("Great progress! Continue with current difficulty level");
    }

    recommendations
}

pub fn build_dashboard(progress: &PlayerProgress, player_name: Option<String>) -> DashboardReport<'_> {
    let performance = performance_level(progress.accuracy());
    DashboardReport {
        player_name,
        progress: progress.view(),
        performance,
        performance_description: performance.description(),
        points_to_next_level: progress.points_to_next_level(),
        recommendations: recommendations(progress),
    }
}
