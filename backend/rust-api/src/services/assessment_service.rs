use std::collections::BTreeMap;

use crate::models::assessment::{AnsweredQuestion, AssessmentReport, TablePerformance};

const STRENGTH_THRESHOLD: f64 = 0.8;
const WEAKNESS_THRESHOLD: f64 = 0.5;
const SLOW_ANSWER_SECONDS: f64 = 10.0;

pub fn build_report(answers: &[AnsweredQuestion]) -> AssessmentReport {
    let total = answers.len() as u32;
    let score = answers.iter().filter(|a| a.correct).count() as u32;
    let total_seconds: f64 = answers.iter().map(|a| a.seconds).sum();
    let average_seconds = if total == 0 {
        0.0
    } else {
        total_seconds / total as f64
    };
    let accuracy = if total == 0 {
        0.0
    } else {
        score as f64 / total as f64
    };

    let mut per_table: BTreeMap<u32, TablePerformance> = BTreeMap::new();
    for answer in answers {
        let entry = per_table.entry(answer.table).or_default();
        entry.total += 1;
        if answer.correct {
            entry.correct += 1;
        }
    }

    let strengths: Vec<u32> = per_table
        .iter()
        .filter(|(_, p)| p.accuracy() >= STRENGTH_THRESHOLD)
        .map(|(table, _)| *table)
        .collect();
    let weaknesses: Vec<u32> = per_table
        .iter()
        .filter(|(_, p)| p.accuracy() < WEAKNESS_THRESHOLD)
        .map(|(table, _)| *table)
        .collect();

    let mut recommendations = Vec::new();
    if accuracy >= 0.9 {
        recommendations.push("Excellent work! You're ready for the next difficulty level.".to_string());
    } else if accuracy >= 0.7 {
        recommendations.push("Good progress! Focus on the weaker tables for improvement.".to_string());
    } else {
        recommendations.push("Keep practicing! Spend more time in Learning Mode.".to_string());
    }
    if average_seconds > SLOW_ANSWER_SECONDS {
        recommendations.push("Try the Speed Challenge to improve your response time.".to_string());
    }
    if !weaknesses.is_empty() {
        let tables: Vec<String> = weaknesses.iter().map(|t| t.to_string()).collect();
        recommendations.push(format!(
            "Focus extra practice on tables: {}",
            tables.join(", ")
        ));
    }

    AssessmentReport {
        score,
        total_questions: total,
        accuracy: accuracy * 100.0,
        average_seconds,
        per_table,
        strengths,
        weaknesses,
        recommendations,
    }
}
