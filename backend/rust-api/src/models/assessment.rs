use serde::Serialize;
use std::collections::BTreeMap;

/// Result of one assessment question, kept until the report is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnsweredQuestion {
    pub table: u32,
    pub correct: bool,
    pub seconds: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TablePerformance {
    pub correct: u32,
    pub total: u32,
}

impl TablePerformance {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentReport {
    pub score: u32,
    pub total_questions: u32,
    pub accuracy: f64,
    pub average_seconds: f64,
    pub per_table: BTreeMap<u32, TablePerformance>,
    pub strengths: Vec<u32>,
    pub weaknesses: Vec<u32>,
    pub recommendations: Vec<String>,
}
