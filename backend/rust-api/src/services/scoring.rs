use crate::models::challenge::{Challenge, FINAL_CHALLENGE_BADGE};
use crate::models::{GameMode, Question};

pub const BASE_POINTS: u32 = 10;
pub const QUIZ_STREAK_MULTIPLIER: u32 = 5;
pub const SPEED_STREAK_MULTIPLIER: u32 = 2;
pub const QUIZ_QUESTION_COUNT: u32 = 20;
pub const SPEED_TIME_LIMIT_SECONDS: u32 = 60;

const MEMORY_MATCH_POINTS: u32 = 50;
const MEMORY_MOVE_PENALTY: u32 = 2;
const MEMORY_MIN_POINTS: u32 = 10;

/// Point formula of a game mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringRules {
    pub base_points: u32,
    /// Bonus per answer already in the current streak; 0 disables it.
    pub streak_multiplier: u32,
    /// Adds `floor(seconds_remaining / 10)` when a timer is running.
    pub time_bonus: bool,
}

impl ScoringRules {
    pub const QUIZ: ScoringRules = ScoringRules {
        base_points: BASE_POINTS,
        streak_multiplier: QUIZ_STREAK_MULTIPLIER,
        time_bonus: false,
    };

    pub const SPEED: ScoringRules = ScoringRules {
        base_points: BASE_POINTS,
        streak_multiplier: SPEED_STREAK_MULTIPLIER,
        time_bonus: true,
    };

    pub const LEVELS: ScoringRules = ScoringRules {
        base_points: BASE_POINTS,
        streak_multiplier: 0,
        time_bonus: true,
    };

    pub const ASSESSMENT: ScoringRules = ScoringRules {
        base_points: BASE_POINTS,
        streak_multiplier: 0,
        time_bonus: false,
    };

    pub fn for_mode(mode: GameMode) -> ScoringRules {
        match mode {
            GameMode::Quiz => Self::QUIZ,
            GameMode::Speed => Self::SPEED,
            GameMode::Levels => Self::LEVELS,
            GameMode::Memory | GameMode::Assessment => Self::ASSESSMENT,
        }
    }

    /// Points for a correct answer given the streak before it.
    pub fn points(&self, streak_before: u32, seconds_remaining: Option<u32>) -> u32 {
        let streak_bonus = streak_before.saturating_mul(self.streak_multiplier);
        let time_bonus = match (self.time_bonus, seconds_remaining) {
            (true, Some(seconds)) => time_bonus(seconds),
            _ => 0,
        };
        self.base_points + streak_bonus + time_bonus
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub is_correct: bool,
    pub points_awarded: u32,
}

pub fn evaluate(
    rules: &ScoringRules,
    question: &Question,
    user_answer: u32,
    streak_before: u32,
    seconds_remaining: Option<u32>,
) -> Evaluation {
    let is_correct = user_answer == question.correct_answer;
    Evaluation {
        is_correct,
        points_awarded: if is_correct {
            rules.points(streak_before, seconds_remaining)
        } else {
            0
        },
    }
}

/// Reads a typed answer. Anything that is not a non-negative integer is
/// rejected so the caller can ignore it.
pub fn parse_answer(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

pub fn time_bonus(seconds_remaining: u32) -> u32 {
    seconds_remaining / 10
}

/// Fewer moves before a match earn more points.
pub fn memory_match_points(moves_before: u32) -> u32 {
    MEMORY_MATCH_POINTS
        .saturating_sub(moves_before.saturating_mul(MEMORY_MOVE_PENALTY))
        .max(MEMORY_MIN_POINTS)
}

/// Quiz badges fire when the session streak reaches the threshold.
pub fn quiz_streak_badge(streak: u32) -> Option<&'static str> {
    match streak {
        5 => Some("5-streak"),
        10 => Some("10-streak"),
        _ => None,
    }
}

/// Speed badges are evaluated once, when the countdown runs out.
pub fn speed_badges(correct: u32, best_streak: u32) -> Vec<String> {
    let mut badges = Vec::new();
    if correct >= 15 {
        badges.push("speed-demon".to_string());
    }
    if correct >= 25 {
        badges.push("lightning-master".to_string());
    }
    if best_streak >= 10 {
        badges.push("streak-legend".to_string());
    }
    if best_streak >= 15 {
        badges.push("unstoppable".to_string());
    }
    badges
}

pub fn memory_badges(moves: u32, pairs: u32) -> Vec<String> {
    let mut badges = Vec::new();
    if moves <= pairs + 2 {
        badges.push("memory-master".to_string());
    }
    if moves <= pairs {
        badges.push("perfect-memory".to_string());
    }
    badges
}

pub fn challenge_passed(challenge: &Challenge, score: u32) -> bool {
    score >= challenge.target_score
}

pub fn challenge_badges(challenge: &Challenge) -> Vec<String> {
    let mut badges = vec![challenge.badge_id()];
    if challenge.id == 5 {
        badges.push(FINAL_CHALLENGE_BADGE.to_string());
    }
    badges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::challenge::CHALLENGES;

    fn question(answer: u32) -> Question {
        Question {
            operand_a: 6,
            operand_b: answer / 6,
            correct_answer: answer,
            is_division: false,
            table: 6,
            options: vec![],
        }
    }

    #[test]
    fn quiz_points_grow_with_streak() {
        let q = question(42);
        assert_eq!(evaluate(&ScoringRules::QUIZ, &q, 42, 0, None).points_awarded, 10);
        assert_eq!(evaluate(&ScoringRules::QUIZ, &q, 42, 3, None).points_awarded, 25);
    }

    #[test]
    fn wrong_answers_score_nothing() {
        let q = question(42);
        let evaluation = evaluate(&ScoringRules::SPEED, &q, 41, 9, Some(55));
        assert!(!evaluation.is_correct);
        assert_eq!(evaluation.points_awarded, 0);
    }

    #[test]
    fn speed_points_include_time_and_streak() {
        // 10 base + 55/10 time + 4*2 streak
        assert_eq!(ScoringRules::SPEED.points(4, Some(55)), 23);
        assert_eq!(ScoringRules::SPEED.points(0, Some(9)), 10);
    }

    #[test]
    fn levels_time_bonus_only_when_timed() {
        assert_eq!(ScoringRules::LEVELS.points(7, None), 10);
        assert_eq!(ScoringRules::LEVELS.points(7, Some(90)), 19);
    }

    #[test]
    fn parse_answer_rejects_non_numeric() {
        assert_eq!(parse_answer(" 42 "), Some(42));
        assert_eq!(parse_answer(""), None);
        assert_eq!(parse_answer("forty"), None);
        assert_eq!(parse_answer("-3"), None);
        assert_eq!(parse_answer("4.5"), None);
    }

    #[test]
    fn memory_points_have_a_floor() {
        assert_eq!(memory_match_points(0), 50);
        assert_eq!(memory_match_points(5), 40);
        assert_eq!(memory_match_points(20), 10);
        assert_eq!(memory_match_points(u32::MAX), 10);
    }

    #[test]
    fn badge_thresholds() {
        assert_eq!(quiz_streak_badge(5), Some("5-streak"));
        assert_eq!(quiz_streak_badge(6), None);
        assert_eq!(speed_badges(14, 9), Vec::<String>::new());
        assert_eq!(
            speed_badges(25, 15),
            vec!["speed-demon", "lightning-master", "streak-legend", "unstoppable"]
        );
        assert_eq!(memory_badges(5, 5), vec!["memory-master", "perfect-memory"]);
        assert_eq!(memory_badges(7, 5), vec!["memory-master"]);
        assert!(memory_badges(8, 5).is_empty());
    }

    #[test]
    fn final_challenge_awards_champion_badge() {
        assert_eq!(challenge_badges(&CHALLENGES[0]), vec!["level-1"]);
        assert_eq!(
            challenge_badges(&CHALLENGES[4]),
            vec!["level-5", "ultimate-champion"]
        );
        assert!(challenge_passed(&CHALLENGES[0], 80));
        assert!(!challenge_passed(&CHALLENGES[0], 79));
    }
}
