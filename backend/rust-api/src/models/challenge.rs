use serde::Serialize;

use super::question::NumberRange;

/// One stage of the progressive levels mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Challenge {
    pub id: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub range: NumberRange,
    pub questions_count: u32,
    pub target_score: u32,
    pub time_limit_seconds: Option<u32>,
    pub reward: &'static str,
}

impl Challenge {
    pub fn badge_id(&self) -> String {
        challenge_badge(self.id)
    }
}

pub const FINAL_CHALLENGE_BADGE: &str = "ultimate-champion";

pub const CHALLENGES: [Challenge; 5] = [
    Challenge {
        id: 1,
        name: "First Steps",
        description: "Master the basics with tables 1-3",
        range: NumberRange::new(1, 3),
        questions_count: 10,
        target_score: 80,
        time_limit_seconds: None,
        reward: "Seedling Badge",
    },
    Challenge {
        id: 2,
        name: "Growing Stronger",
        description: "Tackle tables 1-5 with confidence",
        range: NumberRange::new(1, 5),
        questions_count: 12,
        target_score: 120,
        time_limit_seconds: None,
        reward: "Sprout Badge",
    },
    Challenge {
        id: 3,
        name: "Speed Burst",
        description: "Answer 15 questions in 90 seconds",
        range: NumberRange::new(1, 7),
        questions_count: 15,
        target_score: 150,
        time_limit_seconds: Some(90),
        reward: "Lightning Badge",
    },
    Challenge {
        id: 4,
        name: "Table Master",
        description: "Conquer tables 1-10 like a pro",
        range: NumberRange::new(1, 10),
        questions_count: 20,
        target_score: 200,
        time_limit_seconds: None,
        reward: "Master Badge",
    },
    Challenge {
        id: 5,
        name: "Ultimate Challenge",
        description: "Face the toughest problems",
        range: NumberRange::new(1, 20),
        questions_count: 25,
        target_score: 300,
        time_limit_seconds: Some(120),
        reward: "Champion Crown",
    },
];

pub fn challenge_badge(id: u8) -> String {
    format!("level-{}", id)
}

pub fn find_challenge(id: u8) -> Option<&'static Challenge> {
    CHALLENGES.iter().find(|c| c.id == id)
}

/// The first challenge is always open; every other one opens once the
/// previous challenge's badge is held.
pub fn is_unlocked(id: u8, has_badge: impl Fn(&str) -> bool) -> bool {
    id <= 1 || has_badge(&challenge_badge(id - 1))
}

/// Challenge listing entry with the player's unlock state.
#[derive(Debug, Clone, Serialize)]
pub struct ChallengeStatus {
    #[serde(flatten)]
    pub challenge: Challenge,
    pub unlocked: bool,
    pub completed: bool,
}
