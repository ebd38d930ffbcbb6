use rand::Rng;

use crate::models::answer::AttemptRecord;
use crate::models::memory::{FlipOutcome, MemoryCard, RevealedCard};
use crate::models::{MemoryView, NumberRange, SessionStatus};

use super::question_generator;
use super::scoring;
use super::session_service::SessionError;

const BASE_PAIRS: u32 = 4;
const MAX_PAIRS: u32 = 8;

pub fn pairs_for_level(level: u32) -> u32 {
    BASE_PAIRS.saturating_add(level).min(MAX_PAIRS)
}

#[derive(Debug)]
pub struct MemoryGame {
    level: u32,
    pairs: u32,
    range: NumberRange,
    status: SessionStatus,
    cards: Vec<MemoryCard>,
    first_pick: Option<usize>,
    moves: u32,
    matches: u32,
    score: u32,
    badges_awarded: Vec<String>,
}

/// Result of one flip as seen by the session layer.
#[derive(Debug, Clone, PartialEq)]
pub struct FlipStep {
    pub outcome: FlipOutcome,
    /// Set when the flip completed a two-card move.
    pub attempt: Option<AttemptRecord>,
    pub badges: Vec<String>,
}

impl MemoryGame {
    pub fn new(level: u32, range: NumberRange) -> Self {
        let level = level.max(1);
        Self {
            level,
            pairs: pairs_for_level(level),
            range,
            status: SessionStatus::Idle,
            cards: Vec::new(),
            first_pick: None,
            moves: 0,
            matches: 0,
            score: 0,
            badges_awarded: Vec::new(),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn matches(&self) -> u32 {
        self.matches
    }

    pub fn cards(&self) -> &[MemoryCard] {
        &self.cards
    }

    /// Deals a fresh shuffled deck.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SessionError> {
        if self.status != SessionStatus::Idle {
            return Err(SessionError::InvalidState {
                expected: SessionStatus::Idle,
                actual: self.status,
            });
        }

        self.cards = question_generator::memory_deck(rng, self.range, self.pairs);
        self.status = SessionStatus::Active;
        Ok(())
    }

    pub fn flip(&mut self, card_id: u32) -> Result<FlipStep, SessionError> {
        if self.status != SessionStatus::Active {
            return Err(SessionError::InvalidState {
                expected: SessionStatus::Active,
                actual: self.status,
            });
        }

        let index = self
            .cards
            .iter()
            .position(|card| card.id == card_id)
            .ok_or(SessionError::CardNotFound(card_id))?;

        if self.cards[index].is_face_up() {
            return Ok(FlipStep {
                outcome: FlipOutcome::Ignored,
                attempt: None,
                badges: Vec::new(),
            });
        }

        let Some(first_index) = self.first_pick.take() else {
            self.cards[index].is_flipped = true;
            self.first_pick = Some(index);
            return Ok(FlipStep {
                outcome: FlipOutcome::FirstCard { card_id },
                attempt: None,
                badges: Vec::new(),
            });
        };

        let moves_before = self.moves;
        self.moves += 1;

        let first = &self.cards[first_index];
        let second = &self.cards[index];
        let matched = first.kind != second.kind && first.value == second.value;
        let revealed = vec![
            RevealedCard {
                id: first.id,
                content: first.content.clone(),
            },
            RevealedCard {
                id: second.id,
                content: second.content.clone(),
            },
        ];
        let first_id = first.id;
        let table = first.table;

        let mut points_awarded = 0;
        let mut badges = Vec::new();
        if matched {
            points_awarded = scoring::memory_match_points(moves_before);
            self.score += points_awarded;
            self.matches += 1;
            for i in [first_index, index] {
                self.cards[i].is_matched = true;
                self.cards[i].is_flipped = true;
            }

            if self.matches == self.pairs {
                self.status = SessionStatus::Complete;
                badges = scoring::memory_badges(self.moves, self.pairs);
                self.badges_awarded.extend(badges.iter().cloned());
            }
        } else {
            // Both cards turn back over; the client shows them from `revealed`.
            self.cards[first_index].is_flipped = false;
        }

        Ok(FlipStep {
            outcome: FlipOutcome::Move {
                first: first_id,
                second: card_id,
                matched,
                points_awarded,
                revealed,
            },
            attempt: Some(AttemptRecord {
                correct: matched,
                table,
                points: points_awarded,
            }),
            badges,
        })
    }

    pub fn view(&self) -> MemoryView {
        MemoryView {
            level: self.level,
            pairs: self.pairs,
            moves: self.moves,
            matches: self.matches,
            score: self.score,
            cards: self.cards.iter().map(Into::into).collect(),
            badges_awarded: self.badges_awarded.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::memory::CardKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn started(level: u32, seed: u64) -> MemoryGame {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = MemoryGame::new(level, NumberRange::new(1, 5));
        game.start(&mut rng).unwrap();
        game
    }

    /// Equation card id paired with the answer card of the same value.
    fn matching_pairs(game: &MemoryGame) -> Vec<(u32, u32)> {
        let mut answers: Vec<&MemoryCard> = game
            .cards()
            .iter()
            .filter(|c| c.kind == CardKind::Answer)
            .collect();

        game.cards()
            .iter()
            .filter(|c| c.kind == CardKind::Equation)
            .map(|eq| {
                let pos = answers.iter().position(|a| a.value == eq.value).unwrap();
                (eq.id, answers.remove(pos).id)
            })
            .collect()
    }

    fn mismatch(game: &MemoryGame) -> (u32, u32) {
        let equations: Vec<&MemoryCard> = game
            .cards()
            .iter()
            .filter(|c| c.kind == CardKind::Equation)
            .collect();
        (equations[0].id, equations[1].id)
    }

    #[test]
    fn pair_count_grows_with_level() {
        assert_eq!(pairs_for_level(1), 5);
        assert_eq!(pairs_for_level(4), 8);
        assert_eq!(pairs_for_level(9), 8);
        assert_eq!(pairs_for_level(u32::MAX), 8);

        let game = started(2, 1);
        assert_eq!(game.cards().len(), 12);
        assert_eq!(game.view().cards.iter().filter(|c| c.face_up).count(), 0);
    }

    #[test]
    fn flipping_before_start_is_rejected() {
        let mut game = MemoryGame::new(1, NumberRange::new(1, 5));
        assert!(matches!(
            game.flip(0),
            Err(SessionError::InvalidState { .. })
        ));
    }

    #[test]
    fn unknown_card_is_an_error() {
        let mut game = started(1, 2);
        assert!(matches!(game.flip(99), Err(SessionError::CardNotFound(99))));
    }

    #[test]
    fn perfect_game_earns_both_badges() {
        let mut game = started(1, 3);
        let pairs = matching_pairs(&game);

        let mut last = None;
        for (i, (eq, ans)) in pairs.iter().enumerate() {
            let first = game.flip(*eq).unwrap();
            assert_eq!(first.outcome, FlipOutcome::FirstCard { card_id: *eq });
            assert!(first.attempt.is_none());

            let step = game.flip(*ans).unwrap();
            let attempt = step.attempt.clone().unwrap();
            assert!(attempt.correct);
            assert_eq!(attempt.points, 50 - 2 * i as u32);
            last = Some(step);
        }

        assert_eq!(game.status(), SessionStatus::Complete);
        assert_eq!(game.score(), 50 + 48 + 46 + 44 + 42);
        assert_eq!(
            last.unwrap().badges,
            vec!["memory-master", "perfect-memory"]
        );
    }

    #[test]
    fn mismatch_turns_cards_back_and_costs_a_move() {
        let mut game = started(1, 4);
        let (a, b) = mismatch(&game);

        game.flip(a).unwrap();
        let step = game.flip(b).unwrap();
        match step.outcome {
            FlipOutcome::Move {
                matched, revealed, ..
            } => {
                assert!(!matched);
                assert_eq!(revealed.len(), 2);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(step.attempt.map(|a| a.correct), Some(false));
        assert_eq!(game.moves(), 1);
        assert!(game.cards().iter().all(|c| !c.is_face_up()));
    }

    #[test]
    fn face_up_card_is_ignored() {
        let mut game = started(1, 5);
        let (eq, ans) = matching_pairs(&game)[0];

        game.flip(eq).unwrap();
        assert_eq!(game.flip(eq).unwrap().outcome, FlipOutcome::Ignored);
        game.flip(ans).unwrap();
        assert_eq!(game.flip(ans).unwrap().outcome, FlipOutcome::Ignored);
        assert_eq!(game.moves(), 1);
        assert_eq!(game.matches(), 1);
    }
}
