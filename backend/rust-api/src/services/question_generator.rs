use rand::Rng;

use crate::models::memory::{CardKind, MemoryCard};
use crate::models::{Difficulty, NumberRange, Question, TableFact};

pub const OPTION_COUNT: usize = 4;
pub const ASSESSMENT_QUESTIONS_PER_TABLE: u32 = 2;
pub const ASSESSMENT_MAX_QUESTIONS: usize = 20;

const DISTRACTOR_WINDOW: u32 = 10;
const DISTRACTOR_ATTEMPTS_PER_WINDOW: u32 = 100;

/// Lookup of the table range for a difficulty level.
pub fn range(difficulty: Difficulty) -> NumberRange {
    difficulty.range()
}

/// Draws a free-entry question. Division is picked by a coin flip when allowed.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, range: NumberRange, allow_division: bool) -> Question {
    let table = rng.random_range(range.min..=range.max);
    let multiplier = rng.random_range(1..=range.max);
    build_question(rng, table, multiplier, allow_division)
}

/// Division questions come from a known product/factor pair, so they never
/// leave a remainder.
fn build_question<R: Rng + ?Sized>(
    rng: &mut R,
    table: u32,
    multiplier: u32,
    allow_division: bool,
) -> Question {
    if allow_division && rng.random_bool(0.5) {
        let product = table * multiplier;
        let (quotient, divisor) = if rng.random_bool(0.5) {
            (table, multiplier)
        } else {
            (multiplier, table)
        };

        Question {
            operand_a: product,
            operand_b: divisor,
            correct_answer: quotient,
            is_division: true,
            table,
            options: Vec::new(),
        }
    } else {
        Question {
            operand_a: table,
            operand_b: multiplier,
            correct_answer: table * multiplier,
            is_division: false,
            table,
            options: Vec::new(),
        }
    }
}

/// Draws a question and attaches four shuffled answer options.
pub fn multiple_choice<R: Rng + ?Sized>(
    rng: &mut R,
    range: NumberRange,
    allow_division: bool,
) -> Question {
    let mut question = generate(rng, range, allow_division);
    question.options = generate_options(rng, question.correct_answer).to_vec();
    question
}

/// Builds `OPTION_COUNT` unique positive options around the correct answer.
///
/// Candidates are `correct ± [1, window]`. Every `DISTRACTOR_ATTEMPTS_PER_WINDOW`
/// rejected draws the window grows, so the loop always terminates.
pub fn generate_options<R: Rng + ?Sized>(rng: &mut R, correct_answer: u32) -> [u32; OPTION_COUNT] {
    let (mut options, _) = draw_options(rng, correct_answer);
    shuffle(rng, &mut options);
    options
}

/// Unshuffled options plus the distractor window the draw finished with.
fn draw_options<R: Rng + ?Sized>(rng: &mut R, correct_answer: u32) -> ([u32; OPTION_COUNT], u32) {
    let mut options = [correct_answer; OPTION_COUNT];
    let mut filled = 1;
    let mut window = DISTRACTOR_WINDOW;
    let mut rejected = 0;

    while filled < OPTION_COUNT {
        let offset = rng.random_range(1..=window) as i64;
        let offset = if rng.random_bool(0.5) { offset } else { -offset };
        let candidate = correct_answer as i64 + offset;

        let accepted = candidate > 0
            && candidate <= u32::MAX as i64
            && !options[..filled].contains(&(candidate as u32));

        if accepted {
            options[filled] = candidate as u32;
            filled += 1;
            continue;
        }

        rejected += 1;
        if rejected >= DISTRACTOR_ATTEMPTS_PER_WINDOW {
            tracing::debug!(
                "Widening distractor window for answer {} from {}",
                correct_answer,
                window
            );
            window += DISTRACTOR_WINDOW;
            rejected = 0;
        }
    }

    (options, window)
}

/// Fisher–Yates shuffle.
pub fn shuffle<T, R: Rng + ?Sized>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Two questions per table in the difficulty range, shuffled and capped.
pub fn assessment_set<R: Rng + ?Sized>(
    rng: &mut R,
    difficulty: Difficulty,
    allow_division: bool,
) -> Vec<Question> {
    let range = difficulty.range();
    let mut questions = Vec::new();

    for table in range.min..=range.max {
        for _ in 0..ASSESSMENT_QUESTIONS_PER_TABLE {
            let multiplier = rng.random_range(1..=range.max);
            questions.push(build_question(rng, table, multiplier, allow_division));
        }
    }

    shuffle(rng, &mut questions);
    questions.truncate(ASSESSMENT_MAX_QUESTIONS);
    questions
}

/// One equation card and one answer card per generated fact, shuffled.
pub fn memory_deck<R: Rng + ?Sized>(rng: &mut R, range: NumberRange, pairs: u32) -> Vec<MemoryCard> {
    let mut cards = Vec::with_capacity(pairs as usize * 2);

    for pair in 0..pairs {
        let table = rng.random_range(range.min..=range.max);
        let multiplier = rng.random_range(1..=range.max);
        let value = table * multiplier;

        cards.push(MemoryCard::new(
            pair * 2,
            CardKind::Equation,
            format!("{} × {}", table, multiplier),
            value,
            table,
        ));
        cards.push(MemoryCard::new(
            pair * 2 + 1,
            CardKind::Answer,
            value.to_string(),
            value,
            table,
        ));
    }

    shuffle(rng, &mut cards);
    cards
}

/// Learning-mode listing `table × 1 ..= table × range.max`.
pub fn table_facts(table: u32, range: NumberRange) -> Vec<TableFact> {
    (1..=range.max)
        .map(|multiplier| TableFact {
            multiplier,
            result: table * multiplier,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};
    use std::collections::HashSet;

    /// Emits zero bits for the first `stuck_for` words, then falls through
    /// to a seeded generator. A zero word always draws the lowest offset on
    /// the positive side, so every candidate repeats until the window grows.
    struct StuckRng {
        stuck_for: usize,
        calls: usize,
        inner: StdRng,
    }

    impl StuckRng {
        fn new(stuck_for: usize, seed: u64) -> Self {
            Self {
                stuck_for,
                calls: 0,
                inner: StdRng::seed_from_u64(seed),
            }
        }

        fn stuck(&mut self) -> bool {
            self.calls += 1;
            self.calls <= self.stuck_for
        }
    }

    impl RngCore for StuckRng {
        fn next_u32(&mut self) -> u32 {
            if self.stuck() {
                0
            } else {
                self.inner.next_u32()
            }
        }

        fn next_u64(&mut self) -> u64 {
            if self.stuck() {
                0
            } else {
                self.inner.next_u64()
            }
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            if self.stuck() {
                dst.fill(0);
            } else {
                self.inner.fill_bytes(dst);
            }
        }
    }

    #[test]
    fn range_lookup_is_deterministic() {
        assert_eq!(range(Difficulty::Beginner), NumberRange::new(1, 5));
        assert_eq!(range(Difficulty::Advanced), NumberRange::new(1, 20));
    }

    #[test]
    fn division_questions_are_exact() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut divisions = 0;

        for _ in 0..500 {
            let question = generate(&mut rng, Difficulty::Beginner.range(), true);
            if question.is_division {
                divisions += 1;
                assert_eq!(question.operand_a, question.operand_b * question.correct_answer);
            } else {
                assert_eq!(question.correct_answer, question.operand_a * question.operand_b);
            }
            assert!(question.correct_answer > 0);
            assert!(Difficulty::Beginner.range().contains(question.table));
        }

        assert!(divisions > 0);
    }

    #[test]
    fn multiplication_only_without_division_flag() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let question = generate(&mut rng, Difficulty::Intermediate.range(), false);
            assert!(!question.is_division);
            assert!(question.operand_b >= 1 && question.operand_b <= 12);
        }
    }

    #[test]
    fn options_are_four_unique_positive_values() {
        let mut rng = StdRng::seed_from_u64(5);

        for correct in [1u32, 2, 3, 10, 57, 400] {
            for _ in 0..50 {
                let options = generate_options(&mut rng, correct);
                let unique: HashSet<u32> = options.iter().copied().collect();
                assert_eq!(unique.len(), OPTION_COUNT);
                assert!(options.contains(&correct));
                assert!(options.iter().all(|o| *o > 0));
            }
        }
    }

    #[test]
    fn repeated_rejections_widen_the_window() {
        // Each draw takes at least two words, so 600 stuck words cover well
        // over one full budget of rejected duplicates.
        let mut rng = StuckRng::new(600, 17);
        let (options, window) = draw_options(&mut rng, 500);

        assert!(window > DISTRACTOR_WINDOW);
        assert_eq!(options[0], 500);
        assert_eq!(options[1], 501);

        let unique: HashSet<u32> = options.iter().copied().collect();
        assert_eq!(unique.len(), OPTION_COUNT);
    }

    #[test]
    fn options_survive_a_stuck_generator() {
        let mut rng = StuckRng::new(600, 23);
        let options = generate_options(&mut rng, 3);

        let unique: HashSet<u32> = options.iter().copied().collect();
        assert_eq!(unique.len(), OPTION_COUNT);
        assert!(options.contains(&3));
        assert!(options.iter().all(|o| *o > 0));
    }

    #[test]
    fn multiple_choice_attaches_options() {
        let mut rng = StdRng::seed_from_u64(9);
        let question = multiple_choice(&mut rng, Difficulty::Advanced.range(), true);
        assert_eq!(question.options.len(), OPTION_COUNT);
        assert!(question.options.contains(&question.correct_answer));
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        assert_eq!(
            multiple_choice(&mut a, Difficulty::Advanced.range(), true),
            multiple_choice(&mut b, Difficulty::Advanced.range(), true)
        );
    }

    #[test]
    fn shuffle_keeps_elements() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut items: Vec<u32> = (0..30).collect();
        shuffle(&mut rng, &mut items);

        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..30).collect::<Vec<_>>());

        let mut empty: Vec<u32> = Vec::new();
        shuffle(&mut rng, &mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn assessment_set_covers_tables_and_caps_length() {
        let mut rng = StdRng::seed_from_u64(8);

        let beginner = assessment_set(&mut rng, Difficulty::Beginner, false);
        assert_eq!(beginner.len(), 10);
        for table in 1..=5 {
            assert_eq!(beginner.iter().filter(|q| q.table == table).count(), 2);
        }

        let advanced = assessment_set(&mut rng, Difficulty::Advanced, true);
        assert_eq!(advanced.len(), ASSESSMENT_MAX_QUESTIONS);
        for question in &advanced {
            if question.is_division {
                assert_eq!(question.operand_a, question.operand_b * question.correct_answer);
            }
        }
    }

    #[test]
    fn memory_deck_has_matching_pairs() {
        let mut rng = StdRng::seed_from_u64(4);
        let deck = memory_deck(&mut rng, Difficulty::Beginner.range(), 5);
        assert_eq!(deck.len(), 10);

        let equations = deck.iter().filter(|c| c.kind == CardKind::Equation).count();
        assert_eq!(equations, 5);

        for card in deck.iter().filter(|c| c.kind == CardKind::Equation) {
            assert!(deck
                .iter()
                .any(|other| other.kind == CardKind::Answer && other.value == card.value));
        }
    }

    #[test]
    fn table_facts_follow_range_max() {
        let facts = table_facts(7, Difficulty::Beginner.range());
        assert_eq!(facts.len(), 5);
        assert_eq!(facts[0], TableFact { multiplier: 1, result: 7 });
        assert_eq!(facts[4], TableFact { multiplier: 5, result: 35 });
    }
}
