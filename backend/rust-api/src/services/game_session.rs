use rand::Rng;
use std::collections::VecDeque;
use std::time::Instant;

use crate::models::answer::AttemptRecord;
use crate::models::assessment::{AnsweredQuestion, AssessmentReport};
use crate::models::challenge::Challenge;
use crate::models::{Difficulty, GameMode, NumberRange, Question, RoundView, SessionStatus};

use super::assessment_service::build_report;
use super::question_generator;
use super::scoring::{self, Evaluation, ScoringRules};
use super::session_service::SessionError;

/// Question-driven game (quiz, speed, levels, assessment) moving through
/// `idle → active → complete`.
#[derive(Debug)]
pub struct QuestionRound {
    mode: GameMode,
    rules: ScoringRules,
    range: NumberRange,
    allow_division: bool,
    multiple_choice: bool,
    question_limit: Option<u32>,
    time_limit: Option<u32>,
    challenge: Option<Challenge>,
    status: SessionStatus,
    seconds_remaining: Option<u32>,
    pending: VecDeque<Question>,
    current: Option<Question>,
    presented_at: Option<Instant>,
    answered: u32,
    correct: u32,
    score: u32,
    streak: u32,
    best_streak: u32,
    passed: Option<bool>,
    badges_awarded: Vec<String>,
    log: Vec<AnsweredQuestion>,
}

/// What happened to one submitted answer.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerStep {
    /// Input was not a number: nothing changed.
    Ignored,
    Evaluated {
        evaluation: Evaluation,
        correct_answer: u32,
        attempt: AttemptRecord,
        badges: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickStep {
    pub seconds_remaining: u32,
    pub badges: Vec<String>,
}

impl QuestionRound {
    pub fn quiz(difficulty: Difficulty, allow_division: bool) -> Self {
        Self::new(
            GameMode::Quiz,
            difficulty.range(),
            allow_division,
            true,
            Some(scoring::QUIZ_QUESTION_COUNT),
            None,
            None,
        )
    }

    pub fn speed(difficulty: Difficulty, allow_division: bool) -> Self {
        Self::new(
            GameMode::Speed,
            difficulty.range(),
            allow_division,
            false,
            None,
            Some(scoring::SPEED_TIME_LIMIT_SECONDS),
            None,
        )
    }

    pub fn levels(challenge: Challenge) -> Self {
        Self::new(
            GameMode::Levels,
            challenge.range,
            false,
            true,
            Some(challenge.questions_count),
            challenge.time_limit_seconds,
            Some(challenge),
        )
    }

    pub fn assessment<R: Rng + ?Sized>(rng: &mut R, difficulty: Difficulty, allow_division: bool) -> Self {
        let questions = question_generator::assessment_set(rng, difficulty, allow_division);
        let count = questions.len() as u32;
        let mut round = Self::new(
            GameMode::Assessment,
            difficulty.range(),
            allow_division,
            false,
            Some(count),
            None,
            None,
        );
        round.pending = questions.into();
        round
    }

    fn new(
        mode: GameMode,
        range: NumberRange,
        allow_division: bool,
        multiple_choice: bool,
        question_limit: Option<u32>,
        time_limit: Option<u32>,
        challenge: Option<Challenge>,
    ) -> Self {
        Self {
            mode,
            rules: ScoringRules::for_mode(mode),
            range,
            allow_division,
            multiple_choice,
            question_limit,
            time_limit,
            challenge,
            status: SessionStatus::Idle,
            seconds_remaining: None,
            pending: VecDeque::new(),
            current: None,
            presented_at: None,
            answered: 0,
            correct: 0,
            score: 0,
            streak: 0,
            best_streak: 0,
            passed: None,
            badges_awarded: Vec::new(),
            log: Vec::new(),
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn passed(&self) -> Option<bool> {
        self.passed
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    pub fn seconds_remaining(&self) -> Option<u32> {
        self.seconds_remaining
    }

    pub fn time_limit(&self) -> Option<u32> {
        self.time_limit
    }

    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SessionError> {
        if self.status != SessionStatus::Idle {
            return Err(SessionError::InvalidState {
                expected: SessionStatus::Idle,
                actual: self.status,
            });
        }

        self.status = SessionStatus::Active;
        self.seconds_remaining = self.time_limit;
        self.advance(rng);
        Ok(())
    }

    pub fn answer<R: Rng + ?Sized>(&mut self, raw: &str, rng: &mut R) -> Result<AnswerStep, SessionError> {
        self.ensure_active()?;

        let Some(user_answer) = scoring::parse_answer(raw) else {
            return Ok(AnswerStep::Ignored);
        };
        let question = self.current.take().ok_or(SessionError::NoQuestion)?;

        let evaluation = scoring::evaluate(
            &self.rules,
            &question,
            user_answer,
            self.streak,
            self.seconds_remaining,
        );

        self.answered += 1;
        let mut badges = Vec::new();
        if evaluation.is_correct {
            self.correct += 1;
            self.score += evaluation.points_awarded;
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);

            if self.mode == GameMode::Quiz {
                if let Some(badge) = scoring::quiz_streak_badge(self.streak) {
                    badges.push(badge.to_string());
                }
            }
        } else {
            self.streak = 0;
        }

        if self.mode == GameMode::Assessment {
            let seconds = self
                .presented_at
                .map(|at| at.elapsed().as_secs_f64())
                .unwrap_or_default();
            self.log.push(AnsweredQuestion {
                table: question.table,
                correct: evaluation.is_correct,
                seconds,
            });
        }

        let limit_reached = self
            .question_limit
            .is_some_and(|limit| self.answered >= limit);
        if limit_reached {
            badges.extend(self.complete());
        } else {
            self.advance(rng);
        }

        self.badges_awarded.extend(badges.iter().cloned());

        Ok(AnswerStep::Evaluated {
            evaluation,
            correct_answer: question.correct_answer,
            attempt: AttemptRecord {
                correct: evaluation.is_correct,
                table: question.table,
                points: evaluation.points_awarded,
            },
            badges,
        })
    }

    /// Advances the countdown. Reaching zero completes the round.
    pub fn tick(&mut self, seconds: u32) -> Result<TickStep, SessionError> {
        let Some(remaining) = self.seconds_remaining else {
            if self.time_limit.is_none() {
                return Err(SessionError::NotTimed);
            }
            // Timed round that has not started yet.
            return Err(SessionError::InvalidState {
                expected: SessionStatus::Active,
                actual: self.status,
            });
        };

        if self.status != SessionStatus::Active {
            return Ok(TickStep {
                seconds_remaining: remaining,
                badges: Vec::new(),
            });
        }

        let remaining = remaining.saturating_sub(seconds);
        self.seconds_remaining = Some(remaining);

        let mut badges = Vec::new();
        if remaining == 0 {
            badges = self.complete();
            self.badges_awarded.extend(badges.iter().cloned());
        }

        Ok(TickStep {
            seconds_remaining: remaining,
            badges,
        })
    }

    /// Finishes the round and returns the badges earned at completion.
    fn complete(&mut self) -> Vec<String> {
        self.status = SessionStatus::Complete;
        self.current = None;
        self.presented_at = None;

        match self.mode {
            GameMode::Speed => scoring::speed_badges(self.correct, self.best_streak),
            GameMode::Levels => match self.challenge {
                Some(challenge) => {
                    let passed = scoring::challenge_passed(&challenge, self.score);
                    self.passed = Some(passed);
                    if passed {
                        scoring::challenge_badges(&challenge)
                    } else {
                        Vec::new()
                    }
                }
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let next = if self.mode == GameMode::Assessment {
            self.pending.pop_front()
        } else if self.multiple_choice {
            Some(question_generator::multiple_choice(
                rng,
                self.range,
                self.allow_division,
            ))
        } else {
            Some(question_generator::generate(
                rng,
                self.range,
                self.allow_division,
            ))
        };

        match next {
            Some(question) => {
                self.current = Some(question);
                self.presented_at = Some(Instant::now());
            }
            None => {
                self.complete();
            }
        }
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.status == SessionStatus::Active {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                expected: SessionStatus::Active,
                actual: self.status,
            })
        }
    }

    pub fn report(&self) -> Option<AssessmentReport> {
        (self.mode == GameMode::Assessment && self.status == SessionStatus::Complete)
            .then(|| build_report(&self.log))
    }

    pub fn view(&self) -> RoundView {
        RoundView {
            score: self.score,
            answered: self.answered,
            correct: self.correct,
            streak: self.streak,
            best_streak: self.best_streak,
            question_limit: self.question_limit,
            seconds_remaining: self.seconds_remaining,
            time_limit_seconds: self.time_limit,
            current_question: self.current.as_ref().map(Into::into),
            challenge: self.challenge,
            passed: self.passed,
            badges_awarded: self.badges_awarded.clone(),
            report: self.report(),
        }
    }
}
