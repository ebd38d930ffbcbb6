use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::metrics::{ANSWERS_SUBMITTED_TOTAL, SESSIONS_ACTIVE, SESSIONS_TOTAL};
use crate::models::answer::{AttemptRecord, FlipCardResponse, SubmitAnswerResponse, TickResponse};
use crate::models::challenge::{find_challenge, is_unlocked};
use crate::models::{
    CreateSessionRequest, Difficulty, GameMode, SessionDetails, SessionStatus, SessionView,
};

use super::feedback::AnswerFeedback;
use super::game_session::{AnswerStep, QuestionRound};
use super::memory_game::MemoryGame;
use super::preferences_service::PreferencesService;
use super::progress_service::ProgressStore;

/// Finished sessions are dropped once the registry grows past this size.
const MAX_RETAINED_SESSIONS: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(Uuid),

    #[error("Session is {actual}, expected {expected}")]
    InvalidState {
        expected: SessionStatus,
        actual: SessionStatus,
    },

    #[error("Operation not available in {0} mode")]
    WrongMode(GameMode),

    #[error("challenge_id is required for levels mode")]
    MissingChallenge,

    #[error("Unknown challenge: {0}")]
    UnknownChallenge(u8),

    #[error("Challenge {0} is locked")]
    ChallengeLocked(u8),

    #[error("Card not found: {0}")]
    CardNotFound(u32),

    #[error("Session has no timer")]
    NotTimed,

    #[error("No question is waiting for an answer")]
    NoQuestion,

    #[error("Session {0} already has a timer stream attached")]
    StreamAttached(Uuid),
}

enum Engine {
    Round(QuestionRound),
    Memory(MemoryGame),
}

impl Engine {
    fn status(&self) -> SessionStatus {
        match self {
            Engine::Round(round) => round.status(),
            Engine::Memory(game) => game.status(),
        }
    }
}

struct GameSession {
    id: Uuid,
    mode: GameMode,
    difficulty: Difficulty,
    created_at: DateTime<Utc>,
    rng: StdRng,
    engine: Engine,
    /// Set while an SSE stream drives the countdown.
    streaming: bool,
}

impl GameSession {
    fn status(&self) -> SessionStatus {
        self.engine.status()
    }

    fn view(&self) -> SessionView {
        let details = match &self.engine {
            Engine::Round(round) => SessionDetails::Round(round.view()),
            Engine::Memory(game) => SessionDetails::Memory(game.view()),
        };
        SessionView {
            id: self.id,
            mode: self.mode,
            difficulty: self.difficulty,
            status: self.status(),
            created_at: self.created_at,
            details,
        }
    }
}

/// Countdown snapshot used by the SSE timer stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub total_seconds: u32,
    pub remaining_seconds: u32,
    pub status: SessionStatus,
}

/// Registry of in-flight game sessions.
///
/// Each session owns its random source. Attempts and badges are forwarded to
/// the progress store as they happen, so abandoning a session keeps what was
/// already recorded.
pub struct SessionService {
    sessions: Mutex<HashMap<Uuid, GameSession>>,
    progress: Arc<ProgressStore>,
    preferences: Arc<PreferencesService>,
    feedback: Arc<dyn AnswerFeedback>,
    rng_seed: Option<u64>,
    created: AtomicU64,
}

impl SessionService {
    pub fn new(
        progress: Arc<ProgressStore>,
        preferences: Arc<PreferencesService>,
        feedback: Arc<dyn AnswerFeedback>,
        rng_seed: Option<u64>,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            progress,
            preferences,
            feedback,
            rng_seed,
            created: AtomicU64::new(0),
        }
    }

    pub fn create(&self, req: &CreateSessionRequest) -> Result<SessionView, SessionError> {
        let difficulty = req.difficulty.unwrap_or_else(|| self.progress.difficulty());
        let mut rng = self.session_rng();

        let engine = match req.mode {
            GameMode::Quiz => Engine::Round(QuestionRound::quiz(difficulty, req.allow_division)),
            GameMode::Speed => Engine::Round(QuestionRound::speed(difficulty, req.allow_division)),
            GameMode::Assessment => Engine::Round(QuestionRound::assessment(
                &mut rng,
                difficulty,
                req.allow_division,
            )),
            GameMode::Levels => {
                let id = req.challenge_id.ok_or(SessionError::MissingChallenge)?;
                let challenge = find_challenge(id).ok_or(SessionError::UnknownChallenge(id))?;
                if !is_unlocked(id, |badge| self.progress.has_badge(badge)) {
                    return Err(SessionError::ChallengeLocked(id));
                }
                Engine::Round(QuestionRound::levels(*challenge))
            }
            GameMode::Memory => Engine::Memory(MemoryGame::new(
                req.memory_level.unwrap_or(1),
                difficulty.range(),
            )),
        };

        let session = GameSession {
            id: Uuid::new_v4(),
            mode: req.mode,
            difficulty,
            created_at: Utc::now(),
            rng,
            engine,
            streaming: false,
        };
        let view = session.view();

        let mut sessions = self.lock();
        if sessions.len() >= MAX_RETAINED_SESSIONS {
            sessions.retain(|_, s| s.status() != SessionStatus::Complete);
        }
        sessions.insert(session.id, session);

        SESSIONS_TOTAL
            .with_label_values(&[req.mode.as_str(), "created"])
            .inc();
        tracing::info!(
            "Session created: {} mode={} difficulty={}",
            view.id,
            view.mode,
            view.difficulty
        );

        Ok(view)
    }

    pub fn get(&self, id: Uuid) -> Result<SessionView, SessionError> {
        let sessions = self.lock();
        sessions
            .get(&id)
            .map(GameSession::view)
            .ok_or(SessionError::NotFound(id))
    }

    pub fn start(&self, id: Uuid) -> Result<SessionView, SessionError> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;

        match &mut session.engine {
            Engine::Round(round) => round.start(&mut session.rng)?,
            Engine::Memory(game) => game.start(&mut session.rng)?,
        }

        SESSIONS_ACTIVE.inc();
        tracing::info!("Session started: {} mode={}", id, session.mode);

        // An assessment over an empty set finishes immediately.
        if session.status() == SessionStatus::Complete {
            self.finish(session);
        }

        Ok(session.view())
    }

    pub fn submit_answer(&self, id: Uuid, raw: &str) -> Result<SubmitAnswerResponse, SessionError> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        let mode = session.mode;

        let Engine::Round(round) = &mut session.engine else {
            return Err(SessionError::WrongMode(mode));
        };

        let step = round.answer(raw, &mut session.rng)?;
        let (evaluation, correct_answer, attempt, badges) = match step {
            AnswerStep::Ignored => {
                tracing::debug!("Ignoring non-numeric answer for session {}", id);
                return Ok(SubmitAnswerResponse {
                    accepted: false,
                    correct: false,
                    points_awarded: 0,
                    correct_answer: None,
                    session_score: round.score(),
                    current_streak: round.streak(),
                    status: round.status(),
                    badges_awarded: Vec::new(),
                    next_question: round.current_question().map(Into::into),
                    feedback: None,
                });
            }
            AnswerStep::Evaluated {
                evaluation,
                correct_answer,
                attempt,
                badges,
            } => (evaluation, correct_answer, attempt, badges),
        };

        self.record(mode, attempt, &badges);

        let feedback = if evaluation.is_correct {
            format!("Correct! +{} points", evaluation.points_awarded)
        } else {
            format!("Not quite! The answer is {}", correct_answer)
        };

        let response = SubmitAnswerResponse {
            accepted: true,
            correct: evaluation.is_correct,
            points_awarded: evaluation.points_awarded,
            correct_answer: Some(correct_answer),
            session_score: round.score(),
            current_streak: round.streak(),
            status: round.status(),
            badges_awarded: badges,
            next_question: round.current_question().map(Into::into),
            feedback: Some(feedback),
        };

        if response.status == SessionStatus::Complete {
            self.finish(session);
        }

        Ok(response)
    }

    pub fn flip_card(&self, id: Uuid, card_id: u32) -> Result<FlipCardResponse, SessionError> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        let mode = session.mode;

        let Engine::Memory(game) = &mut session.engine else {
            return Err(SessionError::WrongMode(mode));
        };

        let step = game.flip(card_id)?;
        if let Some(attempt) = step.attempt {
            self.record(mode, attempt, &step.badges);
        }

        let response = FlipCardResponse {
            outcome: step.outcome,
            status: game.status(),
            moves: game.moves(),
            matches: game.matches(),
            score: game.score(),
            badges_awarded: step.badges,
        };

        if response.status == SessionStatus::Complete {
            self.finish(session);
        }

        Ok(response)
    }

    /// Advances a timed session's countdown by `seconds`. Rejected while a
    /// timer stream owns the countdown.
    pub fn tick(&self, id: Uuid, seconds: u32) -> Result<TickResponse, SessionError> {
        self.advance_timer(id, seconds, false)
    }

    /// One-second tick issued by the session's attached timer stream.
    pub fn stream_tick(&self, id: Uuid) -> Result<TickResponse, SessionError> {
        self.advance_timer(id, 1, true)
    }

    fn advance_timer(
        &self,
        id: Uuid,
        seconds: u32,
        from_stream: bool,
    ) -> Result<TickResponse, SessionError> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        let mode = session.mode;

        if session.streaming && !from_stream {
            return Err(SessionError::StreamAttached(id));
        }

        let Engine::Round(round) = &mut session.engine else {
            return Err(SessionError::WrongMode(mode));
        };

        let was_active = round.status() == SessionStatus::Active;
        let step = round.tick(seconds)?;
        for badge in &step.badges {
            self.progress.add_badge(badge);
        }

        let response = TickResponse {
            seconds_remaining: step.seconds_remaining,
            status: round.status(),
            score: round.score(),
            passed: round.passed(),
            badges_awarded: step.badges,
        };

        if was_active && response.status == SessionStatus::Complete {
            tracing::info!("Timer expired: session={}", id);
            self.finish(session);
        }

        Ok(response)
    }

    pub fn timer_state(&self, id: Uuid) -> Result<TimerState, SessionError> {
        let sessions = self.lock();
        let session = sessions.get(&id).ok_or(SessionError::NotFound(id))?;
        timer_of(session)
    }

    /// Claims the countdown of an active timed session for one SSE stream.
    pub fn attach_stream(&self, id: Uuid) -> Result<TimerState, SessionError> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        let timer = timer_of(session)?;

        if timer.status != SessionStatus::Active {
            return Err(SessionError::InvalidState {
                expected: SessionStatus::Active,
                actual: timer.status,
            });
        }
        if session.streaming {
            return Err(SessionError::StreamAttached(id));
        }

        session.streaming = true;
        Ok(timer)
    }

    /// Releases the countdown. A session that is already gone is fine.
    pub fn detach_stream(&self, id: Uuid) {
        if let Some(session) = self.lock().get_mut(&id) {
            session.streaming = false;
        }
    }

    /// Discards a session. Attempts it already recorded stay in the progress store.
    pub fn abandon(&self, id: Uuid) -> Result<(), SessionError> {
        let session = self.lock().remove(&id).ok_or(SessionError::NotFound(id))?;

        if session.status() == SessionStatus::Active {
            SESSIONS_ACTIVE.dec();
        }
        SESSIONS_TOTAL
            .with_label_values(&[session.mode.as_str(), "abandoned"])
            .inc();
        tracing::info!("Session abandoned: {} mode={}", id, session.mode);
        Ok(())
    }

    fn record(&self, mode: GameMode, attempt: AttemptRecord, badges: &[String]) {
        self.progress
            .record_attempt(attempt.correct, attempt.table, attempt.points);
        for badge in badges {
            self.progress.add_badge(badge);
        }

        ANSWERS_SUBMITTED_TOTAL
            .with_label_values(&[mode.as_str(), if attempt.correct { "true" } else { "false" }])
            .inc();

        if attempt.correct && self.preferences.sound_enabled() {
            self.feedback.on_correct_answer(mode, attempt.points);
        }
    }

    fn finish(&self, session: &GameSession) {
        SESSIONS_ACTIVE.dec();
        SESSIONS_TOTAL
            .with_label_values(&[session.mode.as_str(), "completed"])
            .inc();
        tracing::info!(
            "Session completed: {} mode={}",
            session.id,
            session.mode
        );
    }

    fn session_rng(&self) -> StdRng {
        let n = self.created.fetch_add(1, Ordering::Relaxed);
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(n)),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, GameSession>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn timer_of(session: &GameSession) -> Result<TimerState, SessionError> {
    let Engine::Round(round) = &session.engine else {
        return Err(SessionError::WrongMode(session.mode));
    };
    let total_seconds = round.time_limit().ok_or(SessionError::NotTimed)?;

    Ok(TimerState {
        total_seconds,
        remaining_seconds: round.seconds_remaining().unwrap_or(total_seconds),
        status: round.status(),
    })
}
