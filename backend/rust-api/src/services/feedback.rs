use crate::models::GameMode;

/// Notification hook fired on correct answers (success chime, speech, ...).
///
/// Implementations must not influence scoring; the session service calls the
/// hook after the attempt has already been recorded.
pub trait AnswerFeedback: Send + Sync {
    fn on_correct_answer(&self, mode: GameMode, points: u32);
}

/// Hook used when no audio collaborator is attached.
pub struct SilentFeedback;

impl AnswerFeedback for SilentFeedback {
    fn on_correct_answer(&self, _mode: GameMode, _points: u32) {}
}

/// Emits a trace event the presentation layer's audio bridge can follow.
pub struct LogFeedback;

impl AnswerFeedback for LogFeedback {
    fn on_correct_answer(&self, mode: GameMode, points: u32) {
        tracing::debug!(target: "feedback", mode = %mode, points, "success chime");
    }
}
