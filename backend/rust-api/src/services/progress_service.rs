use std::sync::{Arc, Mutex, MutexGuard};

use crate::metrics::BADGES_AWARDED_TOTAL;
use crate::models::{Difficulty, PlayerProgress};

use super::storage::KeyValueStore;

pub const PROGRESS_KEY: &str = "playerStats";

/// Holds the player's cumulative statistics and writes the whole record back
/// to the key-value store after every mutation.
pub struct ProgressStore {
    store: Arc<dyn KeyValueStore>,
    progress: Mutex<PlayerProgress>,
}

impl ProgressStore {
    /// Loads the persisted record. Missing, unreadable or inconsistent data
    /// yields a fresh default record.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let progress = Self::read_persisted(store.as_ref()).unwrap_or_default();
        tracing::info!(
            "Player progress loaded: attempted={}, correct={}, points={}, difficulty={}",
            progress.total_attempted,
            progress.total_correct,
            progress.points_earned,
            progress.difficulty_level
        );

        Self {
            store,
            progress: Mutex::new(progress),
        }
    }

    fn read_persisted(store: &dyn KeyValueStore) -> Option<PlayerProgress> {
        let raw = match store.get(PROGRESS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read player progress, using defaults: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<PlayerProgress>(&raw) {
            Ok(progress) if progress.is_consistent() => Some(progress),
            Ok(_) => {
                tracing::warn!("Persisted player progress has inconsistent counters, using defaults");
                None
            }
            Err(e) => {
                tracing::warn!("Persisted player progress is malformed, using defaults: {}", e);
                None
            }
        }
    }

    pub fn snapshot(&self) -> PlayerProgress {
        self.lock().clone()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.lock().difficulty_level
    }

    pub fn has_badge(&self, id: &str) -> bool {
        self.lock().has_badge(id)
    }

    pub fn record_attempt(&self, correct: bool, table: u32, points_if_correct: u32) -> PlayerProgress {
        let mut progress = self.lock();
        progress.apply_attempt(correct, table, points_if_correct);
        self.persist(&progress);

        tracing::debug!(
            "Attempt recorded: correct={}, table={}, streak={}, points={}, level={}",
            correct,
            table,
            progress.current_streak,
            progress.points_earned,
            progress.level()
        );

        progress.clone()
    }

    /// Returns true when the badge is newly awarded.
    pub fn add_badge(&self, id: &str) -> bool {
        let mut progress = self.lock();
        let added = progress.insert_badge(id);
        if added {
            BADGES_AWARDED_TOTAL.with_label_values(&[id]).inc();
            tracing::info!("Badge awarded: {}", id);
        }
        self.persist(&progress);
        added
    }

    pub fn set_difficulty(&self, difficulty: Difficulty) -> PlayerProgress {
        let mut progress = self.lock();
        progress.difficulty_level = difficulty;
        self.persist(&progress);

        tracing::info!("Difficulty level set to {}", difficulty);
        progress.clone()
    }

    pub fn reset(&self) -> PlayerProgress {
        let mut progress = self.lock();
        *progress = PlayerProgress::default();

        if let Err(e) = self.store.remove(PROGRESS_KEY) {
            tracing::error!("Failed to clear persisted player progress: {}", e);
        }

        tracing::info!("Player progress reset to defaults");
        progress.clone()
    }

    fn persist(&self, progress: &PlayerProgress) {
        let json = match serde_json::to_string(&progress.view()) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize player progress: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.set(PROGRESS_KEY, &json) {
            tracing::error!("Failed to persist player progress: {}", e);
        }
    }

    fn lock(&self) -> MutexGuard<'_, PlayerProgress> {
        // The record is always left whole between statements, so a panic on
        // another thread does not invalidate it.
        self.progress
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
