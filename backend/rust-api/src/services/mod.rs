use std::sync::Arc;

use anyhow::Context;

use crate::config::{Config, StorageBackend};
use feedback::{AnswerFeedback, LogFeedback};
use preferences_service::PreferencesService;
use progress_service::ProgressStore;
use session_service::SessionService;
use storage::{FileStore, KeyValueStore, MemoryStore};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn KeyValueStore>,
    pub progress: Arc<ProgressStore>,
    pub preferences: Arc<PreferencesService>,
    pub sessions: SessionService,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store: Arc<dyn KeyValueStore> = match config.storage_backend {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::File => Arc::new(
                FileStore::open(&config.data_dir).with_context(|| {
                    format!("Failed to open data directory {}", config.data_dir.display())
                })?,
            ),
        };

        tracing::info!("Storage backend initialized: {}", store.backend());

        Ok(Self::with_store(config, store, Arc::new(LogFeedback)))
    }

    /// Builds the state over an existing store and feedback hook.
    pub fn with_store(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        feedback: Arc<dyn AnswerFeedback>,
    ) -> Self {
        let progress = Arc::new(ProgressStore::load(store.clone()));
        let preferences = Arc::new(PreferencesService::new(store.clone()));
        let sessions = SessionService::new(
            progress.clone(),
            preferences.clone(),
            feedback,
            config.rng_seed,
        );

        Self {
            config,
            store,
            progress,
            preferences,
            sessions,
        }
    }
}

pub mod assessment_service;
pub mod dashboard_service;
pub mod feedback;
pub mod game_session;
pub mod memory_game;
pub mod preferences_service;
pub mod progress_service;
pub mod question_generator;
pub mod scoring;
pub mod session_service;
pub mod storage;
