use std::sync::Arc;

use crate::models::preferences::{Preferences, UpdatePreferencesRequest};

use super::storage::KeyValueStore;

pub const PLAYER_NAME_KEY: &str = "playerName";
pub const MUSIC_ENABLED_KEY: &str = "musicEnabled";
pub const SOUND_ENABLED_KEY: &str = "soundEnabled";

/// Player name and audio switches, each stored under its own key.
pub struct PreferencesService {
    store: Arc<dyn KeyValueStore>,
}

impl PreferencesService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn get(&self) -> Preferences {
        let defaults = Preferences::default();
        Preferences {
            player_name: self.read(PLAYER_NAME_KEY).filter(|name| !name.trim().is_empty()),
            music_enabled: self.read_flag(MUSIC_ENABLED_KEY, defaults.music_enabled),
            sound_enabled: self.read_flag(SOUND_ENABLED_KEY, defaults.sound_enabled),
        }
    }

    pub fn sound_enabled(&self) -> bool {
        self.read_flag(SOUND_ENABLED_KEY, true)
    }

    pub fn update(&self, req: &UpdatePreferencesRequest) -> Preferences {
        if let Some(name) = &req.player_name {
            self.write(PLAYER_NAME_KEY, name.trim());
        }
        if let Some(music) = req.music_enabled {
            self.write(MUSIC_ENABLED_KEY, &music.to_string());
        }
        if let Some(sound) = req.sound_enabled {
            self.write(SOUND_ENABLED_KEY, &sound.to_string());
        }

        let preferences = self.get();
        tracing::info!(
            "Preferences updated: music={}, sound={}",
            preferences.music_enabled,
            preferences.sound_enabled
        );
        preferences
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to read preference {}: {}", key, e);
                None
            }
        }
    }

    fn read_flag(&self, key: &str, default: bool) -> bool {
        self.read(key)
            .and_then(|raw| raw.trim().parse::<bool>().ok())
            .unwrap_or(default)
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::error!("Failed to persist preference {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStore;

    #[test]
    fn defaults_when_nothing_stored() {
        let service = PreferencesService::new(Arc::new(MemoryStore::new()));
        assert_eq!(service.get(), Preferences::default());
        assert!(service.sound_enabled());
    }

    #[test]
    fn malformed_flags_fall_back_to_defaults() {
        let backing = Arc::new(MemoryStore::new());
        backing.set(SOUND_ENABLED_KEY, "maybe").unwrap();
        backing.set(MUSIC_ENABLED_KEY, "false").unwrap();

        let service = PreferencesService::new(backing);
        let preferences = service.get();
        assert!(preferences.sound_enabled);
        assert!(!preferences.music_enabled);
    }

    #[test]
    fn partial_update_keeps_other_values() {
        let service = PreferencesService::new(Arc::new(MemoryStore::new()));

        service.update(&UpdatePreferencesRequest {
            player_name: Some("  Mia ".to_string()),
            ..Default::default()
        });
        let preferences = service.update(&UpdatePreferencesRequest {
            sound_enabled: Some(false),
            ..Default::default()
        });

        assert_eq!(preferences.player_name.as_deref(), Some("Mia"));
        assert!(!preferences.sound_enabled);
        assert!(preferences.music_enabled);
    }
}
