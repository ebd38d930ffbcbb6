use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preferences {
    pub player_name: Option<String>,
    pub music_enabled: bool,
    pub sound_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            player_name: None,
            music_enabled: true,
            sound_enabled: true,
        }
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePreferencesRequest {
    #[validate(length(
        min = 1,
        max = 50,
        message = "Player name must be between 1 and 50 characters"
    ))]
    pub player_name: Option<String>,

    pub music_enabled: Option<bool>,

    pub sound_enabled: Option<bool>,
}
