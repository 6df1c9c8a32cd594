//! Game settings and preferences
//!
//! Persisted separately from the leaderboard, through the same store.

use serde::{Deserialize, Serialize};

use crate::highscores::truncate_name;
use crate::persistence::{KeyValueStore, load_or_default, save_best_effort};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Background music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Accessibility ===
    /// Reduced motion (no screen flash on hits, static wormhole)
    pub reduced_motion: bool,

    /// Default name offered for leaderboard entries
    pub player_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.5,
            muted: false,
            mute_on_blur: true,
            show_fps: false,
            reduced_motion: false,
            player_name: "Player".to_string(),
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "circuit_runner_settings";

    /// Clamp volumes and the player name into range
    pub fn sanitized(mut self) -> Self {
        self.master_volume = clamp_volume(self.master_volume);
        self.sfx_volume = clamp_volume(self.sfx_volume);
        self.music_volume = clamp_volume(self.music_volume);
        self.player_name = truncate_name(&self.player_name);
        self
    }

    /// Gain applied to sound effects
    pub fn sfx_level(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Gain applied to the music bus
    pub fn music_level(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.music_volume
        }
    }

    /// Load settings, falling back to defaults
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let settings: Settings = load_or_default(store, Self::STORAGE_KEY);
        settings.sanitized()
    }

    /// Save settings (best effort)
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &S) -> bool {
        let saved = save_best_effort(store, Self::STORAGE_KEY, self);
        if saved {
            log::info!("Settings saved");
        }
        saved
    }
}

fn clamp_volume(v: f32) -> f32 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 1.0 }
}
