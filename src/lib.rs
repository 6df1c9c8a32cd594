//! Circuit Runner - A side-scrolling circuit-board platformer
//!
//! Core modules:
//! - `sim`: Simulation (physics, collisions, level generation, game state)
//! - `platform`: Frame clock, input cell and render-loop driver
//! - `persistence`: Key-value storage with versioned JSON envelopes
//! - `tuning`: Data-driven game balance
//! - `highscores`, `settings`: Leaderboard and player preferences
//! - `music`: Background music sequencer
//! - `renderer`, `audio`: Canvas2D drawing, sound cues and music (web only)

pub mod highscores;
pub mod music;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod renderer;

pub use highscores::{Leaderboard, LeaderboardEntry};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Player hitbox (centered on the player position)
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 60.0;

    /// Horizontal spawn offset from the left edge of every level
    pub const PLAYER_START_X: f32 = 100.0;
    /// Spawn height above the ground line
    pub const PLAYER_START_HEIGHT: f32 = 100.0;

    /// Ground line sits this far above the bottom of the viewport
    pub const GROUND_MARGIN: f32 = 100.0;
    /// Falling this far below the viewport costs a life
    pub const FALL_MARGIN: f32 = 100.0;

    /// Landing band below the ground line
    pub const FLOOR_LANDING_BAND: f32 = 30.0;
    /// Extra landing band below a platform's bottom edge
    pub const PLATFORM_LANDING_BAND: f32 = 10.0;

    /// Input magnitude at or below this counts as released
    pub const INPUT_DEAD_ZONE: f32 = 0.1;

    /// Walk cycle frame length (seconds) and frame count
    pub const WALK_FRAME_TIME: f32 = 0.12;
    pub const WALK_FRAMES: u8 = 8;

    /// Entity sizes
    pub const ENEMY_SIZE: f32 = 35.0;
    pub const COLLECTIBLE_SIZE: f32 = 25.0;
    pub const POWERUP_SIZE: f32 = 30.0;
    pub const BOSS_SIZE: f32 = 90.0;
    pub const BOSS_SHOT_SIZE: f32 = 14.0;
    pub const EXIT_WIDTH: f32 = 60.0;
    pub const EXIT_HEIGHT: f32 = 80.0;

    /// Platform thickness used by every generated platform
    pub const PLATFORM_HEIGHT: f32 = 20.0;

    /// Default viewport (landscape phone-ish)
    pub const DEFAULT_VIEWPORT_WIDTH: f32 = 960.0;
    pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 540.0;

    /// Fraction of the viewport width the camera keeps left of the player
    pub const CAMERA_LEAD: f32 = 1.0 / 3.0;
}

/// Move `current` toward `target` by an exponential-ish step of `rate * dt`
#[inline]
pub fn approach(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    current + (target - current) * (rate * dt).min(1.0)
}
