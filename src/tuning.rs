//! Data-driven game balance
//!
//! Every struct uses `#[serde(default)]`, so a tuning file only needs the
//! fields it overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Movement and collision physics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Horizontal speed at full stick deflection (px/s)
    pub max_speed: f32,
    /// Rate at which vx eases toward the target velocity (1/s)
    pub acceleration: f32,
    /// Fraction of vx left after one second with the stick released
    pub release_decay: f32,
    /// |vx| below this snaps to zero when released
    pub stop_threshold: f32,
    /// Vertical velocity applied by a jump (negative is up)
    pub jump_impulse: f32,
    /// Vertical velocity applied after stomping an enemy or the boss
    pub stomp_bounce: f32,
    /// Upper bound on a single tick's delta time (s)
    pub max_dt: f32,
    /// Camera follow rate (1/s)
    pub camera_follow: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 1200.0,
            max_speed: 300.0,
            acceleration: 20.0,
            release_decay: 0.01,
            stop_threshold: 1.0,
            jump_impulse: -550.0,
            stomp_bounce: -300.0,
            max_dt: 1.0 / 30.0,
            camera_follow: 5.0,
        }
    }
}

/// Points awarded per event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreTuning {
    pub collectible: u64,
    pub enemy: u64,
    pub powerup: u64,
    pub boss_hit: u64,
    pub boss_defeat: u64,
}

impl Default for ScoreTuning {
    fn default() -> Self {
        Self {
            collectible: 10,
            enemy: 50,
            powerup: 25,
            boss_hit: 100,
            boss_defeat: 500,
        }
    }
}

/// Lives, status windows and state-machine delays
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    pub starting_lives: u8,
    /// Damage immunity after a hit (s)
    pub invincibility: f32,
    /// Pause between touching the exit and the next level (s)
    pub level_transition: f32,
    /// Delay before the game-over screen is revealed (s)
    pub game_over_reveal: f32,
    /// Lifetime of a collected powerup effect (s)
    pub powerup_duration: f32,
    /// An unconsumed jump request expires after this long (s)
    pub jump_buffer: f32,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            invincibility: 2.0,
            level_transition: 1.5,
            game_over_reveal: 2.0,
            powerup_duration: 10.0,
            jump_buffer: 0.1,
        }
    }
}

/// Procedural level scaling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelTuning {
    pub base_width: f32,
    pub width_per_level: f32,
    pub base_collectibles: u32,
    pub collectibles_per_level: u32,
    pub base_enemies: u32,
    pub enemies_per_level: u32,
    pub base_enemy_speed: f32,
    pub enemy_speed_per_level: f32,
    /// Probability that a gap precedes the next floor segment
    pub gap_chance: f32,
    /// Probability that a gap gets a bridging platform
    pub bridge_chance: f32,
    pub gap_min: f32,
    pub gap_spread: f32,
    pub gap_per_level: f32,
    /// Widest gap the generator will emit (a running jump clears ~275 px)
    pub max_gap: f32,
    pub base_powerups: u32,
    /// Levels that are multiples of this get a boss (0 disables bosses)
    pub boss_every: u32,
    pub boss_speed: f32,
    /// Half-width of the boss patrol range
    pub boss_patrol: f32,
    pub boss_shoot_interval: f32,
    pub boss_shot_speed: f32,
}

impl Default for LevelTuning {
    fn default() -> Self {
        Self {
            base_width: 3000.0,
            width_per_level: 1000.0,
            base_collectibles: 15,
            collectibles_per_level: 5,
            base_enemies: 3,
            enemies_per_level: 2,
            base_enemy_speed: 60.0,
            enemy_speed_per_level: 15.0,
            gap_chance: 0.7,
            bridge_chance: 0.5,
            gap_min: 80.0,
            gap_spread: 120.0,
            gap_per_level: 10.0,
            max_gap: 260.0,
            base_powerups: 1,
            boss_every: 3,
            boss_speed: 80.0,
            boss_patrol: 200.0,
            boss_shoot_interval: 2.0,
            boss_shot_speed: 250.0,
        }
    }
}

impl LevelTuning {
    /// Level width grows linearly with the level index
    pub fn width_for(&self, level: u32) -> f32 {
        self.base_width + self.width_per_level * level as f32
    }

    pub fn collectibles_for(&self, level: u32) -> u32 {
        self.base_collectibles + self.collectibles_per_level * level
    }

    pub fn enemies_for(&self, level: u32) -> u32 {
        self.base_enemies + self.enemies_per_level * level
    }

    pub fn enemy_speed_for(&self, level: u32) -> f32 {
        self.base_enemy_speed + self.enemy_speed_per_level * level as f32
    }

    pub fn powerups_for(&self, level: u32) -> u32 {
        self.base_powerups + level / 2
    }

    pub fn has_boss(&self, level: u32) -> bool {
        self.boss_every > 0 && level > 0 && level.is_multiple_of(self.boss_every)
    }

    pub fn boss_health_for(&self, level: u32) -> u32 {
        3 + level / 3
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub score: ScoreTuning,
    pub session: SessionTuning,
    pub level: LevelTuning,
}

impl Tuning {
    /// Parse a (possibly partial) tuning document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid tuning JSON")
    }

    /// Parse a tuning document, falling back to defaults on error
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("{e:#}, using default tuning");
                Self::default()
            }
        }
    }
}
