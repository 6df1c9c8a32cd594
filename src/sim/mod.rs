//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (one Pcg32 per session)
//! - Stable iteration order (entity vectors are never reordered)
//! - No rendering or platform dependencies

pub mod collision;
pub mod level;
pub mod state;
pub mod tick;
pub mod timer;

pub use collision::{Aabb, first_landing, floor_landing, is_stomp, platform_landing};
pub use level::generate_level;
pub use state::{
    Boss, BossShot, Camera, Collectible, Cue, Enemy, Exit, FloorSegment, GameEvent, GamePhase,
    GameState, Level, Platform, Player, Powerup, PowerupKind, Session, Viewport,
};
pub use tick::{TickInput, TickOutcome, tick};
pub use timer::{Timer, Timers};
