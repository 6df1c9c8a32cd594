//! Game state and core simulation types
//!
//! Coordinates are screen-style: x grows right, y grows down. Entities are
//! positioned by their center; platforms by their top-left corner.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::level::generate_level;
use super::timer::Timers;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing simulates
    Menu,
    /// Active gameplay
    Playing,
    /// Exit reached; physics frozen until the transition timer fires
    LevelComplete,
    /// Run ended
    GameOver,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Resting on a surface this tick
    pub grounded: bool,
    pub facing_right: bool,
    /// Walk cycle frame (0..WALK_FRAMES)
    pub walk_frame: u8,
    pub walk_timer: f32,
    /// Damage is ignored while set
    pub invincible: bool,
    pub invincible_timer: f32,
    /// Session clock time the shield runs out
    pub shield_until: Option<f32>,
    /// Session clock time the double jump runs out
    pub double_jump_until: Option<f32>,
    /// Mid-air jump already spent this airtime
    pub air_jump_used: bool,
}

impl Player {
    pub fn new(start: Vec2) -> Self {
        Self {
            pos: start,
            vel: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            grounded: false,
            facing_right: true,
            walk_frame: 0,
            walk_timer: 0.0,
            invincible: false,
            invincible_timer: 0.0,
            shield_until: None,
            double_jump_until: None,
            air_jump_used: false,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }

    /// Put the player back at `start` with no residual motion
    pub fn respawn(&mut self, start: Vec2) {
        self.pos = start;
        self.vel = Vec2::ZERO;
        self.grounded = false;
        self.air_jump_used = false;
    }

    pub fn is_shielded(&self, now: f32) -> bool {
        self.shield_until.is_some_and(|t| now < t)
    }

    pub fn has_double_jump(&self, now: f32) -> bool {
        self.double_jump_until.is_some_and(|t| now < t)
    }

    /// Clear status effects whose expiry has passed
    pub fn expire_effects(&mut self, now: f32) {
        if self.shield_until.is_some_and(|t| now >= t) {
            self.shield_until = None;
        }
        if self.double_jump_until.is_some_and(|t| now >= t) {
            self.double_jump_until = None;
        }
    }

    /// Start the post-hit immunity window
    pub fn make_invincible(&mut self, seconds: f32) {
        self.invincible = true;
        self.invincible_timer = seconds;
    }

    /// Count down the immunity window
    pub fn tick_invincibility(&mut self, dt: f32) {
        if self.invincible {
            self.invincible_timer -= dt;
            if self.invincible_timer <= 0.0 {
                self.invincible = false;
                self.invincible_timer = 0.0;
            }
        }
    }
}

/// A static floating platform (top-left anchored)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Platform {
    pub fn new(x: f32, y: f32, w: f32) -> Self {
        Self {
            x,
            y,
            w,
            h: PLATFORM_HEIGHT,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }
}

/// A stretch of ground at the level's ground line; gaps between
/// segments are pits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloorSegment {
    pub x: f32,
    pub w: f32,
}

impl FloorSegment {
    pub fn end(&self) -> f32 {
        self.x + self.w
    }
}

/// A patrolling enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
    pub size: Vec2,
    pub vx: f32,
    pub alive: bool,
    pub anim_phase: f32,
}

impl Enemy {
    pub fn new(pos: Vec2, vx: f32) -> Self {
        Self {
            pos,
            size: Vec2::splat(ENEMY_SIZE),
            vx,
            alive: true,
            anim_phase: 0.0,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }
}

/// A microchip pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub pos: Vec2,
    pub size: Vec2,
    pub collected: bool,
    pub anim_phase: f32,
}

impl Collectible {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            size: Vec2::splat(COLLECTIBLE_SIZE),
            collected: false,
            anim_phase: 0.0,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerupKind {
    /// Absorbs the next hit
    Shield,
    /// One extra jump in mid-air
    DoubleJump,
}

/// A power-up pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Powerup {
    pub pos: Vec2,
    pub kind: PowerupKind,
    /// Still waiting to be picked up
    pub active: bool,
    /// Session clock time the granted effect ends (set on pickup)
    pub expires_at: Option<f32>,
}

impl Powerup {
    pub fn new(pos: Vec2, kind: PowerupKind) -> Self {
        Self {
            pos,
            kind,
            active: true,
            expires_at: None,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(POWERUP_SIZE))
    }
}

/// The level guardian
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub pos: Vec2,
    pub size: Vec2,
    pub health: u32,
    pub max_health: u32,
    /// +1.0 right, -1.0 left
    pub direction: f32,
    pub speed: f32,
    /// Patrol range (center x)
    pub patrol_min: f32,
    pub patrol_max: f32,
    /// Seconds until the next shot
    pub shoot_timer: f32,
    /// Ignores stomps while > 0 so one landing is one hit
    pub hit_cooldown: f32,
}

impl Boss {
    pub fn hitbox(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }
}

/// A projectile fired by the boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossShot {
    pub pos: Vec2,
    pub vel: Vec2,
    pub ttl: f32,
}

impl BossShot {
    pub fn hitbox(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(BOSS_SHOT_SIZE))
    }
}

/// The wormhole that ends a level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exit {
    pub pos: Vec2,
    pub size: Vec2,
    pub anim_phase: f32,
}

impl Exit {
    pub fn hitbox(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }
}

/// Everything generated for one level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    /// 1-based level number
    pub index: u32,
    pub width: f32,
    pub ground_y: f32,
    /// Player spawn point
    pub start: Vec2,
    pub platforms: Vec<Platform>,
    pub floor: Vec<FloorSegment>,
    pub enemies: Vec<Enemy>,
    pub collectibles: Vec<Collectible>,
    pub powerups: Vec<Powerup>,
    pub boss: Option<Boss>,
    pub shots: Vec<BossShot>,
    pub exit: Exit,
}

impl Level {
    /// Falling below this costs a life
    pub fn fall_limit(&self) -> f32 {
        self.ground_y + GROUND_MARGIN + FALL_MARGIN
    }

    pub fn remaining_collectibles(&self) -> usize {
        self.collectibles.iter().filter(|c| !c.collected).count()
    }
}

/// Visible area in world pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn ground_y(&self) -> f32 {
        self.height - GROUND_MARGIN
    }

    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

/// Horizontal scroll offset
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f32,
}

impl Camera {
    /// Ease toward keeping the player a third into the screen, clamped to
    /// the level bounds
    pub fn follow(&mut self, player_x: f32, viewport: &Viewport, level_width: f32, rate: f32, dt: f32) {
        let target = player_x - viewport.width * CAMERA_LEAD;
        self.x = crate::approach(self.x, target, rate, dt);
        let max_x = (level_width - viewport.width).max(0.0);
        self.x = self.x.clamp(0.0, max_x);
    }
}

/// Audio cue for the sound collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    Jump,
    Coin,
    Hit,
    Wormhole,
}

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped { air: bool },
    CollectiblePicked { pos: Vec2 },
    PowerupCollected { kind: PowerupKind },
    EnemyDefeated { pos: Vec2 },
    PlayerHit { lives_left: u8 },
    ShieldAbsorbed,
    FellOut { lives_left: u8 },
    BossHit { health_left: u32 },
    BossDefeated { pos: Vec2 },
    ExitReached { level: u32 },
    LevelStarted { level: u32 },
    GameOver { score: u64, level: u32 },
    GameOverRevealed { score: u64, level: u32 },
}

impl GameEvent {
    /// Sound to play for this event, if any
    pub fn cue(&self) -> Option<Cue> {
        match self {
            GameEvent::Jumped { .. } => Some(Cue::Jump),
            GameEvent::CollectiblePicked { .. } | GameEvent::PowerupCollected { .. } => {
                Some(Cue::Coin)
            }
            GameEvent::EnemyDefeated { .. }
            | GameEvent::PlayerHit { .. }
            | GameEvent::ShieldAbsorbed
            | GameEvent::BossHit { .. }
            | GameEvent::BossDefeated { .. } => Some(Cue::Hit),
            GameEvent::ExitReached { .. } => Some(Cue::Wormhole),
            GameEvent::FellOut { .. }
            | GameEvent::LevelStarted { .. }
            | GameEvent::GameOver { .. }
            | GameEvent::GameOverRevealed { .. } => None,
        }
    }
}

/// Run progress: level, score, lives and phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Current level (1-based)
    pub level: u32,
    pub score: u64,
    pub lives: u8,
    pub phase: GamePhase,
}

impl GameState {
    pub fn new(lives: u8) -> Self {
        Self {
            level: 1,
            score: 0,
            lives,
            phase: GamePhase::Menu,
        }
    }
}

/// One play session: the single owner of all mutable game state
#[derive(Debug, Clone)]
pub struct Session {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub viewport: Viewport,
    pub state: GameState,
    pub player: Player,
    pub level: Level,
    pub camera: Camera,
    pub timers: Timers,
    /// Simulated seconds since the session was created
    pub clock: f32,
}

impl Session {
    /// Create a session sitting on the menu with level 1 already laid out
    pub fn new(seed: u64, tuning: Tuning, viewport: Viewport) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let level = generate_level(1, viewport.ground_y(), &tuning.level, &mut rng);
        let player = Player::new(level.start);
        let state = GameState::new(tuning.session.starting_lives);
        Self {
            seed,
            rng,
            tuning,
            viewport,
            state,
            player,
            level,
            camera: Camera::default(),
            timers: Timers::default(),
            clock: 0.0,
        }
    }

    /// Default tuning and viewport
    pub fn with_seed(seed: u64) -> Self {
        Self::new(seed, Tuning::default(), Viewport::default())
    }

    /// Begin a fresh run at level 1
    pub fn start(&mut self) {
        self.timers.cancel_all();
        self.state = GameState::new(self.tuning.session.starting_lives);
        self.player = Player::new(self.level.start);
        self.load_level(1);
        self.state.phase = GamePhase::Playing;
        log::info!("Run started (seed {})", self.seed);
    }

    /// Restart after a game over. Returns false (and does nothing) in any
    /// other phase.
    pub fn retry(&mut self) -> bool {
        if self.state.phase != GamePhase::GameOver {
            return false;
        }
        self.start();
        true
    }

    /// Back to the title screen, dropping any pending transition
    pub fn quit_to_menu(&mut self) {
        self.timers.cancel_all();
        self.state.phase = GamePhase::Menu;
    }

    /// Replace the current level with a freshly generated one and put the
    /// player and camera back at its start
    pub fn load_level(&mut self, index: u32) {
        self.level = generate_level(
            index,
            self.viewport.ground_y(),
            &self.tuning.level,
            &mut self.rng,
        );
        self.state.level = index;
        self.player.respawn(self.level.start);
        self.camera = Camera::default();
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_sits_on_menu() {
        let session = Session::with_seed(7);
        assert_eq!(session.state.phase, GamePhase::Menu);
        assert_eq!(session.state.level, 1);
        assert_eq!(session.state.lives, 3);
        assert_eq!(session.player.pos, session.level.start);
    }

    #[test]
    fn test_start_resets_run() {
        let mut session = Session::with_seed(7);
        session.state.score = 500;
        session.state.lives = 1;
        session.state.level = 4;
        session.start();
        assert_eq!(session.state.phase, GamePhase::Playing);
        assert_eq!(session.state.score, 0);
        assert_eq!(session.state.lives, 3);
        assert_eq!(session.state.level, 1);
        assert_eq!(session.level.index, 1);
    }

    #[test]
    fn test_retry_only_from_game_over() {
        let mut session = Session::with_seed(7);
        session.start();
        session.state.score = 120;
        assert!(!session.retry());
        assert_eq!(session.state.score, 120);

        session.state.phase = GamePhase::GameOver;
        assert!(session.retry());
        assert_eq!(session.state.phase, GamePhase::Playing);
        assert_eq!(session.state.score, 0);
    }

    #[test]
    fn test_load_level_resets_player_and_camera() {
        let mut session = Session::with_seed(7);
        session.start();
        session.player.pos = Vec2::new(1234.0, 50.0);
        session.player.vel = Vec2::new(200.0, -300.0);
        session.camera.x = 900.0;
        session.load_level(2);
        assert_eq!(session.player.pos, session.level.start);
        assert_eq!(session.player.vel, Vec2::ZERO);
        assert_eq!(session.camera.x, 0.0);
        assert_eq!(session.state.level, 2);
    }

    #[test]
    fn test_player_effects_expire() {
        let mut player = Player::new(Vec2::ZERO);
        player.shield_until = Some(5.0);
        player.double_jump_until = Some(3.0);
        assert!(player.is_shielded(4.0));
        assert!(player.has_double_jump(2.0));
        player.expire_effects(4.0);
        assert!(player.shield_until.is_some());
        assert!(player.double_jump_until.is_none());
    }

    #[test]
    fn test_invincibility_window_counts_down() {
        let mut player = Player::new(Vec2::ZERO);
        player.make_invincible(0.1);
        player.tick_invincibility(0.05);
        assert!(player.invincible);
        player.tick_invincibility(0.06);
        assert!(!player.invincible);
    }

    #[test]
    fn test_camera_clamps_to_level() {
        let viewport = Viewport::new(960.0, 540.0);
        let mut camera = Camera::default();
        camera.follow(100.0, &viewport, 4000.0, 5.0, 1.0);
        assert_eq!(camera.x, 0.0);

        for _ in 0..100 {
            camera.follow(3990.0, &viewport, 4000.0, 5.0, 0.1);
        }
        assert!((camera.x - 3040.0).abs() < 0.01);
    }

    #[test]
    fn test_event_cues() {
        assert_eq!(GameEvent::Jumped { air: false }.cue(), Some(Cue::Jump));
        assert_eq!(GameEvent::ExitReached { level: 1 }.cue(), Some(Cue::Wormhole));
        assert_eq!(GameEvent::LevelStarted { level: 2 }.cue(), None);
    }
}
