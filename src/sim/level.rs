//! Procedural level generation
//!
//! A level is laid out left to right: a floor with pits, platform
//! formations above it, then pickups and enemies anchored to that terrain.
//! All randomness comes from the caller's RNG so a seed reproduces a level.

use glam::Vec2;
use rand::Rng;

use super::state::{
    Boss, Collectible, Enemy, Exit, FloorSegment, Level, Platform, Powerup, PowerupKind,
};
use crate::consts::*;
use crate::tuning::LevelTuning;

/// No pits start this close to the right edge, so the exit always has ground
const EXIT_RUNWAY: f32 = 600.0;
/// The spawn segment is never interrupted before this x
const START_RUNWAY: f32 = 100.0;
/// Floor enemies are not placed left of this x
const ENEMY_SAFE_ZONE: f32 = 400.0;
/// First platform formation starts here
const FORMATION_START: f32 = 300.0;
/// Formations stop this far before the right edge
const FORMATION_END_MARGIN: f32 = 500.0;
/// Distance of the exit center from the right edge
const EXIT_INSET: f32 = 200.0;
/// Distance of the boss patrol center from the right edge
const BOSS_INSET: f32 = 600.0;

/// Platform formation shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Formation {
    /// Four ascending steps
    Staircase,
    /// Three platforms at one height
    FloatingRow,
    /// One wide platform up high
    HighPlatform,
}

impl Formation {
    /// 30% staircase, 30% row, 40% single high platform
    fn pick(rng: &mut impl Rng) -> Self {
        let roll: f32 = rng.random();
        if roll < 0.3 {
            Formation::Staircase
        } else if roll < 0.6 {
            Formation::FloatingRow
        } else {
            Formation::HighPlatform
        }
    }

    /// Emit the formation at `x`; returns the horizontal space it used
    fn place(
        self,
        x: f32,
        ground_y: f32,
        rng: &mut impl Rng,
        platforms: &mut Vec<Platform>,
    ) -> f32 {
        match self {
            Formation::Staircase => {
                for i in 0..4 {
                    let step = i as f32;
                    platforms.push(Platform::new(x + step * 80.0, ground_y - 60.0 - step * 50.0, 80.0));
                }
                400.0
            }
            Formation::FloatingRow => {
                let y = ground_y - 150.0 - rng.random::<f32>() * 100.0;
                for i in 0..3 {
                    platforms.push(Platform::new(x + i as f32 * 120.0, y, 80.0));
                }
                450.0
            }
            Formation::HighPlatform => {
                let y = ground_y - 180.0 - rng.random::<f32>() * 80.0;
                platforms.push(Platform::new(x, y, 120.0));
                250.0
            }
        }
    }
}

/// Generate level `index` (1-based) with its ground line at `ground_y`
pub fn generate_level(
    index: u32,
    ground_y: f32,
    tuning: &LevelTuning,
    rng: &mut impl Rng,
) -> Level {
    let width = tuning.width_for(index);

    let mut platforms = Vec::new();
    let floor = build_floor(index, width, ground_y, tuning, rng, &mut platforms);

    let mut x = FORMATION_START;
    while x < width - FORMATION_END_MARGIN {
        x += Formation::pick(rng).place(x, ground_y, rng, &mut platforms);
    }

    let collectibles = place_collectibles(index, width, ground_y, tuning, rng, &platforms);
    let enemies = place_enemies(index, ground_y, tuning, rng, &platforms, &floor);
    let powerups = place_powerups(index, tuning, rng, &platforms);

    let boss = tuning.has_boss(index).then(|| {
        let center = width - BOSS_INSET;
        Boss {
            pos: Vec2::new(center, ground_y - BOSS_SIZE / 2.0),
            size: Vec2::splat(BOSS_SIZE),
            health: tuning.boss_health_for(index),
            max_health: tuning.boss_health_for(index),
            direction: -1.0,
            speed: tuning.boss_speed,
            patrol_min: center - tuning.boss_patrol,
            patrol_max: center + tuning.boss_patrol,
            shoot_timer: tuning.boss_shoot_interval,
            hit_cooldown: 0.0,
        }
    });

    // Sits on the ground so walking into it is enough
    let exit = Exit {
        pos: Vec2::new(width - EXIT_INSET, ground_y - EXIT_HEIGHT / 2.0),
        size: Vec2::new(EXIT_WIDTH, EXIT_HEIGHT),
        anim_phase: 0.0,
    };

    let start = Vec2::new(PLAYER_START_X, ground_y - PLAYER_START_HEIGHT);

    log::info!(
        "Level {}: width={}, floor segments={}, platforms={}, chips={}, enemies={}, powerups={}, boss={}",
        index,
        width,
        floor.len(),
        platforms.len(),
        collectibles.len(),
        enemies.len(),
        powerups.len(),
        boss.is_some()
    );

    Level {
        index,
        width,
        ground_y,
        start,
        platforms,
        floor,
        enemies,
        collectibles,
        powerups,
        boss,
        shots: Vec::new(),
        exit,
    }
}

/// Walk left to right emitting floor segments, sometimes preceded by a pit.
/// Pits may get a bridging platform.
fn build_floor(
    index: u32,
    width: f32,
    ground_y: f32,
    tuning: &LevelTuning,
    rng: &mut impl Rng,
    platforms: &mut Vec<Platform>,
) -> Vec<FloorSegment> {
    let mut floor = Vec::new();
    let mut x = 0.0;
    while x < width {
        let segment_w = 200.0 + rng.random::<f32>() * 300.0;
        let can_gap = x > START_RUNWAY && x < width - EXIT_RUNWAY;
        if can_gap && rng.random::<f32>() < tuning.gap_chance {
            let gap = (tuning.gap_min
                + rng.random::<f32>() * tuning.gap_spread
                + tuning.gap_per_level * index as f32)
                .min(tuning.max_gap);
            if rng.random::<f32>() < tuning.bridge_chance {
                let y = ground_y - 80.0 - rng.random::<f32>() * 60.0;
                platforms.push(Platform::new(x + gap / 2.0 - 50.0, y, 100.0));
            }
            x += gap;
        }
        floor.push(FloorSegment { x, w: segment_w });
        x += segment_w;
    }
    floor
}

fn place_collectibles(
    index: u32,
    width: f32,
    ground_y: f32,
    tuning: &LevelTuning,
    rng: &mut impl Rng,
    platforms: &[Platform],
) -> Vec<Collectible> {
    let count = tuning.collectibles_for(index);
    let on_platforms = count / 2;
    let floating = count - on_platforms;
    let mut collectibles = Vec::with_capacity(count as usize);

    if !platforms.is_empty() {
        for _ in 0..on_platforms {
            let platform = &platforms[rng.random_range(0..platforms.len())];
            collectibles.push(Collectible::new(Vec2::new(platform.center_x(), platform.y - 40.0)));
        }
    }

    for _ in 0..floating {
        let x = 200.0 + rng.random::<f32>() * (width - 400.0);
        let y = ground_y - 100.0 - rng.random::<f32>() * 150.0;
        collectibles.push(Collectible::new(Vec2::new(x, y)));
    }

    collectibles
}

fn place_enemies(
    index: u32,
    ground_y: f32,
    tuning: &LevelTuning,
    rng: &mut impl Rng,
    platforms: &[Platform],
    floor: &[FloorSegment],
) -> Vec<Enemy> {
    let count = tuning.enemies_for(index);
    let speed = tuning.enemy_speed_for(index);
    let floor_spots: Vec<&FloorSegment> = floor
        .iter()
        .filter(|s| s.end() > ENEMY_SAFE_ZONE)
        .collect();

    let mut enemies = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let vx = if rng.random_bool(0.5) { speed } else { -speed };
        let on_platform = rng.random::<f32>() > 0.5 && !platforms.is_empty();
        if on_platform {
            let platform = &platforms[rng.random_range(0..platforms.len())];
            let pos = Vec2::new(platform.center_x(), platform.y - ENEMY_SIZE / 2.0);
            enemies.push(Enemy::new(pos, vx));
        } else if !floor_spots.is_empty() {
            let segment = floor_spots[rng.random_range(0..floor_spots.len())];
            let left = segment.x.max(ENEMY_SAFE_ZONE);
            let x = left + rng.random::<f32>() * (segment.end() - left);
            enemies.push(Enemy::new(Vec2::new(x, ground_y - ENEMY_SIZE / 2.0), vx));
        }
    }
    enemies
}

fn place_powerups(
    index: u32,
    tuning: &LevelTuning,
    rng: &mut impl Rng,
    platforms: &[Platform],
) -> Vec<Powerup> {
    if platforms.is_empty() {
        return Vec::new();
    }
    (0..tuning.powerups_for(index))
        .map(|_| {
            let platform = &platforms[rng.random_range(0..platforms.len())];
            let kind = if rng.random_bool(0.5) {
                PowerupKind::Shield
            } else {
                PowerupKind::DoubleJump
            };
            Powerup::new(Vec2::new(platform.center_x(), platform.y - 50.0), kind)
        })
        .collect()
}
