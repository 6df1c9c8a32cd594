//! Per-frame simulation tick
//!
//! Core game loop that advances the session by one frame. Collision
//! resolution runs in a fixed order every tick: terrain, enemies and boss,
//! pickups, then the exit.

use glam::Vec2;

use super::collision::{first_landing, is_stomp};
use super::state::{
    BossShot, GameEvent, GamePhase, GameState, Player, PowerupKind, Session,
};
use super::timer::{Timer, Timers, fire};
use crate::consts::*;
use crate::tuning::Tuning;

/// Seconds a boss shot lives before it fizzles
const BOSS_SHOT_TTL: f32 = 4.0;
/// Boss only fires when the player is within this horizontal distance
const BOSS_SHOT_RANGE: f32 = 800.0;
/// Stomp immunity after the boss is hit
const BOSS_HIT_COOLDOWN: f32 = 0.5;

/// Input sampled for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Horizontal stick axis in [-1, 1]
    pub axis: f32,
    /// A jump request is pending
    pub jump: bool,
}

impl TickInput {
    /// Axis clamped to [-1, 1]; NaN reads as centered
    fn sanitized_axis(&self) -> f32 {
        if self.axis.is_finite() {
            self.axis.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Side effects of one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// Points gained this tick
    pub score_delta: u64,
    /// Lives gained (never) or lost this tick
    pub life_delta: i32,
    pub events: Vec<GameEvent>,
}

impl TickOutcome {
    /// A jump was performed, so the pending request is spent
    pub fn jumped(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, GameEvent::Jumped { .. }))
    }
}

impl Session {
    /// Advance the session by `dt` seconds
    pub fn step(&mut self, dt: f32, input: &TickInput) -> TickOutcome {
        tick(self, input, dt)
    }
}

/// Advance the session by one frame
pub fn tick(session: &mut Session, input: &TickInput, dt: f32) -> TickOutcome {
    let dt = if dt.is_finite() {
        dt.clamp(0.0, session.tuning.physics.max_dt)
    } else {
        0.0
    };
    let mut out = TickOutcome::default();

    match session.state.phase {
        GamePhase::Menu => return out,
        GamePhase::GameOver => {
            session.clock += dt;
            if fire(&mut session.timers.game_over_reveal, dt) {
                out.events.push(GameEvent::GameOverRevealed {
                    score: session.state.score,
                    level: session.state.level,
                });
            }
            return out;
        }
        GamePhase::LevelComplete => {
            session.clock += dt;
            if fire(&mut session.timers.level_transition, dt) {
                let next = session.state.level + 1;
                session.load_level(next);
                session.state.phase = GamePhase::Playing;
                log::info!("Level {} started (score {})", next, session.state.score);
                out.events.push(GameEvent::LevelStarted { level: next });
            }
            return out;
        }
        GamePhase::Playing => {}
    }

    session.clock += dt;
    let now = session.clock;

    let Session {
        tuning,
        state,
        player,
        level,
        camera,
        timers,
        viewport,
        ..
    } = session;

    player.expire_effects(now);

    // --- MOVEMENT ---
    let prev_y = player.pos.y;
    move_player(player, input, tuning, now, dt, &mut out);
    player.pos.x = player.pos.x.clamp(0.0, level.width);

    // --- TERRAIN ---
    player.grounded = false;
    if let Some(y) = first_landing(
        prev_y,
        player.pos,
        player.size,
        player.vel.y,
        &level.floor,
        &level.platforms,
        level.ground_y,
    ) {
        player.pos.y = y;
        player.vel.y = 0.0;
        player.grounded = true;
        player.air_jump_used = false;
    }

    // Touching the exit this tick wins over any damage taken this tick
    let reached_exit = player.hitbox().overlaps(&level.exit.hitbox());

    // --- ENEMIES ---
    for enemy in level.enemies.iter_mut().filter(|e| e.alive) {
        enemy.pos.x += enemy.vx * dt;
        enemy.anim_phase = (enemy.anim_phase + dt * 10.0) % 4.0;

        if enemy.pos.x < 0.0 {
            enemy.vx = enemy.vx.abs();
        } else if enemy.pos.x > level.width {
            enemy.vx = -enemy.vx.abs();
        }

        if !player.hitbox().overlaps(&enemy.hitbox()) {
            continue;
        }
        if is_stomp(player.pos, player.vel.y, enemy.pos) {
            enemy.alive = false;
            player.vel.y = tuning.physics.stomp_bounce;
            award(state, &mut out, tuning.score.enemy);
            log::debug!("Enemy defeated at {:?}", enemy.pos);
            out.events.push(GameEvent::EnemyDefeated { pos: enemy.pos });
        } else if !reached_exit {
            damage(player, state, timers, tuning, now, &mut out);
        }
    }

    // --- BOSS ---
    let mut defeated_at = None;
    if let Some(boss) = level.boss.as_mut() {
        boss.hit_cooldown = (boss.hit_cooldown - dt).max(0.0);

        boss.pos.x += boss.direction * boss.speed * dt;
        if boss.pos.x < boss.patrol_min {
            boss.pos.x = boss.patrol_min;
            boss.direction = 1.0;
        } else if boss.pos.x > boss.patrol_max {
            boss.pos.x = boss.patrol_max;
            boss.direction = -1.0;
        }

        boss.shoot_timer -= dt;
        if boss.shoot_timer <= 0.0 {
            boss.shoot_timer = tuning.level.boss_shoot_interval;
            let dx = player.pos.x - boss.pos.x;
            if dx.abs() < BOSS_SHOT_RANGE {
                let dir = if dx < 0.0 { -1.0 } else { 1.0 };
                level.shots.push(BossShot {
                    pos: boss.pos + Vec2::new(dir * boss.size.x / 2.0, 0.0),
                    vel: Vec2::new(dir * tuning.level.boss_shot_speed, 0.0),
                    ttl: BOSS_SHOT_TTL,
                });
            }
        }

        if player.hitbox().overlaps(&boss.hitbox()) {
            if is_stomp(player.pos, player.vel.y, boss.pos) {
                // Rest on top of the boss so the bounce starts clear of it
                player.pos.y = boss.hitbox().min.y - player.size.y / 2.0;
                player.vel.y = tuning.physics.stomp_bounce;
                if boss.hit_cooldown <= 0.0 {
                    boss.health = boss.health.saturating_sub(1);
                    boss.hit_cooldown = BOSS_HIT_COOLDOWN;
                    award(state, &mut out, tuning.score.boss_hit);
                    out.events.push(GameEvent::BossHit {
                        health_left: boss.health,
                    });
                    if boss.health == 0 {
                        // Capture where it died before the boss is cleared
                        defeated_at = Some(boss.pos);
                    }
                }
            } else if !reached_exit {
                damage(player, state, timers, tuning, now, &mut out);
            }
        }
    }
    if let Some(pos) = defeated_at {
        level.boss = None;
        level.shots.clear();
        award(state, &mut out, tuning.score.boss_defeat);
        log::info!("Boss defeated on level {}", state.level);
        out.events.push(GameEvent::BossDefeated { pos });
    }

    // --- BOSS SHOTS ---
    let width = level.width;
    let mut shot_hit = false;
    level.shots.retain_mut(|shot| {
        shot.pos += shot.vel * dt;
        shot.ttl -= dt;
        if player.hitbox().overlaps(&shot.hitbox()) {
            shot_hit = true;
            return false;
        }
        shot.ttl > 0.0 && shot.pos.x >= 0.0 && shot.pos.x <= width
    });
    if shot_hit && !reached_exit {
        damage(player, state, timers, tuning, now, &mut out);
    }

    player.tick_invincibility(dt);

    if state.phase == GamePhase::GameOver {
        return out;
    }

    // --- COLLECTIBLES ---
    for chip in level.collectibles.iter_mut().filter(|c| !c.collected) {
        chip.anim_phase = (chip.anim_phase + dt * 8.0) % 4.0;
        if player.hitbox().overlaps(&chip.hitbox()) {
            chip.collected = true;
            award(state, &mut out, tuning.score.collectible);
            out.events.push(GameEvent::CollectiblePicked { pos: chip.pos });
        }
    }

    // --- POWERUPS ---
    for powerup in level.powerups.iter_mut().filter(|p| p.active) {
        if player.hitbox().overlaps(&powerup.hitbox()) {
            let expires = now + tuning.session.powerup_duration;
            powerup.active = false;
            powerup.expires_at = Some(expires);
            match powerup.kind {
                PowerupKind::Shield => player.shield_until = Some(expires),
                PowerupKind::DoubleJump => player.double_jump_until = Some(expires),
            }
            award(state, &mut out, tuning.score.powerup);
            log::debug!("Picked up {:?}", powerup.kind);
            out.events.push(GameEvent::PowerupCollected { kind: powerup.kind });
        }
    }

    // --- EXIT ---
    level.exit.anim_phase = (level.exit.anim_phase + dt * 5.0) % 8.0;
    if reached_exit {
        state.phase = GamePhase::LevelComplete;
        timers.level_transition = Some(Timer::new(tuning.session.level_transition));
        log::info!("Level {} complete (score {})", state.level, state.score);
        out.events.push(GameEvent::ExitReached { level: state.level });
        return out;
    }

    // --- FALL OUT ---
    if player.pos.y > level.fall_limit() {
        state.lives = state.lives.saturating_sub(1);
        out.life_delta -= 1;
        out.events.push(GameEvent::FellOut {
            lives_left: state.lives,
        });
        if state.lives == 0 {
            game_over(state, timers, tuning, &mut out);
            return out;
        }
        player.respawn(level.start);
        camera.x = 0.0;
    }

    camera.follow(
        player.pos.x,
        viewport,
        level.width,
        tuning.physics.camera_follow,
        dt,
    );

    out
}

/// Horizontal easing, jump and gravity, then integrate position
fn move_player(
    player: &mut Player,
    input: &TickInput,
    tuning: &Tuning,
    now: f32,
    dt: f32,
    out: &mut TickOutcome,
) {
    let physics = &tuning.physics;
    let axis = input.sanitized_axis();

    if axis.abs() > INPUT_DEAD_ZONE {
        let target = axis * physics.max_speed;
        player.vel.x = crate::approach(player.vel.x, target, physics.acceleration, dt);
        player.facing_right = axis > 0.0;

        player.walk_timer += dt;
        if player.walk_timer > WALK_FRAME_TIME {
            player.walk_frame = (player.walk_frame + 1) % WALK_FRAMES;
            player.walk_timer = 0.0;
        }
    } else {
        player.vel.x *= physics.release_decay.powf(dt);
        if player.vel.x.abs() < physics.stop_threshold {
            player.vel.x = 0.0;
        }
        player.walk_frame = 0;
    }

    player.vel.y += physics.gravity * dt;

    if input.jump {
        if player.grounded {
            player.vel.y = physics.jump_impulse;
            player.grounded = false;
            out.events.push(GameEvent::Jumped { air: false });
        } else if player.has_double_jump(now) && !player.air_jump_used {
            player.vel.y = physics.jump_impulse;
            player.air_jump_used = true;
            out.events.push(GameEvent::Jumped { air: true });
        }
    }

    player.pos += player.vel * dt;
}

fn award(state: &mut GameState, out: &mut TickOutcome, points: u64) {
    state.score += points;
    out.score_delta += points;
}

/// Apply one hit to the player, honoring invincibility and shields
fn damage(
    player: &mut Player,
    state: &mut GameState,
    timers: &mut Timers,
    tuning: &Tuning,
    now: f32,
    out: &mut TickOutcome,
) {
    if player.invincible || state.phase != GamePhase::Playing {
        return;
    }
    if player.is_shielded(now) {
        player.shield_until = None;
        player.make_invincible(tuning.session.invincibility);
        out.events.push(GameEvent::ShieldAbsorbed);
        return;
    }

    state.lives = state.lives.saturating_sub(1);
    out.life_delta -= 1;
    player.make_invincible(tuning.session.invincibility);
    out.events.push(GameEvent::PlayerHit {
        lives_left: state.lives,
    });
    if state.lives == 0 {
        game_over(state, timers, tuning, out);
    }
}

fn game_over(state: &mut GameState, timers: &mut Timers, tuning: &Tuning, out: &mut TickOutcome) {
    state.phase = GamePhase::GameOver;
    timers.level_transition = None;
    timers.game_over_reveal = Some(Timer::new(tuning.session.game_over_reveal));
    log::info!("Game over: score {}, level {}", state.score, state.level);
    out.events.push(GameEvent::GameOver {
        score: state.score,
        level: state.level,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{
        Boss, Collectible, Enemy, Exit, FloorSegment, Level, Platform, Powerup,
    };

    const DT: f32 = 1.0 / 60.0;
    const GROUND: f32 = 440.0;

    /// A flat, empty level with the exit far away
    fn flat_session() -> Session {
        let mut session = Session::with_seed(1);
        session.start();
        session.level = Level {
            index: 1,
            width: 4000.0,
            ground_y: GROUND,
            start: Vec2::new(100.0, GROUND - 100.0),
            platforms: Vec::new(),
            floor: vec![FloorSegment { x: 0.0, w: 4000.0 }],
            enemies: Vec::new(),
            collectibles: Vec::new(),
            powerups: Vec::new(),
            boss: None,
            shots: Vec::new(),
            exit: Exit {
                pos: Vec2::new(3800.0, GROUND - 40.0),
                size: Vec2::new(EXIT_WIDTH, EXIT_HEIGHT),
                anim_phase: 0.0,
            },
        };
        session.player = Player::new(Vec2::new(100.0, GROUND - PLAYER_HEIGHT / 2.0));
        session.player.grounded = true;
        session
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_rest_on_ground_is_steady() {
        let mut session = flat_session();
        let y = session.player.pos.y;
        for _ in 0..10 {
            tick(&mut session, &idle(), DT);
            assert_eq!(session.player.pos.y, y);
            assert!(session.player.grounded);
            assert_eq!(session.player.vel, Vec2::ZERO);
        }
    }

    #[test]
    fn test_jump_from_ground() {
        let mut session = flat_session();
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        let out = tick(&mut session, &jump, DT);
        assert_eq!(session.player.vel.y, session.tuning.physics.jump_impulse);
        assert!(!session.player.grounded);
        assert!(out.jumped());
    }

    #[test]
    fn test_jump_ignored_in_air() {
        let mut session = flat_session();
        session.player.pos.y -= 200.0;
        session.player.grounded = false;
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        let out = tick(&mut session, &jump, DT);
        assert!(!out.jumped());
        assert!(session.player.vel.y > 0.0);
    }

    #[test]
    fn test_double_jump_once_per_airtime() {
        let mut session = flat_session();
        session.player.pos.y -= 200.0;
        session.player.grounded = false;
        session.player.double_jump_until = Some(100.0);
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        let out = tick(&mut session, &jump, DT);
        assert_eq!(out.events, vec![GameEvent::Jumped { air: true }]);
        let out = tick(&mut session, &jump, DT);
        assert!(!out.jumped());
    }

    #[test]
    fn test_horizontal_easing_and_release() {
        let mut session = flat_session();
        let right = TickInput {
            axis: 1.0,
            ..Default::default()
        };
        for _ in 0..60 {
            tick(&mut session, &right, DT);
        }
        let vx = session.player.vel.x;
        assert!(vx > 290.0 && vx <= 300.0, "vx = {vx}");
        assert!(session.player.facing_right);

        for _ in 0..120 {
            tick(&mut session, &idle(), DT);
        }
        assert_eq!(session.player.vel.x, 0.0);
    }

    #[test]
    fn test_dead_zone_counts_as_released() {
        let mut session = flat_session();
        session.player.vel.x = 100.0;
        let nudge = TickInput {
            axis: 0.05,
            ..Default::default()
        };
        tick(&mut session, &nudge, DT);
        assert!(session.player.vel.x < 100.0 * 0.95);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut session = flat_session();
        session.player.pos.y -= 200.0;
        session.player.grounded = false;
        tick(&mut session, &idle(), 5.0);
        let g = session.tuning.physics.gravity;
        let max_dt = session.tuning.physics.max_dt;
        assert!((session.player.vel.y - g * max_dt).abs() < 0.001);
        assert!((session.clock - max_dt).abs() < 0.0001);
    }

    #[test]
    fn test_landing_on_platform() {
        let mut session = flat_session();
        session.level.platforms.push(Platform {
            x: 50.0,
            y: 300.0,
            w: 100.0,
            h: 20.0,
        });
        session.player.pos = Vec2::new(100.0, 300.0 - 30.0 - 2.0);
        session.player.vel = Vec2::new(0.0, 240.0);
        session.player.grounded = false;
        tick(&mut session, &idle(), DT);
        assert_eq!(session.player.pos.y, 270.0);
        assert_eq!(session.player.vel.y, 0.0);
        assert!(session.player.grounded);
    }

    #[test]
    fn test_stomp_defeats_enemy() {
        let mut session = flat_session();
        session.level.enemies.push(Enemy::new(Vec2::new(100.0, 300.0), 0.0));
        session.player.pos = Vec2::new(100.0, 260.0);
        session.player.vel = Vec2::new(0.0, 200.0);
        session.player.grounded = false;
        let out = tick(&mut session, &idle(), DT);
        assert!(!session.level.enemies[0].alive);
        assert_eq!(session.player.vel.y, session.tuning.physics.stomp_bounce);
        assert_eq!(out.score_delta, session.tuning.score.enemy);
        assert_eq!(session.state.lives, 3);

        // A defeated enemy never interacts again
        let out = tick(&mut session, &idle(), DT);
        assert_eq!(out.score_delta, 0);
    }

    #[test]
    fn test_side_contact_damages_and_grants_invincibility() {
        let mut session = flat_session();
        let y = session.player.pos.y;
        session.level.enemies.push(Enemy::new(Vec2::new(120.0, y), 0.0));
        let out = tick(&mut session, &idle(), DT);
        assert_eq!(session.state.lives, 2);
        assert_eq!(out.life_delta, -1);
        assert!(session.player.invincible);

        // Still overlapping, but the window suppresses further damage
        let out = tick(&mut session, &idle(), DT);
        assert_eq!(session.state.lives, 2);
        assert_eq!(out.life_delta, 0);
    }

    #[test]
    fn test_shield_absorbs_hit() {
        let mut session = flat_session();
        let y = session.player.pos.y;
        session.player.shield_until = Some(100.0);
        session.level.enemies.push(Enemy::new(Vec2::new(120.0, y), 0.0));
        let out = tick(&mut session, &idle(), DT);
        assert_eq!(session.state.lives, 3);
        assert!(out.events.contains(&GameEvent::ShieldAbsorbed));
        assert!(session.player.shield_until.is_none());
        assert!(session.player.invincible);
    }

    #[test]
    fn test_last_life_ends_game_same_tick() {
        let mut session = flat_session();
        let y = session.player.pos.y;
        session.state.lives = 1;
        session.level.enemies.push(Enemy::new(Vec2::new(120.0, y), 0.0));
        let out = tick(&mut session, &idle(), DT);
        assert_eq!(session.state.lives, 0);
        assert_eq!(session.state.phase, GamePhase::GameOver);
        assert!(out.events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })));
        assert!(session.timers.game_over_reveal.is_some());
    }

    #[test]
    fn test_game_over_reveal_fires_once() {
        let mut session = flat_session();
        session.state.lives = 1;
        session.player.pos.y = GROUND + 500.0;
        session.player.grounded = false;
        tick(&mut session, &idle(), DT);
        assert_eq!(session.state.phase, GamePhase::GameOver);

        let mut reveals = 0;
        for _ in 0..200 {
            let out = tick(&mut session, &idle(), DT);
            reveals += out
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::GameOverRevealed { .. }))
                .count();
        }
        assert_eq!(reveals, 1);
    }

    #[test]
    fn test_collectible_awarded_once() {
        let mut session = flat_session();
        let pos = session.player.pos;
        session.level.collectibles.push(Collectible::new(pos));
        let out = tick(&mut session, &idle(), DT);
        assert_eq!(out.score_delta, session.tuning.score.collectible);
        assert!(session.level.collectibles[0].collected);

        let out = tick(&mut session, &idle(), DT);
        assert_eq!(out.score_delta, 0);
        assert_eq!(session.state.score, session.tuning.score.collectible);
    }

    #[test]
    fn test_powerup_grants_timed_effect() {
        let mut session = flat_session();
        let pos = session.player.pos;
        session.level.powerups.push(Powerup::new(pos, PowerupKind::Shield));
        tick(&mut session, &idle(), DT);
        let powerup = &session.level.powerups[0];
        assert!(!powerup.active);
        let expires = powerup.expires_at.expect("expiry set on pickup");
        assert_eq!(session.player.shield_until, Some(expires));
        assert!(session.player.is_shielded(session.clock));
        assert!(!session.player.is_shielded(expires));
    }

    #[test]
    fn test_exit_wins_over_damage() {
        let mut session = flat_session();
        let y = session.player.pos.y;
        session.state.lives = 1;
        session.level.exit.pos = Vec2::new(100.0, GROUND - 40.0);
        session.level.enemies.push(Enemy::new(Vec2::new(120.0, y), 0.0));
        let out = tick(&mut session, &idle(), DT);
        assert_eq!(session.state.phase, GamePhase::LevelComplete);
        assert_eq!(session.state.lives, 1);
        assert!(out.events.contains(&GameEvent::ExitReached { level: 1 }));
    }

    #[test]
    fn test_level_transition_after_delay() {
        let mut session = flat_session();
        session.level.exit.pos = Vec2::new(100.0, GROUND - 40.0);
        tick(&mut session, &idle(), DT);
        assert_eq!(session.state.phase, GamePhase::LevelComplete);

        // Physics is frozen during the transition
        let frozen = session.player.pos;
        let right = TickInput {
            axis: 1.0,
            ..Default::default()
        };
        tick(&mut session, &right, DT);
        assert_eq!(session.player.pos, frozen);

        let mut started = None;
        for _ in 0..200 {
            let out = tick(&mut session, &idle(), DT);
            if let Some(GameEvent::LevelStarted { level }) = out.events.first() {
                started = Some(*level);
                break;
            }
        }
        assert_eq!(started, Some(2));
        assert_eq!(session.state.phase, GamePhase::Playing);
        assert_eq!(session.state.level, 2);
        assert_eq!(session.level.index, 2);
        assert_eq!(session.player.pos, session.level.start);
    }

    #[test]
    fn test_retry_cancels_pending_transition() {
        let mut session = flat_session();
        session.level.exit.pos = Vec2::new(100.0, GROUND - 40.0);
        tick(&mut session, &idle(), DT);
        assert!(session.timers.level_transition.is_some());

        session.state.phase = GamePhase::GameOver;
        assert!(session.retry());
        assert!(session.timers.is_idle());
        for _ in 0..200 {
            let out = tick(&mut session, &idle(), DT);
            assert!(!out.events.iter().any(|e| matches!(e, GameEvent::LevelStarted { .. })));
        }
        assert_eq!(session.state.level, 1);
    }

    #[test]
    fn test_fall_costs_life_and_respawns() {
        let mut session = flat_session();
        session.camera.x = 500.0;
        session.player.pos = Vec2::new(900.0, GROUND + 500.0);
        session.player.grounded = false;
        let out = tick(&mut session, &idle(), DT);
        assert_eq!(out.life_delta, -1);
        assert_eq!(session.state.lives, 2);
        assert_eq!(session.player.pos, session.level.start);
        assert_eq!(session.player.vel, Vec2::ZERO);
        assert_eq!(session.state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_enemy_bounces_at_level_edge() {
        let mut session = flat_session();
        session.level.enemies.push(Enemy::new(Vec2::new(3999.0, 200.0), 120.0));
        tick(&mut session, &idle(), DT);
        assert!(session.level.enemies[0].vx < 0.0);
    }

    fn boss_at(pos: Vec2, health: u32) -> Boss {
        Boss {
            pos,
            size: Vec2::splat(BOSS_SIZE),
            health,
            max_health: health,
            direction: 1.0,
            speed: 0.0,
            patrol_min: pos.x - 100.0,
            patrol_max: pos.x + 100.0,
            shoot_timer: 100.0,
            hit_cooldown: 0.0,
        }
    }

    #[test]
    fn test_boss_defeat_reports_position() {
        let mut session = flat_session();
        let boss_pos = Vec2::new(500.0, GROUND - BOSS_SIZE / 2.0);
        session.level.boss = Some(boss_at(boss_pos, 1));
        session.player.pos = Vec2::new(500.0, boss_pos.y - 60.0);
        session.player.vel = Vec2::new(0.0, 200.0);
        session.player.grounded = false;
        let out = tick(&mut session, &idle(), DT);
        assert!(session.level.boss.is_none());
        assert!(out.events.contains(&GameEvent::BossDefeated { pos: boss_pos }));
        let score = &session.tuning.score;
        assert_eq!(out.score_delta, score.boss_hit + score.boss_defeat);
    }

    #[test]
    fn test_boss_hit_cooldown() {
        let mut session = flat_session();
        let boss_pos = Vec2::new(500.0, GROUND - BOSS_SIZE / 2.0);
        session.level.boss = Some(boss_at(boss_pos, 3));
        session.player.pos = Vec2::new(500.0, boss_pos.y - 60.0);
        session.player.vel = Vec2::new(0.0, 200.0);
        session.player.grounded = false;
        tick(&mut session, &idle(), DT);
        // Force a second stomp before the cooldown runs out
        session.player.pos = Vec2::new(500.0, boss_pos.y - 60.0);
        session.player.vel = Vec2::new(0.0, 200.0);
        tick(&mut session, &idle(), DT);
        assert_eq!(session.level.boss.as_ref().map(|b| b.health), Some(2));
    }

    #[test]
    fn test_boss_stomp_bounces_clear_without_damage() {
        let mut session = flat_session();
        let boss_pos = Vec2::new(500.0, GROUND - BOSS_SIZE / 2.0);
        session.level.boss = Some(boss_at(boss_pos, 3));
        let top = boss_pos.y - BOSS_SIZE / 2.0;
        session.player.pos = Vec2::new(500.0, top - PLAYER_HEIGHT / 2.0 - 2.0);
        session.player.vel = Vec2::new(0.0, 600.0);
        session.player.grounded = false;

        let out = tick(&mut session, &idle(), DT);
        assert_eq!(out.events, vec![GameEvent::BossHit { health_left: 2 }]);
        // Rising and falling back toward the boss inside the cooldown
        for _ in 0..20 {
            let out = tick(&mut session, &idle(), DT);
            assert_eq!(out.life_delta, 0);
        }
        assert_eq!(session.state.lives, 3);
        assert_eq!(session.level.boss.as_ref().map(|b| b.health), Some(2));
    }

    #[test]
    fn test_fast_fall_lands_instead_of_falling_through() {
        let mut session = flat_session();
        session.player.pos.y = GROUND - PLAYER_HEIGHT / 2.0 - 1.0;
        session.player.vel.y = 962.0;
        session.player.grounded = false;
        let out = tick(&mut session, &idle(), 1.0 / 30.0);
        assert_eq!(out.life_delta, 0);
        assert!(session.player.grounded);
        assert_eq!(session.player.pos, Vec2::new(100.0, GROUND - PLAYER_HEIGHT / 2.0));
        assert_eq!(session.state.lives, 3);
    }

    #[test]
    fn test_boss_shot_damages_player() {
        let mut session = flat_session();
        let mut boss = boss_at(Vec2::new(400.0, GROUND - BOSS_SIZE / 2.0), 3);
        boss.shoot_timer = 0.0;
        session.level.boss = Some(boss);
        let mut hit = false;
        for _ in 0..120 {
            let out = tick(&mut session, &idle(), DT);
            if out.life_delta < 0 {
                hit = true;
                break;
            }
        }
        assert!(hit);
        assert_eq!(session.state.lives, 2);
    }

    #[test]
    fn test_shot_spent_on_invincible_player() {
        let mut session = flat_session();
        session.player.make_invincible(2.0);
        let pos = session.player.pos;
        session.level.shots.push(BossShot {
            pos,
            vel: Vec2::ZERO,
            ttl: BOSS_SHOT_TTL,
        });
        let out = tick(&mut session, &idle(), DT);
        assert_eq!(out.life_delta, 0);
        assert!(session.level.shots.is_empty());
        assert_eq!(session.state.lives, 3);
    }

    #[test]
    fn test_menu_does_not_simulate() {
        let mut session = Session::with_seed(3);
        let before = session.player.pos;
        let out = tick(&mut session, &idle(), DT);
        assert_eq!(out, TickOutcome::default());
        assert_eq!(session.player.pos, before);
        assert_eq!(session.clock, 0.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn score_never_drops_and_lives_never_rise(
                seed in 0u64..500,
                moves in proptest::collection::vec((-1.0f32..=1.0, any::<bool>()), 30..200)
            ) {
                let mut session = Session::with_seed(seed);
                session.start();
                let mut score = session.state.score;
                let mut lives = session.state.lives;

                for (axis, jump) in moves {
                    let out = tick(&mut session, &TickInput { axis, jump }, DT);
                    prop_assert!(session.state.score >= score);
                    prop_assert!(session.state.lives <= lives);
                    prop_assert_eq!(session.state.score - score, out.score_delta);
                    prop_assert!(out.life_delta <= 0);
                    if session.state.lives == 0 {
                        prop_assert_eq!(session.state.phase, GamePhase::GameOver);
                    }
                    score = session.state.score;
                    lives = session.state.lives;
                }
            }

            #[test]
            fn collectibles_are_never_uncollected(
                seed in 0u64..200,
                moves in proptest::collection::vec(-1.0f32..=1.0, 30..200)
            ) {
                let mut session = Session::with_seed(seed);
                session.start();
                let level = session.state.level;
                let mut collected = vec![false; session.level.collectibles.len()];

                for axis in moves {
                    tick(&mut session, &TickInput { axis, jump: axis > 0.5 }, DT);
                    if session.state.level != level {
                        break;
                    }
                    for (seen, chip) in collected.iter_mut().zip(&session.level.collectibles) {
                        prop_assert!(!*seen || chip.collected);
                        *seen = chip.collected;
                    }
                }
            }
        }
    }
}
