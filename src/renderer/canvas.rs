//! Canvas2D drawing of a session snapshot

use std::f64::consts::TAU;

use anyhow::{Result, anyhow};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::platform::browser;
use crate::sim::{Aabb, GamePhase, PowerupKind, Session};

mod palette {
    pub const BOARD: &str = "#0b1f14";
    pub const TRACE: &str = "#14442a";
    pub const FLOOR: &str = "#1e6b3a";
    pub const FLOOR_EDGE: &str = "#c9a227";
    pub const PLATFORM: &str = "#2e8b57";
    pub const CHIP: &str = "#f2c94c";
    pub const ENEMY: &str = "#e5484d";
    pub const BOSS: &str = "#b3261e";
    pub const SHOT: &str = "#ff9f43";
    pub const WORMHOLE: &str = "#8e5cff";
    pub const PLAYER: &str = "#38d9f5";
    pub const SHIELD: &str = "#7cf7ff";
    pub const DOUBLE_JUMP: &str = "#a6ff4d";
    pub const TEXT: &str = "#e8fff0";
}

/// Presentation switches read from settings
#[derive(Debug, Clone, Copy, Default)]
pub struct DrawOptions {
    pub reduced_motion: bool,
}

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    dpr: f64,
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx = browser::context_2d(&canvas)?;
        let dpr = browser::window()?.device_pixel_ratio();
        let mut renderer = Self { canvas, ctx, dpr };
        renderer.resize();
        Ok(renderer)
    }

    /// Match the backing store to the element size; returns CSS size
    pub fn resize(&mut self) -> (f32, f32) {
        let (w, h) = browser::viewport_size(&self.canvas);
        self.canvas.set_width((w as f64 * self.dpr) as u32);
        self.canvas.set_height((h as f64 * self.dpr) as u32);
        (w, h)
    }

    pub fn draw(&self, session: &Session, time: f64, options: DrawOptions) -> Result<()> {
        let ctx = &self.ctx;
        let view = session.viewport;
        let level = &session.level;

        ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0)
            .map_err(|e| anyhow!("setTransform: {:?}", e))?;
        ctx.set_fill_style_str(palette::BOARD);
        ctx.fill_rect(0.0, 0.0, view.width as f64, view.height as f64);

        ctx.save();
        ctx.translate(-(session.camera.x as f64), 0.0)
            .map_err(|e| anyhow!("translate: {:?}", e))?;

        self.draw_traces(session);

        // Floor
        for segment in &level.floor {
            let h = (view.height - level.ground_y).max(0.0) as f64 + 200.0;
            ctx.set_fill_style_str(palette::FLOOR);
            ctx.fill_rect(segment.x as f64, level.ground_y as f64, segment.w as f64, h);
            ctx.set_fill_style_str(palette::FLOOR_EDGE);
            ctx.fill_rect(segment.x as f64, level.ground_y as f64, segment.w as f64, 3.0);
        }

        ctx.set_fill_style_str(palette::PLATFORM);
        for p in &level.platforms {
            ctx.fill_rect(p.x as f64, p.y as f64, p.w as f64, p.h as f64);
        }

        ctx.set_fill_style_str(palette::CHIP);
        for chip in level.collectibles.iter().filter(|c| !c.collected) {
            let bob = if options.reduced_motion {
                0.0
            } else {
                (chip.anim_phase as f64 * TAU / 4.0).sin() * 3.0
            };
            let mut b = chip.hitbox();
            b.min.y += bob as f32;
            b.max.y += bob as f32;
            self.fill_box(&b);
        }

        for powerup in level.powerups.iter().filter(|p| p.active) {
            let color = match powerup.kind {
                PowerupKind::Shield => palette::SHIELD,
                PowerupKind::DoubleJump => palette::DOUBLE_JUMP,
            };
            self.circle(powerup.pos.x, powerup.pos.y, 15.0, color)?;
        }

        ctx.set_fill_style_str(palette::ENEMY);
        for enemy in level.enemies.iter().filter(|e| e.alive) {
            self.fill_box(&enemy.hitbox());
        }

        if let Some(boss) = &level.boss {
            ctx.set_fill_style_str(palette::BOSS);
            self.fill_box(&boss.hitbox());
            // Health bar
            let b = boss.hitbox();
            let frac = boss.health as f64 / boss.max_health.max(1) as f64;
            ctx.set_fill_style_str(palette::TEXT);
            ctx.fill_rect(b.min.x as f64, b.min.y as f64 - 12.0, boss.size.x as f64 * frac, 5.0);
        }
        for shot in &level.shots {
            self.circle(shot.pos.x, shot.pos.y, 7.0, palette::SHOT)?;
        }

        self.draw_wormhole(session, options)?;
        self.draw_player(session, time)?;

        ctx.restore();

        self.draw_overlay(session)
    }

    /// Faint horizontal traces for parallax-free texture
    fn draw_traces(&self, session: &Session) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(palette::TRACE);
        let mut y = 40.0;
        while y < session.level.ground_y as f64 {
            ctx.fill_rect(0.0, y, session.level.width as f64, 1.0);
            y += 60.0;
        }
    }

    fn draw_wormhole(&self, session: &Session, options: DrawOptions) -> Result<()> {
        let exit = &session.level.exit;
        let spin = if options.reduced_motion {
            0.0
        } else {
            exit.anim_phase as f64
        };
        for ring in 0..3 {
            let r = exit.size.x / 2.0 - ring as f32 * 8.0;
            self.ctx.set_global_alpha(0.4 + 0.2 * ring as f64);
            self.circle(exit.pos.x, exit.pos.y, r + (spin + ring as f64).sin() as f32 * 2.0, palette::WORMHOLE)?;
        }
        self.ctx.set_global_alpha(1.0);
        Ok(())
    }

    fn draw_player(&self, session: &Session, time: f64) -> Result<()> {
        let player = &session.player;
        let now = session.clock;

        // Blink while invincible
        if player.invincible && ((time / 100.0) as i64) % 2 == 0 {
            return Ok(());
        }

        let color = if player.has_double_jump(now) {
            palette::DOUBLE_JUMP
        } else {
            palette::PLAYER
        };
        self.ctx.set_fill_style_str(color);
        let b = player.hitbox();
        // Squash slightly on alternate walk frames
        let squash = if player.walk_frame % 2 == 1 { 2.0 } else { 0.0 };
        self.ctx.fill_rect(
            b.min.x as f64,
            (b.min.y + squash) as f64,
            (b.max.x - b.min.x) as f64,
            (b.max.y - b.min.y - squash) as f64,
        );

        // Eye on the facing side
        let eye_x = if player.facing_right { b.max.x - 12.0 } else { b.min.x + 6.0 };
        self.ctx.set_fill_style_str(palette::BOARD);
        self.ctx.fill_rect(eye_x as f64, b.min.y as f64 + 12.0, 6.0, 6.0);

        if player.is_shielded(now) {
            self.ctx.set_stroke_style_str(palette::SHIELD);
            self.ctx.set_line_width(2.0);
            self.ctx.begin_path();
            self.ctx
                .arc(player.pos.x as f64, player.pos.y as f64, 42.0, 0.0, TAU)
                .map_err(|e| anyhow!("arc: {:?}", e))?;
            self.ctx.stroke();
        }
        Ok(())
    }

    /// Centered banner for non-playing phases
    fn draw_overlay(&self, session: &Session) -> Result<()> {
        let text = match session.state.phase {
            GamePhase::LevelComplete => format!("LEVEL {} COMPLETE", session.state.level),
            GamePhase::Playing | GamePhase::Menu | GamePhase::GameOver => return Ok(()),
        };
        let view = session.viewport;
        self.ctx.set_fill_style_str(palette::TEXT);
        self.ctx.set_font("bold 32px monospace");
        self.ctx.set_text_align("center");
        self.ctx
            .fill_text(&text, view.width as f64 / 2.0, view.height as f64 / 3.0)
            .map_err(|e| anyhow!("fillText: {:?}", e))
    }

    fn fill_box(&self, b: &Aabb) {
        self.ctx.fill_rect(
            b.min.x as f64,
            b.min.y as f64,
            (b.max.x - b.min.x) as f64,
            (b.max.y - b.min.y) as f64,
        );
    }

    fn circle(&self, x: f32, y: f32, r: f32, color: &str) -> Result<()> {
        self.ctx.set_fill_style_str(color);
        self.ctx.begin_path();
        self.ctx
            .arc(x as f64, y as f64, r.max(0.0) as f64, 0.0, TAU)
            .map_err(|e| anyhow!("arc: {:?}", e))?;
        self.ctx.fill();
        Ok(())
    }
}
