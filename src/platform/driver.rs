//! Render loop driver
//!
//! Owns the session for the lifetime of the page. Each display refresh the
//! front end calls `frame` with the refresh timestamp; the driver turns it
//! into a clamped delta, samples input and runs exactly one tick. Drawing
//! happens afterwards from `session()`.

use super::input::InputCell;
use super::time::{FpsCounter, FrameClock};
use crate::sim::{GamePhase, Session, TickOutcome, Viewport, tick};

pub struct LoopDriver {
    session: Session,
    clock: FrameClock,
    input: InputCell,
    fps: FpsCounter,
    running: bool,
    landscape: bool,
}

impl LoopDriver {
    pub fn new(session: Session) -> Self {
        let clock = FrameClock::new(session.tuning.physics.max_dt);
        let input = InputCell::new(session.tuning.session.jump_buffer);
        let landscape = session.viewport.is_landscape();
        Self {
            session,
            clock,
            input,
            fps: FpsCounter::default(),
            running: true,
            landscape,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn input(&self) -> &InputCell {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputCell {
        &mut self.input
    }

    pub fn fps(&self) -> u32 {
        self.fps.fps()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Gameplay only advances in landscape
    pub fn is_landscape(&self) -> bool {
        self.landscape
    }

    /// One display refresh. Returns the tick outcome, or `None` when the
    /// driver is stopped or gated by orientation.
    pub fn frame(&mut self, now_ms: f64) -> Option<TickOutcome> {
        if !self.running {
            return None;
        }
        self.fps.record(now_ms);
        if !self.landscape {
            self.clock.restart();
            return None;
        }

        let dt = self.clock.delta(now_ms);
        let input = self.input.sample();
        let outcome = tick(&mut self.session, &input, dt);
        self.input.after_tick(dt, outcome.jumped());
        Some(outcome)
    }

    /// Canvas resized or rotated
    pub fn resize(&mut self, width: f32, height: f32) {
        let viewport = Viewport::new(width, height);
        self.session.set_viewport(viewport);
        self.set_landscape(viewport.is_landscape());
    }

    pub fn set_landscape(&mut self, landscape: bool) {
        if landscape != self.landscape {
            log::info!(
                "Orientation changed: {}",
                if landscape { "landscape" } else { "portrait" }
            );
            // Resume without a delta spanning the time spent in portrait
            self.clock.restart();
        }
        self.landscape = landscape;
    }

    /// Start a run from the menu, or retry after game over
    pub fn start_or_retry(&mut self) -> bool {
        let started = match self.session.state.phase {
            GamePhase::Menu => {
                self.session.start();
                true
            }
            GamePhase::GameOver => self.session.retry(),
            GamePhase::Playing | GamePhase::LevelComplete => false,
        };
        if started {
            self.input.clear();
            self.clock.restart();
        }
        started
    }

    pub fn quit_to_menu(&mut self) {
        self.session.quit_to_menu();
        self.input.clear();
    }

    /// Lost focus or tab hidden: drop held input and restart timing
    pub fn suspend(&mut self) {
        self.input.clear();
        self.clock.restart();
    }

    /// Stop ticking for good; pending deferred transitions are dropped
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Loop driver stopped");
        }
        self.running = false;
        self.session.timers.cancel_all();
        self.input.clear();
    }
}
