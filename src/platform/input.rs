//! Input shared cell
//!
//! Event handlers write, the loop driver reads once per frame. The
//! horizontal axis comes from the touch stick or the arrow keys; jump is an
//! edge that stays pending until a tick honors it or it goes stale.

use crate::sim::TickInput;

/// Logical actions produced by keys and buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Left,
    Right,
    Jump,
    /// Start a run from the menu, or retry after game over
    Start,
    /// Back to the menu
    Quit,
}

/// Map a `KeyboardEvent.key` value to an action
pub fn action_for_key(key: &str) -> Option<Action> {
    match key {
        "ArrowLeft" | "a" | "A" => Some(Action::Left),
        "ArrowRight" | "d" | "D" => Some(Action::Right),
        " " | "ArrowUp" | "w" | "W" => Some(Action::Jump),
        "Enter" => Some(Action::Start),
        "Escape" => Some(Action::Quit),
        _ => None,
    }
}

/// Rows for the how-to-play screen: heading, then detail
pub const HOW_TO_PLAY: [(&str, &str); 6] = [
    ("Move", "Joystick, arrow keys or A/D"),
    ("Jump", "Jump button, Space, Up or W"),
    ("Collect Microchips", "Gather golden microchips for points"),
    ("Avoid Viruses", "Jump on them or dodge the red viruses"),
    ("Reach the Wormhole", "Enter the purple wormhole to complete the level"),
    ("Quit", "Escape returns to the menu"),
];

/// Latest input state
#[derive(Debug, Clone)]
pub struct InputCell {
    stick: f32,
    left_held: bool,
    right_held: bool,
    /// Age in seconds of the pending jump request
    jump_pending: Option<f32>,
    /// Requests older than this are dropped
    jump_buffer: f32,
}

impl InputCell {
    pub fn new(jump_buffer: f32) -> Self {
        Self {
            stick: 0.0,
            left_held: false,
            right_held: false,
            jump_pending: None,
            jump_buffer,
        }
    }

    /// Touch stick horizontal axis
    pub fn set_stick(&mut self, x: f32) {
        self.stick = if x.is_finite() { x.clamp(-1.0, 1.0) } else { 0.0 };
    }

    /// Queue a jump; repeated presses before the next tick collapse into one
    pub fn request_jump(&mut self) {
        self.jump_pending = Some(0.0);
    }

    pub fn press(&mut self, action: Action) {
        match action {
            Action::Left => self.left_held = true,
            Action::Right => self.right_held = true,
            Action::Jump => self.request_jump(),
            Action::Start | Action::Quit => {}
        }
    }

    pub fn release(&mut self, action: Action) {
        match action {
            Action::Left => self.left_held = false,
            Action::Right => self.right_held = false,
            Action::Jump | Action::Start | Action::Quit => {}
        }
    }

    /// Combined axis; the stick wins whenever it is deflected
    pub fn axis(&self) -> f32 {
        if self.stick != 0.0 {
            return self.stick;
        }
        match (self.left_held, self.right_held) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    pub fn jump_pending(&self) -> bool {
        self.jump_pending.is_some()
    }

    /// Snapshot for the next tick
    pub fn sample(&self) -> TickInput {
        TickInput {
            axis: self.axis(),
            jump: self.jump_pending(),
        }
    }

    /// Settle the jump request after a tick of `dt` seconds
    pub fn after_tick(&mut self, dt: f32, jumped: bool) {
        if jumped {
            self.jump_pending = None;
            return;
        }
        if let Some(age) = self.jump_pending.as_mut() {
            *age += dt;
            if *age > self.jump_buffer {
                self.jump_pending = None;
            }
        }
    }

    /// Drop everything (focus loss, teardown)
    pub fn clear(&mut self) {
        self.stick = 0.0;
        self.left_held = false;
        self.right_held = false;
        self.jump_pending = None;
    }
}
