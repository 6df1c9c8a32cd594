//! Deferred state-machine timers
//!
//! Delayed transitions (next level, game-over reveal) are plain countdowns
//! owned by the session and advanced inside `tick`. Resetting the session
//! drops them, so a stale timer can never fire into a new run.

use serde::{Deserialize, Serialize};

/// A one-shot countdown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    remaining: f32,
}

impl Timer {
    pub fn new(seconds: f32) -> Self {
        Self {
            remaining: seconds.max(0.0),
        }
    }

    /// Advance by `dt`; returns true on the tick the timer expires
    pub fn advance(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}

/// Pending deferred actions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timers {
    /// Fires the switch to the next level
    pub level_transition: Option<Timer>,
    /// Fires the game-over screen reveal
    pub game_over_reveal: Option<Timer>,
}

impl Timers {
    /// Drop every pending action
    pub fn cancel_all(&mut self) {
        self.level_transition = None;
        self.game_over_reveal = None;
    }

    pub fn is_idle(&self) -> bool {
        self.level_transition.is_none() && self.game_over_reveal.is_none()
    }
}

/// Advance an optional timer, clearing it when it fires
pub fn fire(slot: &mut Option<Timer>, dt: f32) -> bool {
    let fired = slot.as_mut().is_some_and(|timer| timer.advance(dt));
    if fired {
        *slot = None;
    }
    fired
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_fires_once() {
        let mut slot = Some(Timer::new(0.1));
        assert!(!fire(&mut slot, 0.05));
        assert!(fire(&mut slot, 0.06));
        assert!(slot.is_none());
        assert!(!fire(&mut slot, 1.0));
    }

    #[test]
    fn test_cancel_all() {
        let mut timers = Timers {
            level_transition: Some(Timer::new(1.5)),
            game_over_reveal: Some(Timer::new(2.0)),
        };
        assert!(!timers.is_idle());
        timers.cancel_all();
        assert!(timers.is_idle());
    }
}
