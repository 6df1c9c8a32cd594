//! Platform layer
//!
//! Handles the pieces between the browser (or native runner) and the sim:
//! - Frame timing, seeds and dates
//! - Input events
//! - The per-frame loop driver

#[cfg(target_arch = "wasm32")]
pub mod browser;
pub mod driver;
pub mod input;
pub mod time;

pub use driver::LoopDriver;
pub use input::{Action, HOW_TO_PLAY, InputCell, action_for_key};
pub use time::{FrameClock, FpsCounter, seed_from_clock, today};
