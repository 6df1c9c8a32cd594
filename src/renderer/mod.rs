//! Canvas2D rendering module
//!
//! Reads the session after each tick; never mutates it.

pub mod canvas;

pub use canvas::{CanvasRenderer, DrawOptions};
