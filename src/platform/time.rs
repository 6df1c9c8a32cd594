//! Frame timing, seeds and dates

/// Turns absolute frame timestamps into clamped per-frame deltas
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt: f32,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_ms: None,
            max_dt,
        }
    }

    /// Seconds since the previous call, clamped to `[0, max_dt]`.
    /// The first call after a restart reports zero.
    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(prev) => ((now_ms - prev) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        if dt.is_finite() {
            dt.clamp(0.0, self.max_dt)
        } else {
            0.0
        }
    }

    /// Forget the previous timestamp so a resume never sees a huge delta
    pub fn restart(&mut self) {
        self.last_ms = None;
    }
}

/// Rolling frames-per-second over the last 60 frames
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self {
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }
    }
}

impl FpsCounter {
    pub fn record(&mut self, now_ms: f64) {
        self.frame_times[self.frame_index] = now_ms;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();

        // Oldest sample sits at the slot we are about to overwrite
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = now_ms - oldest;
            if elapsed > 0.0 {
                self.fps = (59.0 * 1000.0 / elapsed).round() as u32;
            }
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Seed for sessions that were not given one explicitly
pub fn seed_from_clock() -> u64 {
    now_ms() as u64
}

/// Today's local date as `YYYY-MM-DD`
#[cfg(target_arch = "wasm32")]
pub fn today() -> String {
    let date = js_sys::Date::new_0();
    format!(
        "{:04}-{:02}-{:02}",
        date.get_full_year(),
        date.get_month() + 1,
        date.get_date()
    )
}

/// The headless runner has no calendar; its entries are tagged instead
#[cfg(not(target_arch = "wasm32"))]
pub fn today() -> String {
    String::from("headless")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_delta_is_zero() {
        let mut clock = FrameClock::new(1.0 / 30.0);
        assert_eq!(clock.delta(1000.0), 0.0);
        let dt = clock.delta(1016.0);
        assert!((dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut clock = FrameClock::new(1.0 / 30.0);
        clock.delta(0.0);
        assert_eq!(clock.delta(5000.0), 1.0 / 30.0);
        // Time going backwards reads as no time
        assert_eq!(clock.delta(4000.0), 0.0);
    }

    #[test]
    fn test_restart_swallows_gap() {
        let mut clock = FrameClock::new(1.0 / 30.0);
        clock.delta(0.0);
        clock.restart();
        assert_eq!(clock.delta(60_000.0), 0.0);
    }

    #[test]
    fn test_fps_counter() {
        let mut fps = FpsCounter::default();
        for i in 1..=120 {
            fps.record(i as f64 * 1000.0 / 60.0);
        }
        assert_eq!(fps.fps(), 60);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_native_date_tag() {
        assert_eq!(today(), "headless");
    }
}
