//! Collision tests for the side-scroller
//!
//! Everything is axis-aligned. Entities are stored by their center, terrain
//! by its top-left corner; `Aabb` normalizes both into min/max extents.
//! "No overlap" is always the default answer.

use glam::Vec2;

use super::state::{FloorSegment, Platform};
use crate::consts::{FLOOR_LANDING_BAND, PLATFORM_LANDING_BAND};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Box from a top-left corner (screen coordinates, y grows down)
    pub fn from_top_left(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + w, y + h),
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict overlap: touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Feet crossed `surface` this tick, or ended up within `band` below it
#[inline]
fn lands_on(prev_feet: f32, feet: f32, surface: f32, band: f32) -> bool {
    feet > surface && (prev_feet <= surface || feet < surface + band)
}

/// Landing on a floor segment.
///
/// The player's center must be strictly inside the segment horizontally
/// while falling. The feet either swept through the ground line since
/// `prev_y` or sit inside the band just below it. Returns the snapped
/// center y.
pub fn floor_landing(
    prev_y: f32,
    pos: Vec2,
    size: Vec2,
    vy: f32,
    segment: &FloorSegment,
    ground_y: f32,
) -> Option<f32> {
    if vy <= 0.0 {
        return None;
    }
    let half_h = size.y / 2.0;
    let over_segment = pos.x > segment.x && pos.x < segment.x + segment.w;
    if over_segment && lands_on(prev_y + half_h, pos.y + half_h, ground_y, FLOOR_LANDING_BAND) {
        Some(ground_y - half_h)
    } else {
        None
    }
}

/// Landing on a platform.
///
/// Any horizontal overlap counts. The feet must have crossed the platform
/// top since `prev_y`, or be between the top and a little below the bottom
/// edge, while falling. Returns the snapped center y.
pub fn platform_landing(
    prev_y: f32,
    pos: Vec2,
    size: Vec2,
    vy: f32,
    platform: &Platform,
) -> Option<f32> {
    if vy <= 0.0 {
        return None;
    }
    let half_w = size.x / 2.0;
    let half_h = size.y / 2.0;
    let overlaps_x = pos.x + half_w > platform.x && pos.x - half_w < platform.x + platform.w;
    let band = platform.h + PLATFORM_LANDING_BAND;
    if overlaps_x && lands_on(prev_y + half_h, pos.y + half_h, platform.y, band) {
        Some(platform.y - half_h)
    } else {
        None
    }
}

/// First terrain landing this tick: floor segments first, then platforms.
///
/// `prev_y` is the player's center y before this tick's integration.
pub fn first_landing(
    prev_y: f32,
    pos: Vec2,
    size: Vec2,
    vy: f32,
    floor: &[FloorSegment],
    platforms: &[Platform],
    ground_y: f32,
) -> Option<f32> {
    floor
        .iter()
        .find_map(|segment| floor_landing(prev_y, pos, size, vy, segment, ground_y))
        .or_else(|| {
            platforms
                .iter()
                .find_map(|platform| platform_landing(prev_y, pos, size, vy, platform))
        })
}

/// A falling player above the target's vertical center lands a stomp
#[inline]
pub fn is_stomp(player_pos: Vec2, player_vy: f32, target_center: Vec2) -> bool {
    player_vy > 0.0 && player_pos.y < target_center.y
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER: Vec2 = Vec2::new(40.0, 60.0);

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::from_center(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = Aabb::from_center(Vec2::new(8.0, 0.0), Vec2::new(10.0, 10.0));
        let c = Aabb::from_center(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(a.overlaps(&b));
        // Touching edges is not an overlap
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_aabb_top_left_matches_center() {
        let a = Aabb::from_top_left(10.0, 20.0, 30.0, 40.0);
        assert_eq!(a.center(), Vec2::new(25.0, 40.0));
        assert_eq!(a, Aabb::from_center(Vec2::new(25.0, 40.0), Vec2::new(30.0, 40.0)));
    }

    #[test]
    fn test_floor_landing_snaps_to_ground() {
        let segment = FloorSegment { x: 0.0, w: 300.0 };
        // Feet 5px below ground line
        let pos = Vec2::new(100.0, 440.0 - 30.0 + 5.0);
        let y = floor_landing(pos.y, pos, PLAYER, 50.0, &segment, 440.0);
        assert_eq!(y, Some(410.0));
    }

    #[test]
    fn test_floor_landing_requires_falling() {
        let segment = FloorSegment { x: 0.0, w: 300.0 };
        let pos = Vec2::new(100.0, 415.0);
        assert_eq!(floor_landing(pos.y, pos, PLAYER, 0.0, &segment, 440.0), None);
        assert_eq!(floor_landing(pos.y, pos, PLAYER, -100.0, &segment, 440.0), None);
    }

    #[test]
    fn test_floor_landing_misses_gap() {
        let segment = FloorSegment { x: 0.0, w: 300.0 };
        let pos = Vec2::new(320.0, 415.0);
        assert_eq!(floor_landing(pos.y, pos, PLAYER, 50.0, &segment, 440.0), None);
    }

    #[test]
    fn test_floor_landing_ignores_deep_fall() {
        // Feet already past the landing band: fell through the gap
        let segment = FloorSegment { x: 0.0, w: 300.0 };
        let pos = Vec2::new(100.0, 440.0 - 30.0 + 45.0);
        assert_eq!(floor_landing(pos.y - 5.0, pos, PLAYER, 50.0, &segment, 440.0), None);
    }

    #[test]
    fn test_platform_landing_edge_overlap() {
        let platform = Platform {
            x: 200.0,
            y: 300.0,
            w: 80.0,
            h: 20.0,
        };
        // Center left of the platform, but the hitbox overlaps its left edge
        let pos = Vec2::new(185.0, 300.0 - 30.0 + 4.0);
        assert_eq!(platform_landing(pos.y, pos, PLAYER, 10.0, &platform), Some(270.0));
    }

    #[test]
    fn test_first_landing_prefers_floor() {
        let floor = [FloorSegment { x: 0.0, w: 500.0 }];
        let platforms = [Platform {
            x: 50.0,
            y: 430.0,
            w: 100.0,
            h: 20.0,
        }];
        let pos = Vec2::new(100.0, 412.0);
        let y = first_landing(pos.y, pos, PLAYER, 10.0, &floor, &platforms, 440.0);
        assert_eq!(y, Some(410.0));
    }

    #[test]
    fn test_fast_fall_cannot_skip_the_ground() {
        // 962 px/s at a 1/30 s tick moves the feet ~32 px, past the band
        let segment = FloorSegment { x: 0.0, w: 300.0 };
        let prev = 440.0 - 30.0 - 1.0;
        let pos = Vec2::new(100.0, prev + 962.0 / 30.0);
        assert_eq!(floor_landing(prev, pos, PLAYER, 962.0, &segment, 440.0), Some(410.0));
    }

    #[test]
    fn test_fast_fall_cannot_skip_a_platform() {
        let platform = Platform {
            x: 50.0,
            y: 300.0,
            w: 100.0,
            h: 20.0,
        };
        let prev = 300.0 - 30.0 - 2.0;
        let pos = Vec2::new(100.0, prev + 40.0);
        assert_eq!(platform_landing(prev, pos, PLAYER, 1200.0, &platform), Some(270.0));
    }

    #[test]
    fn test_stomp_needs_falling_from_above() {
        let enemy = Vec2::new(100.0, 400.0);
        assert!(is_stomp(Vec2::new(100.0, 380.0), 200.0, enemy));
        assert!(!is_stomp(Vec2::new(100.0, 380.0), -200.0, enemy));
        assert!(!is_stomp(Vec2::new(100.0, 410.0), 200.0, enemy));
    }
}
