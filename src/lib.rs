//! Word Hopper - a side-scrolling vocabulary platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (level registry, world generation, progression)
//! - `settings`: Data-driven tuning (speeds, prices, viewport)

pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one generation step per loading tick)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Ticks per simulated second
    pub const TICKS_PER_SECOND: u64 = 60;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Avatar bounding box
    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_HEIGHT: f32 = 48.0;

    /// Platform geometry
    pub const PLATFORM_HEIGHT: f32 = 20.0;
    pub const START_PLATFORM_WIDTH: f32 = 160.0;
    /// Start platform sits this far right of the level start
    pub const START_PLATFORM_OFFSET: f32 = 200.0;
    pub const FLOOR_HEIGHT: f32 = 40.0;
    pub const FLOOR_CENTER_Y: f32 = 20.0;

    /// Generation retry budget per step
    pub const MAX_PLATFORM_ATTEMPTS: u32 = 5;
    /// Horizontal clearance added to both sides of a candidate platform
    pub const MIN_HORIZONTAL_CLEARANCE: f32 = 8.0;
    /// Solids closer than this vertically must not overlap horizontally
    pub const MIN_VERTICAL_SEPARATION: f32 = 40.0;

    /// Hazard (spike) row parameters
    pub const HAZARD_PROBABILITY: f64 = 0.4;
    pub const HAZARD_MIN_COUNT: u32 = 3;
    pub const HAZARD_MAX_COUNT: u32 = 6;
    pub const HAZARD_WIDTH: f32 = 40.0;
    pub const HAZARD_HEIGHT: f32 = 40.0;
    /// Hazard rows start this far past the right edge of their platform
    pub const HAZARD_ANCHOR_OFFSET: f32 = 100.0;
    /// Whole row is dropped if it would reach past `end - margin`
    pub const HAZARD_ROW_MARGIN: f32 = 100.0;
    /// Single hazards past `end - margin` are skipped
    pub const HAZARD_SINGLE_MARGIN: f32 = 50.0;
    pub const HAZARD_LETHAL_RADIUS: f32 = 60.0;
    pub const HAZARD_PREFILTER_X: f32 = 150.0;

    /// Collectibles float this far above their platform center
    pub const COLLECTIBLE_LIFT: f32 = 30.0;
    pub const PICKUP_RADIUS: f32 = 40.0;
    pub const PICKUP_PREFILTER: f32 = 120.0;
    /// Half height of a collectible token (used for the from-below test)
    pub const COLLECTIBLE_HALF_HEIGHT: f32 = 20.0;
    /// Movement below this is treated as standing still
    pub const MOVE_EPSILON: f32 = 0.1;

    /// Score rewards
    pub const LETTER_SCORE: u64 = 20;
    pub const COIN_SCORE: u64 = 10;
}

/// Axis-aligned rectangle stored by center and size
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub center: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Self {
            center: Vec2::new(center_x, center_y),
            size: Vec2::new(width, height),
        }
    }

    /// Rectangle spanning `[left, right]` horizontally, centered at `center_y`
    pub fn from_span(left: f32, right: f32, center_y: f32, height: f32) -> Self {
        Self::new((left + right) / 2.0, center_y, right - left, height)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.center.x - self.size.x / 2.0
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.center.x + self.size.x / 2.0
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y + self.size.y / 2.0
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.center.y - self.size.y / 2.0
    }

    /// Strict overlap test (touching edges do not overlap)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.bottom() < other.top()
            && self.top() > other.bottom()
    }
}

/// Whether two horizontal spans overlap once each side is widened by `clearance`
#[inline]
pub fn spans_overlap(a: (f32, f32), b: (f32, f32), clearance: f32) -> bool {
    !(a.1 + clearance < b.0 || a.0 - clearance > b.1)
}

/// Squared distance between two points
#[inline]
pub fn distance_sq(a: Vec2, b: Vec2) -> f32 {
    (a - b).length_squared()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(100.0, 50.0, 40.0, 20.0);
        assert_eq!(rect.left(), 80.0);
        assert_eq!(rect.right(), 120.0);
        assert_eq!(rect.top(), 60.0);
        assert_eq!(rect.bottom(), 40.0);
    }

    #[test]
    fn test_rect_from_span() {
        let rect = Rect::from_span(10.0, 70.0, 200.0, 20.0);
        assert_eq!(rect.center.x, 40.0);
        assert_eq!(rect.size.x, 60.0);
        assert_eq!(rect.right(), 70.0);
    }

    #[test]
    fn test_touching_rects_do_not_overlap() {
        let floor = Rect::new(0.0, 20.0, 100.0, 40.0);
        let standing = Rect::new(0.0, 64.0, 32.0, 48.0);
        assert!(!floor.overlaps(&standing));

        let sunk = Rect::new(0.0, 63.0, 32.0, 48.0);
        assert!(floor.overlaps(&sunk));
    }

    #[test]
    fn test_spans_overlap_with_clearance() {
        // 5 units apart: overlaps once widened by 8
        assert!(spans_overlap((0.0, 100.0), (105.0, 200.0), 8.0));
        // 20 units apart: clear
        assert!(!spans_overlap((0.0, 100.0), (120.0, 200.0), 8.0));
        // Symmetric
        assert!(spans_overlap((105.0, 200.0), (0.0, 100.0), 8.0));
    }
}
