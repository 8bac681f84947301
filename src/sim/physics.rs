//! Avatar physics
//!
//! The world only needs "move this body against these static rectangles and
//! tell me what it stands on". `PhysicsStepper` is that seam; `AabbStepper`
//! is the default implementation (gravity plus axis-separated AABB
//! resolution, sub-stepped so fast falls cannot tunnel through platforms).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Solid, SolidKind};
use crate::Rect;

/// Largest distance moved per sub-step (thinner than any platform)
const MAX_STEP: f32 = 8.0;

/// A moving axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
}

impl Body {
    pub fn rect(&self) -> Rect {
        Rect {
            center: self.pos,
            size: self.size,
        }
    }

    #[inline]
    pub fn half_height(&self) -> f32 {
        self.size.y / 2.0
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y + self.half_height()
    }
}

/// What the body rests on after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ground {
    #[default]
    Airborne,
    Platform,
    Floor,
}

impl Ground {
    pub fn is_grounded(self) -> bool {
        self != Ground::Airborne
    }

    fn of(kind: SolidKind) -> Self {
        match kind {
            SolidKind::Floor => Ground::Floor,
            SolidKind::Platform => Ground::Platform,
        }
    }
}

/// Resolves one tick of avatar motion against static solids
///
/// Contract: the body never ends a step overlapping a solid it moved into,
/// and a body resting on top of a solid reports that solid's ground kind.
pub trait PhysicsStepper {
    fn step(&self, body: &mut Body, solids: &[Solid], dt: f32) -> Ground;
}

/// Gravity + AABB-vs-static-walls stepper
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AabbStepper {
    pub gravity: f32,
}

impl AabbStepper {
    pub fn new(gravity: f32) -> Self {
        Self { gravity }
    }

    fn move_x(body: &mut Body, dx: f32, solids: &[Solid]) {
        body.pos.x += dx;
        let half_w = body.size.x / 2.0;
        for solid in solids {
            if !body.rect().overlaps(&solid.rect) {
                continue;
            }
            if dx > 0.0 {
                body.pos.x = solid.rect.left() - half_w;
            } else if dx < 0.0 {
                body.pos.x = solid.rect.right() + half_w;
            }
            body.vel.x = 0.0;
        }
    }

    fn move_y(body: &mut Body, dy: f32, solids: &[Solid]) -> Ground {
        body.pos.y += dy;
        let half_h = body.half_height();
        let mut ground = Ground::Airborne;
        for solid in solids {
            if !body.rect().overlaps(&solid.rect) {
                continue;
            }
            if dy <= 0.0 {
                body.pos.y = solid.rect.top() + half_h;
                ground = Ground::of(solid.kind);
            } else {
                body.pos.y = solid.rect.bottom() - half_h;
            }
            body.vel.y = 0.0;
        }
        ground
    }
}

impl PhysicsStepper for AabbStepper {
    fn step(&self, body: &mut Body, solids: &[Solid], dt: f32) -> Ground {
        body.vel.y -= self.gravity * dt;

        let delta = body.vel * dt;
        let steps = (delta.abs().max_element() / MAX_STEP).ceil().max(1.0) as u32;
        let step = delta / steps as f32;

        let mut ground = Ground::Airborne;
        let mut y_blocked = false;
        for _ in 0..steps {
            if body.vel.x != 0.0 {
                Self::move_x(body, step.x, solids);
            }
            if !y_blocked {
                let contact = Self::move_y(body, step.y, solids);
                // Landing or head bump: vertical motion is done for this tick
                if body.vel.y == 0.0 {
                    y_blocked = true;
                    ground = contact;
                }
            }
        }
        ground
    }
}
