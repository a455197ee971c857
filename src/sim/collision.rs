//! Collision tests between the round player and axis-aligned pipes
//!
//! The player is a circle; pipes are rectangles. Overlap is decided by the
//! distance from the circle center to the closest point of the rectangle.

use glam::Vec2;
use serde::Serialize;

use super::state::Obstacle;

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Point of the rectangle nearest to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }
}

/// Which pipe of an obstacle was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipeHit {
    Top,
    Bottom,
}

/// Circle strictly overlaps the rectangle (touching does not count)
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    if rect.is_empty() {
        return false;
    }
    let closest = rect.closest_point(center);
    center.distance_squared(closest) < radius * radius
}

/// Two circles strictly overlap
#[inline]
pub fn circle_circle_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Test the player's hitbox against both pipes of an obstacle
pub fn obstacle_hit(center: Vec2, hitbox: f32, obstacle: &Obstacle, floor: f32) -> Option<PipeHit> {
    if circle_rect_overlap(center, hitbox, &obstacle.top_rect()) {
        return Some(PipeHit::Top);
    }
    if circle_rect_overlap(center, hitbox, &obstacle.bottom_rect(floor)) {
        return Some(PipeHit::Bottom);
    }
    None
}
