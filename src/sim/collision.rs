//! Collision detection for the arcade loop
//!
//! Every game picks one of two tests: axis-aligned box overlap or a
//! centre-distance threshold. Both are inclusive at the edges.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Rect;

/// Collision shape centred on an entity position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Hitbox {
    /// Axis-aligned box with half extents
    Aabb { half: Vec2 },
    /// Circle with radius
    Circle { radius: f32 },
}

impl Hitbox {
    /// Zero-size box: a point
    pub const POINT: Hitbox = Hitbox::Aabb { half: Vec2::ZERO };

    /// Box from full width/height
    pub fn aabb(width: f32, height: f32) -> Self {
        Hitbox::Aabb {
            half: Vec2::new(width * 0.5, height * 0.5),
        }
    }

    pub fn circle(radius: f32) -> Self {
        Hitbox::Circle {
            radius: radius.max(0.0),
        }
    }

    /// Half extents of the bounding box
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            Hitbox::Aabb { half } => half,
            Hitbox::Circle { radius } => Vec2::splat(radius),
        }
    }

    /// World-space bounds when centred at `pos`
    pub fn bounds_at(&self, pos: Vec2) -> Rect {
        let half = self.half_extents();
        Rect::new(pos - half, pos + half)
    }

    /// Whether a point lies inside the shape centred at `pos`
    pub fn contains(&self, pos: Vec2, point: Vec2) -> bool {
        match *self {
            Hitbox::Aabb { half } => {
                let d = (point - pos).abs();
                d.x <= half.x && d.y <= half.y
            }
            Hitbox::Circle { radius } => point.distance_squared(pos) <= radius * radius,
        }
    }
}

/// Overlap between two positioned shapes
///
/// Box/box uses separating axes, circle/circle uses centre distance, and the
/// mixed case clamps the circle centre onto the box.
pub fn overlaps(a_pos: Vec2, a: &Hitbox, b_pos: Vec2, b: &Hitbox) -> bool {
    match (*a, *b) {
        (Hitbox::Aabb { half: ha }, Hitbox::Aabb { half: hb }) => {
            let d = (a_pos - b_pos).abs();
            let reach = ha + hb;
            d.x <= reach.x && d.y <= reach.y
        }
        (Hitbox::Circle { radius: ra }, Hitbox::Circle { radius: rb }) => {
            let reach = ra + rb;
            a_pos.distance_squared(b_pos) <= reach * reach
        }
        (Hitbox::Aabb { half }, Hitbox::Circle { radius }) => {
            circle_box(b_pos, radius, a_pos, half)
        }
        (Hitbox::Circle { radius }, Hitbox::Aabb { half }) => {
            circle_box(a_pos, radius, b_pos, half)
        }
    }
}

fn circle_box(center: Vec2, radius: f32, box_pos: Vec2, half: Vec2) -> bool {
    let nearest = center.clamp(box_pos - half, box_pos + half);
    nearest.distance_squared(center) <= radius * radius
}

/// True when the shape at `pos` lies entirely outside `bounds`
pub fn fully_outside(pos: Vec2, hitbox: &Hitbox, bounds: &Rect) -> bool {
    let b = hitbox.bounds_at(pos);
    b.max.x < bounds.min.x || b.min.x > bounds.max.x || b.max.y < bounds.min.y || b.min.y > bounds.max.y
}

/// Reflect velocity off the bounds, pushing the shape back inside
///
/// Returns true if a wall was hit.
pub fn reflect_in(pos: &mut Vec2, vel: &mut Vec2, hitbox: &Hitbox, bounds: &Rect) -> bool {
    let half = hitbox.half_extents();
    let lo = bounds.min + half;
    let hi = (bounds.max - half).max(lo);
    let mut hit = false;

    if pos.x < lo.x {
        pos.x = lo.x;
        vel.x = vel.x.abs();
        hit = true;
    } else if pos.x > hi.x {
        pos.x = hi.x;
        vel.x = -vel.x.abs();
        hit = true;
    }
    if pos.y < lo.y {
        pos.y = lo.y;
        vel.y = vel.y.abs();
        hit = true;
    } else if pos.y > hi.y {
        pos.y = hi.y;
        vel.y = -vel.y.abs();
        hit = true;
    }
    hit
}

/// Clamp a shape so it stays fully within the bounds
pub fn clamp_in(pos: Vec2, hitbox: &Hitbox, bounds: &Rect) -> Vec2 {
    let half = hitbox.half_extents();
    let lo = bounds.min + half;
    let hi = (bounds.max - half).max(lo);
    pos.clamp(lo, hi)
}
