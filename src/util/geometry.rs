//! Toroidal arena geometry
//!
//! The playfield is a rectangle centered on the origin whose edges wrap: an
//! object leaving through one edge re-enters through the opposite one. Any
//! distance or direction between two objects has to consider both the direct
//! and the wrapped path and use the shorter of the two.

use serde::{Deserialize, Serialize};

use crate::util::vec2::Vec2;

/// How far an on-screen object may drift past an edge before it is teleported
/// to the opposite side.
pub const WRAP_MARGIN: f32 = 2.0;

/// Per-axis slack allowed on top of half the arena extent when measuring
/// wrapped displacements. Covers `WRAP_MARGIN` overshoot on both objects.
pub const WRAP_HYSTERESIS: f32 = 5.0;

/// Visible, wrapping playfield
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    pub width: f32,
    pub height: f32,
}

impl ArenaBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn min_x(&self) -> f32 {
        -0.5 * self.width
    }

    #[inline]
    pub fn max_x(&self) -> f32 {
        0.5 * self.width
    }

    #[inline]
    pub fn min_y(&self) -> f32 {
        -0.5 * self.height
    }

    #[inline]
    pub fn max_y(&self) -> f32 {
        0.5 * self.height
    }

    pub fn min_dimension(&self) -> f32 {
        self.width.min(self.height)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.y >= self.min_y() && p.y <= self.max_y()
    }

    /// True when `p` lies inside the bounds shrunk by `dx`/`dy` on each side.
    /// Negative insets grow the rectangle.
    pub fn contains_inset(&self, p: Vec2, dx: f32, dy: f32) -> bool {
        p.x >= self.min_x() + dx
            && p.x <= self.max_x() - dx
            && p.y >= self.min_y() + dy
            && p.y <= self.max_y() - dy
    }

    /// True when a circle is entirely inside the visible rectangle
    pub fn contains_circle(&self, center: Vec2, radius: f32) -> bool {
        self.contains_inset(center, radius, radius)
    }

    /// Teleport a point that drifted more than `WRAP_MARGIN` past an edge to the
    /// opposite edge. Returns true if the point moved.
    pub fn wrap_point(&self, p: &mut Vec2) -> bool {
        let mut wrapped = false;
        if p.x > self.max_x() + WRAP_MARGIN {
            p.x -= self.width;
            wrapped = true;
        } else if p.x < self.min_x() - WRAP_MARGIN {
            p.x += self.width;
            wrapped = true;
        }
        if p.y > self.max_y() + WRAP_MARGIN {
            p.y -= self.height;
            wrapped = true;
        } else if p.y < self.min_y() - WRAP_MARGIN {
            p.y += self.height;
            wrapped = true;
        }
        wrapped
    }
}

/// Shortest per-axis offset on a wrapping axis of length `extent`
#[inline]
fn wrap_axis(d: f32, extent: f32) -> f32 {
    let alternative = d - extent.copysign(d);
    if alternative.abs() < d.abs() {
        alternative
    } else {
        d
    }
}

/// Convert a direct displacement (`to - from`) into the shortest displacement
/// on the torus. Each axis is handled independently.
pub fn wrapped_displacement(direct: Vec2, bounds: &ArenaBounds) -> Vec2 {
    Vec2::new(
        wrap_axis(direct.x, bounds.width),
        wrap_axis(direct.y, bounds.height),
    )
}

/// Shortest displacement from `from` to `to`
pub fn wrapped_delta(from: Vec2, to: Vec2, bounds: &ArenaBounds) -> Vec2 {
    wrapped_displacement(to - from, bounds)
}
