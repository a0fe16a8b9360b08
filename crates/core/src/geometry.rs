//! Rectangles and circles in surface coordinates.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle with its origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    /// Half-open containment: `[x, x + width) × [y, y + height)`.
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    /// Signed distance from `p` to the rectangle edge; negative inside.
    pub fn signed_distance(&self, p: DVec2) -> f64 {
        let half = self.size() * 0.5;
        let center = self.origin() + half;
        let d = (p - center).abs() - half;
        let outside = d.max(DVec2::ZERO).length();
        let inside = d.x.max(d.y).min(0.0);
        outside + inside
    }
}

/// Circle used as a clip region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
}

impl Circle {
    pub fn contains(&self, p: DVec2) -> bool {
        p.distance_squared(self.center) <= self.radius * self.radius
    }
}
