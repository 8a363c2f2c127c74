//! Collision geometry
//!
//! Two distinct tests are used and are not interchangeable:
//! - Axis-aligned bounding box overlap for hits (ship/enemy/bullet/shot)
//! - Center distance vs combined radii for grazing

use glam::Vec2;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Build a box centered on `center` with the given half-extents
    pub fn centered(center: Vec2, half_size: Vec2) -> Self {
        Self {
            min: center - half_size,
            max: center + half_size,
        }
    }

    /// Strict overlap test (touching edges do not count)
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Circle proximity test used for grazing (inclusive)
#[inline]
pub fn circles_touch(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance(b) <= radius_a + radius_b
}
