//! vector.rs
//! Minimal 2D vector math used for poses, sensor geometry and displacements.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Plane vector in world units (centimeters) or screen units (pixels),
/// depending on context. World y points up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scale(self, n: f64) -> Self {
        Self::new(self.x * n, self.y * n)
    }

    /// Counter-clockwise rotation by `rad` radians.
    pub fn rotated(self, rad: f64) -> Self {
        let (sin, cos) = rad.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn dist(self, other: Self) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn rotation_quarter_turn() {
        let v = Vec2::new(1.0, 0.0).rotated(FRAC_PI_2);
        assert!((v.x - 0.0).abs() < 1e-12);
        assert!((v.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rotation_preserves_length() {
        let v = Vec2::new(3.0, -4.0);
        let r = v.rotated(1.2345);
        assert!((r.dist(Vec2::ZERO) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn add_sub_scale() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(-3.0, 0.5);
        assert_eq!(a + b, Vec2::new(-2.0, 2.5));
        assert_eq!(a - b, Vec2::new(4.0, 1.5));
        assert_eq!(a.scale(2.0), Vec2::new(2.0, 4.0));
    }
}
