//! 2D vector arithmetic
//!
//! `Vector2` is `glam::Vec2`: add/sub/scale/dot/length/clone are the glam
//! operators. This module adds the two operations glam spells differently,
//! with `unit()` refusing to produce NaN from a zero vector.

use glam::Vec2;

use crate::error::{SimError, SimResult};

pub type Vector2 = Vec2;

/// Squared length below which a vector is treated as zero
const DEGENERATE_LENGTH_SQ: f32 = 1e-12;

pub trait VectorExt {
    /// Rotate 90° counter-clockwise: (x, y) -> (-y, x)
    fn perpendicular(self) -> Vec2;

    /// Unit vector in the same direction, or an error for a zero vector
    fn unit(self, context: &'static str) -> SimResult<Vec2>;
}

impl VectorExt for Vec2 {
    #[inline]
    fn perpendicular(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    #[inline]
    fn unit(self, context: &'static str) -> SimResult<Vec2> {
        let len_sq = self.length_squared();
        if !len_sq.is_finite() || len_sq < DEGENERATE_LENGTH_SQ {
            return Err(SimError::DegenerateVector { context });
        }
        Ok(self / len_sq.sqrt())
    }
}
