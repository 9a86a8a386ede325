//! Signed distance fields for the shapes the renderer draws
//!
//! Negative inside, positive outside, in pixels.

use glam::Vec2;
use std::f32::consts::TAU;

/// Signed distance to a circle
#[inline]
pub fn sd_circle(p: Vec2, center: Vec2, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Signed distance to an axis-aligned box given its center and half extents
pub fn sd_box(p: Vec2, center: Vec2, half: Vec2) -> f32 {
    let d = (p - center).abs() - half;
    d.max(Vec2::ZERO).length() + d.x.max(d.y).min(0.0)
}

/// Signed distance to a circular stroke of the given thickness
#[inline]
pub fn sd_ring(p: Vec2, center: Vec2, radius: f32, thickness: f32) -> f32 {
    ((p - center).length() - radius).abs() - thickness * 0.5
}

/// Signed distance to an arc stroke running from `theta_start` increasing to `theta_end`
pub fn sd_arc(
    p: Vec2,
    center: Vec2,
    theta_start: f32,
    theta_end: f32,
    radius: f32,
    thickness: f32,
) -> f32 {
    let local = p - center;
    let angle = local.y.atan2(local.x);

    let mut angle_diff = angle - theta_start;
    angle_diff -= (angle_diff / TAU).floor() * TAU;

    let mut span = theta_end - theta_start;
    span -= (span / TAU).floor() * TAU;

    let half_thick = thickness * 0.5;
    if angle_diff <= span {
        (local.length() - radius).abs() - half_thick
    } else {
        // Distance to the stroke end caps
        let p1 = Vec2::new(theta_start.cos(), theta_start.sin()) * radius;
        let p2 = Vec2::new(theta_end.cos(), theta_end.sin()) * radius;
        let d1 = (local - p1).length() - half_thick;
        let d2 = (local - p2).length() - half_thick;
        d1.min(d2)
    }
}

/// Pixel coverage from a signed distance (one-pixel anti-aliasing ramp)
#[inline]
pub fn coverage(distance: f32) -> f32 {
    (0.5 - distance).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_sd_circle() {
        assert_eq!(sd_circle(Vec2::new(10.0, 0.0), Vec2::ZERO, 5.0), 5.0);
        assert_eq!(sd_circle(Vec2::ZERO, Vec2::ZERO, 5.0), -5.0);
    }

    #[test]
    fn test_sd_box() {
        let half = Vec2::splat(10.0);
        assert_eq!(sd_box(Vec2::ZERO, Vec2::ZERO, half), -10.0);
        assert_eq!(sd_box(Vec2::new(15.0, 0.0), Vec2::ZERO, half), 5.0);
        assert!((sd_box(Vec2::new(13.0, 14.0), Vec2::ZERO, half) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_sd_ring_stroke() {
        assert_eq!(sd_ring(Vec2::new(100.0, 0.0), Vec2::ZERO, 100.0, 2.0), -1.0);
        assert_eq!(sd_ring(Vec2::new(50.0, 0.0), Vec2::ZERO, 100.0, 2.0), 49.0);
    }

    #[test]
    fn test_sd_arc_skips_gap() {
        // wall from 45° round to 315°, gap centered on 0
        let start = PI / 4.0;
        let end = 7.0 * PI / 4.0;
        let on_wall = Vec2::new(-100.0, 0.0);
        let in_gap = Vec2::new(100.0, 0.0);
        assert!(sd_arc(on_wall, Vec2::ZERO, start, end, 100.0, 2.0) < 0.0);
        assert!(sd_arc(in_gap, Vec2::ZERO, start, end, 100.0, 2.0) > 10.0);
    }

    #[test]
    fn test_coverage_ramp() {
        assert_eq!(coverage(-3.0), 1.0);
        assert_eq!(coverage(3.0), 0.0);
        assert_eq!(coverage(0.0), 0.5);
    }
}
