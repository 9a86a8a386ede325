//! Container geometry: the boundaries bodies bounce off
//!
//! Screen coordinates (y grows downward). Angles follow `atan2(dy, dx)` in
//! those coordinates, the same convention the raster uses when drawing.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::BodyShape;
use super::random::SeededRandom;
use crate::error::{SimError, SimResult};
use crate::{cartesian_to_polar, polar_to_cartesian, wrap_angle};

/// Index of a container within its scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub usize);

/// Axis-aligned square, re-centered in the frame every step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxContainer {
    /// Top-left corner
    pub pos: Vec2,
    pub size: f32,
}

impl BoxContainer {
    /// Box half as wide as the frame, centered
    pub fn new(frame_size: Vec2) -> Self {
        let mut b = Self {
            pos: Vec2::ZERO,
            size: frame_size.x / 2.0,
        };
        b.recenter(frame_size);
        b
    }

    pub fn recenter(&mut self, frame_size: Vec2) {
        self.pos = (frame_size - Vec2::splat(self.size)) / 2.0;
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }
}

/// Full circle with a fixed radius
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingContainer {
    pub center: Vec2,
    pub radius: f32,
}

impl RingContainer {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Circle with an angular gap that rotates at a constant rate
///
/// The wall runs from `start_angle` increasing to `end_angle`; the gap is the
/// remaining range from `end_angle` to `start_angle`. Both are kept in [0, 2π).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArcContainer {
    pub center: Vec2,
    pub radius: f32,
    /// Gap width in degrees
    pub gap_deg: f32,
    pub start_angle: f32,
    pub end_angle: f32,
    /// Radians per step
    pub angular_velocity: f32,
}

impl ArcContainer {
    /// Arc with its gap centered on angle 0 (pointing right)
    pub fn new(center: Vec2, radius: f32, gap_deg: f32, angular_velocity: f32) -> SimResult<Self> {
        if !(gap_deg > 0.0 && gap_deg < 360.0) {
            return Err(SimError::config(format!(
                "arc gap must be in (0, 360) degrees, got {gap_deg}"
            )));
        }
        if radius <= 0.0 {
            return Err(SimError::config(format!("arc radius must be positive, got {radius}")));
        }
        let theta = gap_deg.to_radians();
        Ok(Self {
            center,
            radius,
            gap_deg,
            start_angle: wrap_angle(theta / 2.0),
            end_angle: wrap_angle(-theta / 2.0),
            angular_velocity,
        })
    }

    /// One-shot rotation by `angle_deg`
    pub fn rotate(&mut self, angle_deg: f32) {
        let delta = angle_deg.to_radians();
        self.start_angle = wrap_angle(self.start_angle + delta);
        self.end_angle = wrap_angle(self.end_angle + delta);
    }

    /// Advance by the angular velocity
    pub fn advance(&mut self) {
        self.start_angle = wrap_angle(self.start_angle + self.angular_velocity);
        self.end_angle = wrap_angle(self.end_angle + self.angular_velocity);
    }

    /// Angular length of the wall
    pub fn wall_span(&self) -> f32 {
        let mut span = self.end_angle - self.start_angle;
        if span < 0.0 {
            span += TAU;
        }
        span
    }

    /// Check if an angle falls inside the gap
    pub fn gap_contains(&self, theta: f32) -> bool {
        let theta = wrap_angle(theta);
        let from = self.end_angle;
        let to = self.start_angle;

        if from <= to {
            theta >= from && theta <= to
        } else {
            // Gap straddles 0: two disjoint sub-ranges
            theta >= from || theta <= to
        }
    }

    /// Angular position of a point around the arc center
    pub fn angle_of(&self, point: Vec2) -> f32 {
        let (_, theta) = cartesian_to_polar(point - self.center);
        wrap_angle(theta)
    }
}

/// Boundary shapes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Container {
    Box(BoxContainer),
    Ring(RingContainer),
    Arc(ArcContainer),
}

impl Container {
    /// Per-step geometry update
    pub fn step(&mut self, frame_size: Vec2) {
        match self {
            Container::Box(b) => b.recenter(frame_size),
            Container::Ring(_) => {}
            Container::Arc(a) => a.advance(),
        }
    }

    pub fn center(&self) -> Vec2 {
        match self {
            Container::Box(b) => b.center(),
            Container::Ring(r) => r.center,
            Container::Arc(a) => a.center,
        }
    }

    /// Box size or circle radius
    pub fn extent(&self) -> f32 {
        match self {
            Container::Box(b) => b.size,
            Container::Ring(r) => r.radius,
            Container::Arc(a) => a.radius,
        }
    }

    /// Whether a body of this shape can be placed inside at all
    pub fn can_hold(&self, shape: &BodyShape) -> bool {
        match self {
            Container::Box(b) => b.size - 2.0 * shape.half_extent() >= 0.0,
            Container::Ring(_) | Container::Arc(_) => {
                self.extent() - shape.bounding_radius() - 1.0 >= 0.0
            }
        }
    }

    /// Sample a body center inside the interior
    ///
    /// Rectangular integer sampling for Box, polar sampling bounded by
    /// radius minus body extent for Ring/Arc.
    pub fn sample_center(&self, shape: &BodyShape, rng: &mut SeededRandom) -> Vec2 {
        match self {
            Container::Box(b) => {
                let half = shape.half_extent();
                let lo = b.min() + Vec2::splat(half);
                let hi = b.max() - Vec2::splat(half);
                let x = rng.random_range(lo.x.ceil() as i64, hi.x.floor() as i64);
                let y = rng.random_range(lo.y.ceil() as i64, hi.y.floor() as i64);
                Vec2::new(x as f32, y as f32)
            }
            Container::Ring(_) | Container::Arc(_) => {
                let angle = rng.next_f32() * TAU;
                let max_dist = (self.extent() - shape.bounding_radius() - 1.0).floor() as i64;
                let distance = rng.random_range(0, max_dist.max(0)) as f32;
                self.center() + polar_to_cartesian(distance, angle)
            }
        }
    }
}
