//! Collision detection and response between bodies
//!
//! Particles exchange velocity along the line of centers (equal masses).
//! Squares resolve by contact zone: the angle from one center to the other
//! picks the axis that gets separated and reflected.

use glam::Vec2;

use super::body::{Body, BodyShape};
use super::events::{EventBus, EventKind};
use super::vector::VectorExt;
use crate::consts::SQUARE_SEPARATION_MARGIN;
use crate::error::{SimError, SimResult};

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Mirror velocity across the tangent of a circular wall
///
/// `radial` points from the circle center to the contact. The tangential
/// component is kept and the radial component flips: v' = 2·proj_t(v) - v.
pub fn reflect_across_tangent(velocity: Vec2, radial: Vec2) -> Vec2 {
    let tangent = radial.perpendicular();
    let len_sq = tangent.length_squared();
    if len_sq == 0.0 {
        return -velocity;
    }
    let proj = tangent * (velocity.dot(tangent) / len_sq);
    2.0 * proj - velocity
}

/// Post-collision velocities for two equal-mass circles
///
/// v1' = v1 + ((v2 - v1)·(p2 - p1)) / |p2 - p1|² · (p2 - p1), symmetric for v2.
/// Fails when the centers coincide.
pub fn elastic_exchange(p1: Vec2, v1: Vec2, p2: Vec2, v2: Vec2) -> SimResult<(Vec2, Vec2)> {
    let d = p2 - p1;
    let dist_sq = d.length_squared();
    if !dist_sq.is_finite() || dist_sq < 1e-12 {
        return Err(SimError::DegenerateVector {
            context: "line of centers between colliding particles",
        });
    }
    let v1_new = v1 + d * ((v2 - v1).dot(d) / dist_sq);
    let v2_new = v2 + (-d) * ((v1 - v2).dot(-d) / dist_sq);
    Ok((v1_new, v2_new))
}

/// Where the second square sits relative to the first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactZone {
    Right,
    Bottom,
    Left,
    Top,
}

impl ContactZone {
    /// Classify by the angle (degrees, [0, 360)) from one centroid to the other
    pub fn from_degrees(angle: f32) -> Self {
        if (0.0..45.0).contains(&angle) || (angle > 315.0 && angle < 360.0) {
            ContactZone::Right
        } else if (45.0..135.0).contains(&angle) {
            ContactZone::Bottom
        } else if (135.0..225.0).contains(&angle) {
            ContactZone::Left
        } else {
            ContactZone::Top
        }
    }

    pub fn between(from: Vec2, to: Vec2) -> Self {
        let d = to - from;
        let mut angle = d.y.atan2(d.x).to_degrees();
        if angle < 0.0 {
            angle += 360.0;
        }
        Self::from_degrees(angle)
    }
}

/// Separate two overlapping circles along their line of centers and exchange velocity
///
/// Returns false without touching anything when they don't overlap.
pub fn resolve_particle_pair(a: &mut Body, b: &mut Body, damping_ratio: f32) -> SimResult<bool> {
    let (BodyShape::Particle { radius: r1 }, BodyShape::Particle { radius: r2 }) =
        (a.shape, b.shape)
    else {
        return Ok(false);
    };
    let dist = a.pos.distance(b.pos);
    if dist >= r1 + r2 {
        return Ok(false);
    }

    let direction = (a.pos - b.pos).unit("particle separation axis")?;
    // negative while overlapping
    let overlap = dist - (r1 + r2);
    let shift = direction * (0.5 * overlap);
    a.pos -= shift;
    b.pos += shift;

    let (v1, v2) = elastic_exchange(a.pos, a.vel, b.pos, b.vel)?;
    a.vel = v1;
    b.vel = v2;
    a.vel.y -= a.gravity * damping_ratio;
    b.vel.y -= b.gravity * damping_ratio;
    Ok(true)
}

/// Zone-based square response: reflect the approaching axis and push apart
///
/// Touching counts as contact, and each square moves half the overlap plus
/// a margin, so the pair never ends a step overlapping.
pub fn resolve_square_pair(a: &mut Body, b: &mut Body) -> bool {
    let (BodyShape::Square { size: s1 }, BodyShape::Square { size: s2 }) = (a.shape, b.shape)
    else {
        return false;
    };
    if !a.overlaps(b) {
        return false;
    }
    let reach = (s1 + s2) / 2.0;

    match ContactZone::between(a.pos, b.pos) {
        ContactZone::Right => {
            if a.vel.x > 0.0 {
                a.vel.x = -a.vel.x;
            }
            if b.vel.x < 0.0 {
                b.vel.x = -b.vel.x;
            }
            let overlap = a.pos.x + reach - b.pos.x;
            let shift = overlap / 2.0 + SQUARE_SEPARATION_MARGIN;
            a.pos.x -= shift;
            b.pos.x += shift;
        }
        ContactZone::Bottom => {
            if a.vel.y > 0.0 {
                a.vel.y = -a.vel.y;
            }
            if b.vel.y < 0.0 {
                b.vel.y = -b.vel.y;
            }
            let overlap = a.pos.y + reach - b.pos.y;
            let shift = overlap / 2.0 + SQUARE_SEPARATION_MARGIN;
            a.pos.y -= shift;
            b.pos.y += shift;
        }
        ContactZone::Left => {
            if a.vel.x < 0.0 {
                a.vel.x = -a.vel.x;
            }
            if b.vel.x > 0.0 {
                b.vel.x = -b.vel.x;
            }
            let overlap = b.pos.x + reach - a.pos.x;
            let shift = overlap / 2.0 + SQUARE_SEPARATION_MARGIN;
            a.pos.x += shift;
            b.pos.x -= shift;
        }
        ContactZone::Top => {
            if a.vel.y < 0.0 {
                a.vel.y = -a.vel.y;
            }
            if b.vel.y > 0.0 {
                b.vel.y = -b.vel.y;
            }
            let overlap = b.pos.y + reach - a.pos.y;
            let shift = overlap / 2.0 + SQUARE_SEPARATION_MARGIN;
            a.pos.y += shift;
            b.pos.y -= shift;
        }
    }
    true
}

/// Resolve one pair, emitting a collision signal in the first body's namespace on contact
///
/// Mixed particle/square pairs pass through each other.
pub fn resolve_pair(
    a: &mut Body,
    b: &mut Body,
    bus: &mut EventBus,
    frame: u64,
    damping_ratio: f32,
) -> SimResult<bool> {
    let hit = match (a.shape, b.shape) {
        (BodyShape::Particle { .. }, BodyShape::Particle { .. }) => {
            resolve_particle_pair(a, b, damping_ratio)?
        }
        (BodyShape::Square { .. }, BodyShape::Square { .. }) => resolve_square_pair(a, b),
        _ => false,
    };
    if hit {
        bus.emit(EventKind::Collision, a.namespace, frame);
    }
    Ok(hit)
}
