//! Moving bodies and their response to container boundaries

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{reflect_across_tangent, reflect_velocity};
use super::container::{ArcContainer, BoxContainer, Container, ContainerId};
use super::events::{EventBus, EventKind, Namespace};
use super::vector::VectorExt;
use crate::config::Appearance;
use crate::error::SimResult;

/// Geometric kind of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BodyShape {
    /// Circle, `pos` is the center
    Particle { radius: f32 },
    /// Axis-aligned square, `pos` is the center
    Square { size: f32 },
}

impl BodyShape {
    /// Radius, or half the side length
    #[inline]
    pub fn half_extent(&self) -> f32 {
        match *self {
            BodyShape::Particle { radius } => radius,
            BodyShape::Square { size } => size / 2.0,
        }
    }

    /// Radius of the smallest circle around the shape
    #[inline]
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            BodyShape::Particle { radius } => radius,
            BodyShape::Square { size } => size * std::f32::consts::FRAC_1_SQRT_2,
        }
    }

    /// Radius or side length
    pub fn extent(&self) -> f32 {
        match *self {
            BodyShape::Particle { radius } => radius,
            BodyShape::Square { size } => size,
        }
    }
}

/// What happened at the boundary during one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryHit {
    None,
    Bounced,
    /// Crossed out through an Arc gap this step
    Escaped,
}

/// A simulated body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: u32,
    pub shape: BodyShape,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Added to vertical velocity each step (Particle only)
    pub gravity: f32,
    pub appearance: Appearance,
    pub container: ContainerId,
    pub namespace: Namespace,
    /// Currently outside an Arc through its gap
    #[serde(default)]
    pub escaped: bool,
}

impl Body {
    #[allow(clippy::too_many_arguments)]
    pub fn particle(
        id: u32,
        pos: Vec2,
        radius: f32,
        vel: Vec2,
        gravity: f32,
        appearance: Appearance,
        container: ContainerId,
        namespace: Namespace,
    ) -> Self {
        Self {
            id,
            shape: BodyShape::Particle { radius },
            pos,
            vel,
            gravity,
            appearance,
            container,
            namespace,
            escaped: false,
        }
    }

    pub fn square(
        id: u32,
        pos: Vec2,
        size: f32,
        vel: Vec2,
        appearance: Appearance,
        container: ContainerId,
        namespace: Namespace,
    ) -> Self {
        Self {
            id,
            shape: BodyShape::Square { size },
            pos,
            vel,
            gravity: 0.0,
            appearance,
            container,
            namespace,
            escaped: false,
        }
    }

    /// Axis-aligned bounds (min, max)
    pub fn aabb(&self) -> (Vec2, Vec2) {
        let h = Vec2::splat(self.shape.half_extent());
        (self.pos - h, self.pos + h)
    }

    /// Whether two bodies' shapes intersect (touching squares count)
    pub fn overlaps(&self, other: &Body) -> bool {
        match (self.shape, other.shape) {
            (BodyShape::Particle { radius: r1 }, BodyShape::Particle { radius: r2 }) => {
                self.pos.distance(other.pos) < r1 + r2
            }
            (BodyShape::Square { .. }, BodyShape::Square { .. }) => {
                let (a_min, a_max) = self.aabb();
                let (b_min, b_max) = other.aabb();
                !(a_max.x < b_min.x || b_max.x < a_min.x || a_max.y < b_min.y || b_max.y < a_min.y)
            }
            (BodyShape::Particle { radius }, BodyShape::Square { .. }) => {
                circle_touches_aabb(self.pos, radius, other.aabb())
            }
            (BodyShape::Square { .. }, BodyShape::Particle { radius }) => {
                circle_touches_aabb(other.pos, radius, self.aabb())
            }
        }
    }

    /// Integrate one step and respond to the container boundary
    pub fn step(
        &mut self,
        container: &Container,
        bus: &mut EventBus,
        frame: u64,
        damping_ratio: f32,
    ) -> SimResult<BoundaryHit> {
        match self.shape {
            BodyShape::Particle { .. } => self.vel.y += self.gravity,
            BodyShape::Square { .. } => {}
        }
        self.pos += self.vel;

        let hit = match (self.shape, container) {
            (BodyShape::Particle { radius }, Container::Box(b)) => self.bounce_in_box(b, radius),
            (BodyShape::Square { size }, Container::Box(b)) => {
                self.bounce_square_in_box(b, size / 2.0)
            }
            (shape, Container::Ring(ring)) => self.bounce_in_circle(
                ring.center,
                ring.radius,
                shape.bounding_radius(),
                damping_ratio,
            )?,
            (shape, Container::Arc(arc)) => {
                self.bounce_in_arc(arc, shape.bounding_radius(), damping_ratio, bus, frame)?
            }
        };

        if hit == BoundaryHit::Bounced {
            bus.emit(EventKind::Collision, self.namespace, frame);
        }
        Ok(hit)
    }

    /// Independent-axis reflection for a circle in a box
    fn bounce_in_box(&mut self, b: &BoxContainer, radius: f32) -> BoundaryHit {
        let (min, max) = (b.min(), b.max());
        let mut hit = BoundaryHit::None;

        if self.pos.x + radius > max.x {
            self.pos.x = max.x - radius;
            self.vel = reflect_velocity(self.vel, Vec2::X);
            hit = BoundaryHit::Bounced;
        } else if self.pos.x - radius < min.x {
            self.pos.x = min.x + radius;
            self.vel = reflect_velocity(self.vel, Vec2::X);
            hit = BoundaryHit::Bounced;
        }

        if self.pos.y + radius > max.y {
            self.pos.y = max.y - radius;
            self.vel = reflect_velocity(self.vel, Vec2::Y);
            hit = BoundaryHit::Bounced;
        } else if self.pos.y - radius < min.y {
            self.pos.y = min.y + radius;
            self.vel = reflect_velocity(self.vel, Vec2::Y);
            hit = BoundaryHit::Bounced;
        }
        hit
    }

    /// Wall contact for a square: clamp 1 unit inside and flip that axis
    fn bounce_square_in_box(&mut self, b: &BoxContainer, half: f32) -> BoundaryHit {
        let (min, max) = (b.min(), b.max());
        let mut hit = BoundaryHit::None;

        if self.pos.x - half <= min.x || self.pos.x + half >= max.x {
            self.pos.x = if self.pos.x - half <= min.x {
                min.x + half + 1.0
            } else {
                max.x - half - 1.0
            };
            self.vel.x = -self.vel.x;
            hit = BoundaryHit::Bounced;
        }
        if self.pos.y - half <= min.y || self.pos.y + half >= max.y {
            self.pos.y = if self.pos.y - half <= min.y {
                min.y + half + 1.0
            } else {
                max.y - half - 1.0
            };
            self.vel.y = -self.vel.y;
            hit = BoundaryHit::Bounced;
        }
        hit
    }

    /// Tangent reflection against a circular wall, then snap onto it
    fn bounce_in_circle(
        &mut self,
        center: Vec2,
        container_radius: f32,
        radius: f32,
        damping_ratio: f32,
    ) -> SimResult<BoundaryHit> {
        let radial = self.pos - center;
        if radial.length() + radius <= container_radius {
            return Ok(BoundaryHit::None);
        }

        let unit = radial.unit("radial vector at circular wall contact")?;
        self.vel = reflect_across_tangent(self.vel, radial);
        self.vel.y -= self.gravity * damping_ratio;
        self.pos = center + unit * (container_radius - radius);
        Ok(BoundaryHit::Bounced)
    }

    /// Circular bounce unless the body is leaving through the gap
    fn bounce_in_arc(
        &mut self,
        arc: &ArcContainer,
        radius: f32,
        damping_ratio: f32,
        bus: &mut EventBus,
        frame: u64,
    ) -> SimResult<BoundaryHit> {
        let outside = (self.pos - arc.center).length() + radius > arc.radius;
        if !outside {
            // fully back inside: a later exit counts as a new excursion
            self.escaped = false;
            return Ok(BoundaryHit::None);
        }

        if !self.escaped && arc.gap_contains(arc.angle_of(self.pos)) {
            self.escaped = true;
            bus.emit(EventKind::Escape, self.namespace, frame);
            return Ok(BoundaryHit::Escaped);
        }
        if self.escaped {
            return Ok(BoundaryHit::None);
        }
        self.bounce_in_circle(arc.center, arc.radius, radius, damping_ratio)
    }

    /// Pull a body back inside its container without touching velocity
    ///
    /// Escaped bodies are left alone.
    pub fn confine(&mut self, container: &Container) {
        if self.escaped {
            return;
        }
        match container {
            Container::Box(b) => {
                let h = Vec2::splat(self.shape.half_extent());
                let (lo, hi) = (b.min() + h, b.max() - h);
                if lo.x <= hi.x && lo.y <= hi.y {
                    self.pos = self.pos.clamp(lo, hi);
                }
            }
            Container::Ring(_) | Container::Arc(_) => {
                let center = container.center();
                let limit = container.extent() - self.shape.bounding_radius();
                let radial = self.pos - center;
                if radial.length() > limit {
                    if let Ok(unit) = radial.unit("radial vector while confining") {
                        self.pos = center + unit * limit;
                    }
                }
            }
        }
    }

    /// Grow after a bounce and pull 1% toward the container center
    pub fn grow(&mut self, container: &Container, amount: f32) -> SimResult<()> {
        let BodyShape::Particle { radius } = self.shape else {
            return Ok(());
        };
        let center = container.center();
        // keep at least a pixel of room
        let max_radius = (container.extent() - 1.0).max(radius);
        let new_radius = (radius + amount).min(max_radius);
        self.shape = BodyShape::Particle { radius: new_radius };
        self.pos += (center - self.pos) * 0.01;

        if let Container::Ring(_) | Container::Arc(_) = container {
            let radial = self.pos - center;
            if radial.length() + new_radius > container.extent() && !self.escaped {
                self.pos = center + radial.unit("radial vector after growth")?
                    * (container.extent() - new_radius);
            }
        }
        Ok(())
    }
}

fn circle_touches_aabb(center: Vec2, radius: f32, (min, max): (Vec2, Vec2)) -> bool {
    let closest = center.clamp(min, max);
    center.distance(closest) < radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Color;
    use crate::sim::container::RingContainer;

    fn particle(pos: Vec2, radius: f32, vel: Vec2, gravity: f32) -> Body {
        Body::particle(
            1,
            pos,
            radius,
            vel,
            gravity,
            Appearance::Color(Color::RED),
            ContainerId(0),
            Namespace(1),
        )
    }

    fn square(pos: Vec2, size: f32, vel: Vec2) -> Body {
        Body::square(
            2,
            pos,
            size,
            vel,
            Appearance::Color(Color::BLUE),
            ContainerId(0),
            Namespace(1),
        )
    }

    #[test]
    fn test_gravity_then_integrate() {
        let ring = Container::Ring(RingContainer::new(Vec2::ZERO, 1000.0));
        let mut bus = EventBus::new();
        let mut p = particle(Vec2::ZERO, 10.0, Vec2::new(1.0, 0.0), 0.5);
        p.step(&ring, &mut bus, 0, 0.5).unwrap();
        assert_eq!(p.vel, Vec2::new(1.0, 0.5));
        assert_eq!(p.pos, Vec2::new(1.0, 0.5));
    }

    #[test]
    fn test_particle_box_corner_reflects_both_axes() {
        let b = BoxContainer::new(Vec2::new(400.0, 400.0)); // 100..300
        let container = Container::Box(b);
        let mut bus = EventBus::new();
        let mut p = particle(Vec2::new(285.0, 285.0), 10.0, Vec2::new(10.0, 10.0), 0.0);
        let hit = p.step(&container, &mut bus, 3, 0.5).unwrap();
        assert_eq!(hit, BoundaryHit::Bounced);
        assert_eq!(p.pos, Vec2::new(290.0, 290.0));
        assert_eq!(p.vel, Vec2::new(-10.0, -10.0));
        assert_eq!(bus.take_fired().len(), 1);
    }

    #[test]
    fn test_ring_bounce_snaps_and_reflects() {
        let ring = Container::Ring(RingContainer::new(Vec2::ZERO, 100.0));
        let mut bus = EventBus::new();
        // heading straight right into the wall, no gravity
        let mut p = particle(Vec2::new(85.0, 0.0), 10.0, Vec2::new(10.0, 0.0), 0.0);
        let hit = p.step(&ring, &mut bus, 7, 0.5).unwrap();
        assert_eq!(hit, BoundaryHit::Bounced);
        assert!((p.pos - Vec2::new(90.0, 0.0)).length() < 1e-4);
        assert!((p.vel - Vec2::new(-10.0, 0.0)).length() < 1e-4);
        let fired = bus.take_fired();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].kind, EventKind::Collision);
        assert_eq!(fired[0].frame, 7);
    }

    #[test]
    fn test_ring_bounce_applies_damping() {
        let ring = Container::Ring(RingContainer::new(Vec2::ZERO, 100.0));
        let mut bus = EventBus::new();
        let mut p = particle(Vec2::new(0.0, 85.0), 10.0, Vec2::new(0.0, 9.0), 1.0);
        p.step(&ring, &mut bus, 0, 0.5).unwrap();
        // v = 10 down, reflected to 10 up, then -0.5
        assert!((p.vel - Vec2::new(0.0, -10.5)).length() < 1e-4);
        assert!((p.pos.length() + 10.0 - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_square_wall_clamps_inside() {
        let container = Container::Box(BoxContainer::new(Vec2::new(400.0, 400.0)));
        let mut bus = EventBus::new();
        let mut s = square(Vec2::new(120.0, 200.0), 20.0, Vec2::new(-15.0, 0.0));
        let hit = s.step(&container, &mut bus, 0, 0.5).unwrap();
        assert_eq!(hit, BoundaryHit::Bounced);
        assert_eq!(s.pos.x, 100.0 + 10.0 + 1.0);
        assert_eq!(s.vel, Vec2::new(15.0, 0.0));
    }

    #[test]
    fn test_arc_escape_fires_once_per_excursion() {
        let arc = ArcContainer::new(Vec2::ZERO, 100.0, 90.0, 0.0).unwrap();
        let container = Container::Arc(arc);
        let mut bus = EventBus::new();
        // moving right through the gap centered on angle 0
        let mut p = particle(Vec2::new(80.0, 0.0), 10.0, Vec2::new(5.0, 0.0), 0.0);

        let mut escapes = 0;
        for frame in 0..20 {
            let hit = p.step(&container, &mut bus, frame, 0.5).unwrap();
            if hit == BoundaryHit::Escaped {
                escapes += 1;
            }
        }
        assert_eq!(escapes, 1);
        assert!(p.escaped);
        assert!(p.pos.x > 100.0, "escaped body keeps moving outward");
        let fired = bus.take_fired();
        assert_eq!(
            fired.iter().filter(|e| e.kind == EventKind::Escape).count(),
            1
        );
        assert!(fired.iter().all(|e| e.kind != EventKind::Collision));

        // come back inside, then leave again: a second excursion
        p.vel = Vec2::new(-5.0, 0.0);
        p.pos = Vec2::new(85.0, 0.0);
        p.step(&container, &mut bus, 30, 0.5).unwrap();
        assert!(!p.escaped);
        p.vel = Vec2::new(20.0, 0.0);
        let hit = p.step(&container, &mut bus, 31, 0.5).unwrap();
        assert_eq!(hit, BoundaryHit::Escaped);
    }

    #[test]
    fn test_arc_wall_bounces() {
        let arc = ArcContainer::new(Vec2::ZERO, 100.0, 90.0, 0.0).unwrap();
        let container = Container::Arc(arc);
        let mut bus = EventBus::new();
        // heading left toward angle π, which is wall
        let mut p = particle(Vec2::new(-85.0, 0.0), 10.0, Vec2::new(-10.0, 0.0), 0.0);
        let hit = p.step(&container, &mut bus, 0, 0.5).unwrap();
        assert_eq!(hit, BoundaryHit::Bounced);
        assert!(!p.escaped);
        assert!(p.vel.x > 0.0);
        assert!((p.pos.length() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_overlaps_mixed_shapes() {
        let p = particle(Vec2::new(0.0, 0.0), 10.0, Vec2::ZERO, 0.0);
        let near = square(Vec2::new(14.0, 0.0), 10.0, Vec2::ZERO);
        let far = square(Vec2::new(30.0, 0.0), 10.0, Vec2::ZERO);
        assert!(p.overlaps(&near));
        assert!(near.overlaps(&p));
        assert!(!p.overlaps(&far));
    }

    #[test]
    fn test_confine_pulls_back_inside() {
        let ring = Container::Ring(RingContainer::new(Vec2::ZERO, 100.0));
        let mut p = particle(Vec2::new(0.0, 95.0), 10.0, Vec2::new(1.0, 1.0), 0.0);
        p.confine(&ring);
        assert!((p.pos - Vec2::new(0.0, 90.0)).length() < 1e-4);
        assert_eq!(p.vel, Vec2::new(1.0, 1.0));

        let b = Container::Box(BoxContainer::new(Vec2::new(400.0, 400.0)));
        let mut s = square(Vec2::new(295.0, 50.0), 20.0, Vec2::ZERO);
        s.confine(&b);
        assert_eq!(s.pos, Vec2::new(290.0, 110.0));
    }

    #[test]
    fn test_grow_stays_inside_ring() {
        let ring = Container::Ring(RingContainer::new(Vec2::ZERO, 100.0));
        let mut p = particle(Vec2::new(40.0, 0.0), 60.0, Vec2::ZERO, 0.0);
        p.grow(&ring, 1.0).unwrap();
        assert_eq!(p.shape, BodyShape::Particle { radius: 61.0 });
        assert!(p.pos.length() + 61.0 <= 100.0 + 1e-3);
    }
}
