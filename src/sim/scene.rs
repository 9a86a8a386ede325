//! Simulation instance state
//!
//! A `Scene` owns everything one run mutates: containers, bodies, the seeded
//! stream and its own event bus. Nothing is shared between scenes.

use glam::Vec2;

use super::body::Body;
use super::container::{ArcContainer, BoxContainer, Container, ContainerId, RingContainer};
use super::events::{EventBus, Namespace};
use super::placement::place_bodies;
use super::random::SeededRandom;
use super::sequence::SequencePlayhead;
use crate::config::{Color, Configuration, PhysicsTuning, Template};
use crate::error::{SimError, SimResult};

#[derive(Debug)]
pub struct Scene {
    /// Steps completed so far
    pub frame: u64,
    pub frame_size: Vec2,
    pub containers: Vec<Container>,
    pub bodies: Vec<Body>,
    pub rng: SeededRandom,
    pub bus: EventBus,
    pub namespace: Namespace,
    pub background: Color,
    pub tuning: PhysicsTuning,
    /// Radius gained per boundary bounce, if bodies grow
    pub growth: Option<f32>,
    /// Center overlay advanced by boundary bounces, if configured
    pub sequence: Option<SequencePlayhead>,
    next_body_id: u32,
}

impl Scene {
    /// Empty scene with its own RNG and bus
    pub fn new(frame_size: Vec2, seed: u32, namespace: Namespace, tuning: PhysicsTuning) -> Self {
        Self {
            frame: 0,
            frame_size,
            containers: Vec::new(),
            bodies: Vec::new(),
            rng: SeededRandom::new(seed),
            bus: EventBus::new(),
            namespace,
            background: Color::BLACK,
            tuning,
            growth: None,
            sequence: None,
            next_body_id: 0,
        }
    }

    pub fn add_container(&mut self, container: Container) -> ContainerId {
        self.containers.push(container);
        ContainerId(self.containers.len() - 1)
    }

    /// Add a body, assigning it the next id
    pub fn add_body(&mut self, mut body: Body) -> u32 {
        body.id = self.next_body_id;
        self.next_body_id += 1;
        self.bodies.push(body);
        self.next_body_id - 1
    }

    /// Place every body that belongs to `id` without overlaps
    pub fn place_bodies(&mut self, id: ContainerId) -> SimResult<u32> {
        let container = self
            .containers
            .get(id.0)
            .ok_or_else(|| SimError::config(format!("no container with index {}", id.0)))?;
        let mut members: Vec<&mut Body> = self
            .bodies
            .iter_mut()
            .filter(|b| b.container == id)
            .collect();
        place_bodies(
            container,
            &mut members,
            &mut self.rng,
            self.tuning.max_placement_attempts,
        )
    }

    /// Build a ready-to-run scene from a configuration
    pub fn from_config(config: &Configuration) -> SimResult<Self> {
        config.validate()?;
        let frame_size = Vec2::new(config.canvas_width as f32, config.canvas_height as f32);
        let scale = config.scale_factor();
        let namespace = Namespace(config.namespace_token());
        let appearances = config.body_appearances()?;

        let mut scene = Scene::new(frame_size, config.seed, namespace, config.physics.clone());
        scene.background = config.background();
        let center = frame_size / 2.0;

        let particle = |vel: Vec2, radius: f32, gravity: f32, i: usize, cid| {
            Body::particle(
                0,
                Vec2::ZERO,
                radius,
                vel,
                gravity,
                appearances[i].clone(),
                cid,
                namespace,
            )
        };

        match config.template {
            Template::RingBounce => {
                let cid = scene.add_container(Container::Ring(RingContainer::new(
                    center,
                    200.0 * scale,
                )));
                let a = particle(Vec2::new(0.0, 1.0) * scale, 25.0 * scale, 0.2 * scale, 0, cid);
                let b = particle(Vec2::new(1.0, 0.0) * scale, 25.0 * scale, 0.2 * scale, 1, cid);
                scene.add_body(a);
                scene.add_body(b);
            }
            Template::ArcEscape => {
                let arc = ArcContainer::new(
                    center,
                    frame_size.x / 2.25,
                    config.gap_angle_deg,
                    config.physics.arc_angular_velocity,
                )?;
                let cid = scene.add_container(Container::Arc(arc));
                let a = particle(Vec2::new(0.0, 5.0) * scale, 40.0 * scale, 0.25 * scale, 0, cid);
                scene.add_body(a);
            }
            Template::SquareBattle => {
                let boxed = BoxContainer::new(frame_size);
                let side = boxed.size * 0.2 * scale;
                let cid = scene.add_container(Container::Box(boxed));
                let velocities = [Vec2::new(6.0, 4.0), Vec2::new(-8.0, 7.0)];
                for (i, vel) in velocities.into_iter().enumerate() {
                    scene.add_body(Body::square(
                        0,
                        Vec2::ZERO,
                        side,
                        vel * scale,
                        appearances[i].clone(),
                        cid,
                        namespace,
                    ));
                }
            }
            Template::GrowingBall => {
                let cid = scene.add_container(Container::Ring(RingContainer::new(
                    center,
                    0.8 * 360.0 * scale,
                )));
                let a = particle(Vec2::new(4.0, 6.0) * scale, 60.0 * scale, 0.25 * scale, 0, cid);
                scene.add_body(a);
                scene.growth = Some(config.physics.growth_per_bounce);
                scene.sequence = config.sequence.as_ref().map(|seq| {
                    SequencePlayhead::new(
                        seq.frame_refs(),
                        seq.fps,
                        config.fps,
                        config.physics.cue_gap_frames,
                    )
                });
            }
        }

        let attempts = scene.place_bodies(ContainerId(0))?;
        log::info!(
            "Built {} scene {}x{} (seed {}, {} bodies, placed in {} attempt(s))",
            config.template.as_str(),
            config.canvas_width,
            config.canvas_height,
            config.seed,
            scene.bodies.len(),
            attempts
        );
        Ok(scene)
    }

    /// Change the frame size; a Box re-centers on the next step
    pub fn resize(&mut self, width: u32, height: u32) {
        self.frame_size = Vec2::new(width as f32, height as f32);
    }
}
