//! Fixed timestep simulation tick
//!
//! Advances a scene by exactly one step. Order within a step: every body
//! moves and answers its boundary, containers advance, then each body pair
//! is resolved once and bodies are confined again. The sequence overlay
//! moves last.

use super::body::BoundaryHit;
use super::collision::resolve_pair;
use super::events::SimEvent;
use super::scene::Scene;

/// Advance the scene by one step and return the signals fired during it
///
/// Events carry the frame index the step started at.
pub fn tick(scene: &mut Scene) -> Vec<SimEvent> {
    let frame = scene.frame;
    let damping = scene.tuning.damping_ratio;

    for body in scene.bodies.iter_mut() {
        let Some(container) = scene.containers.get(body.container.0) else {
            log::warn!("body {} references missing container {}", body.id, body.container.0);
            continue;
        };
        match body.step(container, &mut scene.bus, frame, damping) {
            Ok(BoundaryHit::Bounced) => {
                if let Some(seq) = scene.sequence.as_mut() {
                    seq.on_bounce(frame);
                }
                if let Some(amount) = scene.growth {
                    if let Err(e) = body.grow(container, amount) {
                        log::warn!("frame {frame}: growth skipped for body {}: {e}", body.id);
                    }
                }
            }
            Ok(_) => {}
            Err(e) => log::warn!("frame {frame}: boundary response skipped for body {}: {e}", body.id),
        }
    }

    for container in scene.containers.iter_mut() {
        container.step(scene.frame_size);
    }

    // Pairwise, each unordered pair once
    let n = scene.bodies.len();
    for i in 0..n {
        let (head, tail) = scene.bodies.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if let Err(e) = resolve_pair(a, b, &mut scene.bus, frame, damping) {
                log::warn!("frame {frame}: pair ({}, {}) skipped: {e}", a.id, b.id);
            }
        }
    }

    // pair separation may push a body through its wall
    for body in scene.bodies.iter_mut() {
        if let Some(container) = scene.containers.get(body.container.0) {
            body.confine(container);
        }
    }

    if let Some(seq) = scene.sequence.as_mut() {
        seq.advance(frame);
    }

    scene.frame += 1;
    scene.bus.take_fired()
}
