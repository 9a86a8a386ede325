//! Random non-overlapping initial placement
//!
//! Every attempt samples a fresh center for each body of the batch; the batch
//! is accepted only when no two bodies overlap. A shape that can never fit
//! fails up front instead of spinning through the attempt budget.

use super::body::Body;
use super::container::Container;
use super::random::SeededRandom;
use crate::error::{SimError, SimResult};

/// Place `bodies` inside `container`, returning the number of attempts used
pub fn place_bodies(
    container: &Container,
    bodies: &mut [&mut Body],
    rng: &mut SeededRandom,
    max_attempts: u32,
) -> SimResult<u32> {
    if bodies.is_empty() {
        return Ok(0);
    }

    let placement_error = |attempts, bodies: &[&mut Body]| SimError::Placement {
        attempts,
        container_extent: container.extent(),
        body_extents: bodies.iter().map(|b| b.shape.extent()).collect(),
    };

    if bodies.iter().any(|b| !container.can_hold(&b.shape)) {
        return Err(placement_error(0, &*bodies));
    }

    for attempt in 1..=max_attempts {
        for body in bodies.iter_mut() {
            body.pos = container.sample_center(&body.shape, rng);
        }
        if !any_overlap(bodies) {
            log::debug!(
                "placed {} bodies after {} attempt(s)",
                bodies.len(),
                attempt
            );
            return Ok(attempt);
        }
    }

    log::warn!(
        "placement gave up after {} attempts for {} bodies",
        max_attempts,
        bodies.len()
    );
    Err(placement_error(max_attempts, &*bodies))
}

fn any_overlap(bodies: &[&mut Body]) -> bool {
    bodies.iter().enumerate().any(|(i, a)| {
        bodies[i + 1..]
            .iter()
            .any(|b| a.overlaps(b))
    })
}
