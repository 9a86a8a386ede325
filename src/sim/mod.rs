//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed step only
//! - Seeded RNG only
//! - Stable iteration order (by body id)
//! - No rendering or platform dependencies beyond the SDF helpers

pub mod body;
pub mod collision;
pub mod container;
pub mod events;
pub mod placement;
pub mod random;
pub mod scene;
pub mod sdf;
pub mod sequence;
pub mod tick;
pub mod vector;

pub use body::{Body, BodyShape, BoundaryHit};
pub use collision::{ContactZone, elastic_exchange, reflect_velocity, resolve_pair};
pub use container::{ArcContainer, BoxContainer, Container, ContainerId, RingContainer};
pub use events::{EventBus, EventKind, ListenerId, Namespace, SimEvent};
pub use placement::place_bodies;
pub use random::SeededRandom;
pub use scene::Scene;
pub use sequence::SequencePlayhead;
pub use tick::tick;
pub use vector::{Vector2, VectorExt};
