//! Bounce Reel - deterministic 2D collision simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (containers, bodies, collisions, events)
//! - `render`: Software raster surface and scene drawing
//! - `audio`: Audio-cue timeline synthesis from recorded events
//! - `driver`: Live (display-paced) and headless (batch) execution
//! - `config`: Data-driven scene configuration

pub mod audio;
pub mod config;
pub mod driver;
pub mod error;
pub mod render;
pub mod sim;

pub use audio::{AudioCue, CueSource, merge_timelines, synthesize_cues};
pub use config::{Configuration, PhysicsTuning, SequenceConfig, Template};
pub use driver::{AbortSignal, HeadlessJob, JobReport, JobStatus, LiveDriver, PlaybackState};
pub use error::{SimError, SimResult};

use glam::Vec2;

/// Engine-wide constants
pub mod consts {
    /// Fixed simulation rate (steps per second)
    pub const TARGET_FPS: u32 = 60;
    /// Target interval between live steps (milliseconds)
    pub const FRAME_INTERVAL_MS: f64 = 1000.0 / TARGET_FPS as f64;

    /// Progress reported on the final headless frame; the rest is reserved for encoding
    pub const PROGRESS_CAP: f32 = 75.0;
    /// Upper bound for progress on every frame but the last
    pub const PROGRESS_CEILING: f32 = 74.0;

    /// Silence (in frames) that closes an audio cue
    pub const CUE_GAP_FRAMES: u64 = 60;

    /// Default Arc rotation (radians per step)
    pub const ARC_ANGULAR_VELOCITY: f32 = 0.01;
    /// Default Arc gap (degrees)
    pub const ARC_GAP_DEGREES: f32 = 45.0;

    /// Default share of gravity removed from vertical velocity after a bounce
    pub const DAMPING_RATIO: f32 = 0.5;
    /// Placement gives up after this many whole-batch retries
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 10_000;

    /// Separation margin applied to each square in a square/square contact
    pub const SQUARE_SEPARATION_MARGIN: f32 = 1.0;
}

/// Wrap an angle to [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::TAU;
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}
