//! Seeded pseudo-random stream
//!
//! A linear congruential generator: identical seeds give identical streams,
//! with no external entropy. The arithmetic is exact 64-bit integer math so
//! the sequence is the same on every platform.

use serde::{Deserialize, Serialize};

/// Modulus (2^31 - 1)
const MODULUS: u64 = 0x7fff_ffff;
/// Multiplier
const MULTIPLIER: u64 = 0x41c6_4e6d;
/// Increment
const INCREMENT: u64 = 0x3039;

/// Deterministic LCG stream (serializable so a run can be resumed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRandom {
    state: u64,
}

impl SeededRandom {
    pub fn new(seed: u32) -> Self {
        Self { state: seed as u64 }
    }

    /// Advance the state and return it (always < MODULUS)
    #[inline]
    fn step(&mut self) -> u64 {
        self.state = (self.state * MULTIPLIER + INCREMENT) % MODULUS;
        self.state
    }

    /// Next value in [0, 1)
    pub fn next(&mut self) -> f64 {
        self.step() as f64 / MODULUS as f64
    }

    /// Next value in [0, 1) as f32
    pub fn next_f32(&mut self) -> f32 {
        self.next() as f32
    }

    /// Integer in [min, max], inclusive at both ends
    pub fn random_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as f64;
        // next() < 1, so the floor never reaches span
        (self.next() * span).floor() as i64 + min
    }
}
