//! Error types for simulation construction and headless runs

use thiserror::Error;

/// Result alias used across the crate
pub type SimResult<T> = Result<T, SimError>;

/// Simulation error taxonomy
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Invalid or incomplete configuration (fatal to construction)
    #[error("Invalid configuration: {reason}")]
    Configuration {
        /// What was wrong
        reason: String,
    },

    /// An external image or sound reference could not be resolved
    #[error("Failed to load asset '{reference}': {reason}")]
    AssetLoad {
        /// Asset reference as given in the configuration
        reference: String,
        /// Underlying failure
        reason: String,
    },

    /// Random placement did not find an overlap-free layout
    #[error(
        "Placement failed after {attempts} attempts: container extent {container_extent}, body extents {body_extents:?}"
    )]
    Placement {
        /// Number of whole-batch attempts made
        attempts: u32,
        /// Box size or container radius
        container_extent: f32,
        /// Radius or side length of each body
        body_extents: Vec<f32>,
    },

    /// Normalizing a zero-length vector
    #[error("Cannot normalize a zero-length vector ({context})")]
    DegenerateVector {
        /// Where the vector came from
        context: &'static str,
    },

    /// Headless job stopped by its abort signal
    #[error("Job aborted after {frames} frames")]
    Aborted {
        /// Frames completed before the abort was observed
        frames: u64,
    },

    /// Headless job exceeded its wall-clock budget
    #[error("Job timed out after {elapsed_ms} ms")]
    TimedOut {
        /// Budget that was exceeded
        elapsed_ms: u128,
    },

    /// The frame consumer rejected a frame
    #[error("Frame sink rejected frame {frame}: {reason}")]
    FrameSink {
        /// Index of the rejected frame
        frame: u64,
        /// Consumer's explanation
        reason: String,
    },
}

impl SimError {
    /// Shorthand for a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        SimError::Configuration {
            reason: reason.into(),
        }
    }

    /// Whether the error is fatal to instance construction
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SimError::Configuration { .. } | SimError::Placement { .. }
        )
    }
}
