//! Execution drivers
//!
//! Both modes own one `Scene` each and share nothing:
//! - `live`: display-paced stepping for on-screen preview
//! - `headless`: fixed-count batch producing frames and an audio-cue timeline

pub mod headless;
pub mod live;

pub use headless::{
    AbortSignal, FrameSink, HeadlessJob, JobReport, JobStatus, RenderedFrame, StepReport,
    progress_for,
};
pub use live::{LiveDriver, LiveTick, PlaybackState};
