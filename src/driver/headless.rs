//! Headless batch execution
//!
//! Runs exactly `floor(fps * duration)` steps, rendering each into a fresh
//! raster and handing it to a sink. The async runner yields after every
//! frame so concurrent jobs interleave, and checks an abort signal at that
//! same point.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::audio::{AudioCue, CueSource, merge_timelines, synthesize_cues};
use crate::config::Configuration;
use crate::consts::{PROGRESS_CAP, PROGRESS_CEILING};
use crate::error::{SimError, SimResult};
use crate::render::{AssetResolver, Frame, SceneRenderer, cue_source};
use crate::sim::{EventKind, Scene, SimEvent, tick};

/// Frames between progress log lines
const LOG_EVERY: u64 = 10;

/// Cooperative cancellation flag shared with whoever may abort the job
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A finished raster ready for encoding
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    pub index: u64,
    pub progress: f32,
    pub frame: Frame,
}

/// Consumer of rendered frames (file writer, encoder pipe, memory)
pub trait FrameSink {
    fn deliver(&mut self, frame: RenderedFrame) -> SimResult<()>;
}

impl FrameSink for Vec<RenderedFrame> {
    fn deliver(&mut self, frame: RenderedFrame) -> SimResult<()> {
        self.push(frame);
        Ok(())
    }
}

/// Result of one synchronous step
#[derive(Debug, Clone)]
pub struct StepReport {
    pub frame_index: u64,
    pub progress: f32,
    pub events: Vec<SimEvent>,
    pub frame: Frame,
}

/// Terminal state of a job
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Completed,
    /// Stopped early; frames already delivered remain valid
    Failed { error: SimError, frames_delivered: u64 },
}

#[derive(Debug, Clone)]
pub struct JobReport {
    pub status: JobStatus,
    pub frames_rendered: u64,
    /// Cue timeline, empty unless the job completed
    pub cues: Vec<AudioCue>,
    /// Every signal recorded during the run
    pub events: Vec<SimEvent>,
}

impl JobReport {
    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Completed
    }
}

/// Progress after rendering frame `index` of `total`
///
/// Strictly increasing, below the ceiling until the final frame, which
/// reports the cap. The rest of the range belongs to the encoder.
pub fn progress_for(index: u64, total: u64) -> f32 {
    if total == 0 || index + 1 >= total {
        return PROGRESS_CAP;
    }
    ((index + 1) as f64 / total as f64 * PROGRESS_CEILING as f64) as f32
}

pub struct HeadlessJob {
    scene: Scene,
    renderer: SceneRenderer,
    total_frames: u64,
    fps: u32,
    cue_gap: u64,
    events: Vec<SimEvent>,
    frames_delivered: u64,
    collision_source: CueSource,
    escape_source: Option<CueSource>,
}

impl HeadlessJob {
    pub fn new(config: &Configuration, resolver: &dyn AssetResolver) -> SimResult<Self> {
        let scene = Scene::from_config(config)?;
        let renderer = SceneRenderer::new(&scene, resolver, config.fallback_color());
        let collision_source = cue_source(resolver, config.collision_sound.as_deref());
        let escape_source = config
            .escape_sound
            .as_deref()
            .map(|s| cue_source(resolver, Some(s)));

        Ok(Self {
            scene,
            renderer,
            total_frames: config.total_frames(),
            fps: config.fps,
            cue_gap: config.physics.cue_gap_frames,
            events: Vec::new(),
            frames_delivered: 0,
            collision_source,
            escape_source,
        })
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn is_done(&self) -> bool {
        self.scene.frame >= self.total_frames
    }

    /// Step and render one frame; None once every frame has been produced
    pub fn step(&mut self) -> Option<StepReport> {
        if self.is_done() {
            return None;
        }
        let frame_index = self.scene.frame;
        let events = tick(&mut self.scene);
        let frame = self.renderer.render(&self.scene);
        self.events.extend_from_slice(&events);

        let progress = progress_for(frame_index, self.total_frames);
        if frame_index % LOG_EVERY == 0 {
            log::debug!(
                "rendered frame {}/{} ({progress:.1}%)",
                frame_index + 1,
                self.total_frames
            );
        }
        Some(StepReport {
            frame_index,
            progress,
            events,
            frame,
        })
    }

    /// Cue timeline for the events recorded so far, measured against the full run
    pub fn cues(&self) -> Vec<AudioCue> {
        let frames_of = |kind: EventKind| -> Vec<u64> {
            self.events
                .iter()
                .filter(|e| e.kind == kind)
                .map(|e| e.frame)
                .collect()
        };
        let mut timelines = vec![synthesize_cues(
            &frames_of(EventKind::Collision),
            self.cue_gap,
            self.fps,
            self.total_frames,
            &self.collision_source,
        )];
        if let Some(source) = &self.escape_source {
            timelines.push(synthesize_cues(
                &frames_of(EventKind::Escape),
                self.cue_gap,
                self.fps,
                self.total_frames,
                source,
            ));
        }
        merge_timelines(timelines)
    }

    async fn run_frames<S>(&mut self, sink: &mut S, abort: &AbortSignal) -> SimResult<()>
    where
        S: FrameSink + ?Sized,
    {
        while let Some(report) = self.step() {
            let index = report.frame_index;
            sink.deliver(RenderedFrame {
                index,
                progress: report.progress,
                frame: report.frame,
            })
            .map_err(|e| match e {
                SimError::FrameSink { reason, .. } => SimError::FrameSink {
                    frame: index,
                    reason,
                },
                other => SimError::FrameSink {
                    frame: index,
                    reason: other.to_string(),
                },
            })?;
            self.frames_delivered += 1;

            tokio::task::yield_now().await;
            if abort.is_aborted() {
                return Err(SimError::Aborted {
                    frames: self.frames_delivered,
                });
            }
        }
        Ok(())
    }

    /// Run to completion, delivering every frame to `sink`
    pub async fn run<S>(
        mut self,
        sink: &mut S,
        abort: &AbortSignal,
        timeout: Option<Duration>,
    ) -> JobReport
    where
        S: FrameSink + ?Sized,
    {
        log::info!(
            "Headless job started: {} frames at {} fps",
            self.total_frames,
            self.fps
        );
        let started = Instant::now();

        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, self.run_frames(sink, abort)).await {
                Ok(r) => r,
                Err(_) => Err(SimError::TimedOut {
                    elapsed_ms: started.elapsed().as_millis(),
                }),
            },
            None => self.run_frames(sink, abort).await,
        };

        let (status, cues) = match result {
            Ok(()) => {
                log::info!(
                    "Headless job completed: {} frames, {} events in {:?}",
                    self.frames_delivered,
                    self.events.len(),
                    started.elapsed()
                );
                (JobStatus::Completed, self.cues())
            }
            Err(error) => {
                log::warn!(
                    "Headless job failed after {} frames: {error}",
                    self.frames_delivered
                );
                (
                    JobStatus::Failed {
                        error,
                        frames_delivered: self.frames_delivered,
                    },
                    Vec::new(),
                )
            }
        };

        JobReport {
            status,
            frames_rendered: self.frames_delivered,
            cues,
            events: self.events,
        }
    }
}
