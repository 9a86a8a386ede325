//! Display-paced execution
//!
//! The host calls `on_animation_frame` from its display callback with a
//! millisecond timestamp. At most one step runs per callback, once at least
//! one frame interval has elapsed; the remainder carries over so the step
//! rate does not drift.

use std::sync::Arc;

use crate::config::Configuration;
use crate::consts::FRAME_INTERVAL_MS;
use crate::error::SimResult;
use crate::render::{AssetResolver, Frame, SceneRenderer};
use crate::sim::{Scene, tick};

/// Current phase of playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Running,
}

/// Outcome of one display callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveTick {
    /// A simulation step ran and the surface was redrawn
    pub stepped: bool,
    /// The host should schedule another callback
    pub request_next: bool,
}

pub struct LiveDriver {
    scene: Scene,
    renderer: SceneRenderer,
    resolver: Arc<dyn AssetResolver>,
    state: PlaybackState,
    /// Timestamp the elapsed time is measured from; None until anchored
    last_time: Option<f64>,
}

impl LiveDriver {
    pub fn new(config: &Configuration, resolver: Arc<dyn AssetResolver>) -> SimResult<Self> {
        let scene = Scene::from_config(config)?;
        let renderer = SceneRenderer::new(&scene, resolver.as_ref(), config.fallback_color());
        Ok(Self {
            scene,
            renderer,
            resolver,
            state: PlaybackState::Stopped,
            last_time: None,
        })
    }

    pub fn play(&mut self) {
        if self.state == PlaybackState::Running {
            return;
        }
        log::info!("Live playback started at frame {}", self.scene.frame);
        self.state = PlaybackState::Running;
        self.last_time = None;
    }

    /// Stop stepping; the pending callback is declined on its next call
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Stopped {
            return;
        }
        log::info!("Live playback paused at frame {}", self.scene.frame);
        self.state = PlaybackState::Stopped;
        self.last_time = None;
    }

    /// Rebuild from a new configuration; playback stops and the counter restarts
    ///
    /// On error the previous scene is kept.
    pub fn reset_with_config(&mut self, config: &Configuration) -> SimResult<()> {
        let scene = Scene::from_config(config)?;
        self.renderer = SceneRenderer::new(&scene, self.resolver.as_ref(), config.fallback_color());
        self.scene = scene;
        self.state = PlaybackState::Stopped;
        self.last_time = None;
        Ok(())
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Simulated frames so far, for time display
    pub fn current_frame(&self) -> u64 {
        self.scene.frame
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable access, e.g. to subscribe to the scene's event bus
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn draw(&self, surface: &mut Frame) {
        self.renderer.draw(&self.scene, surface);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.scene.resize(width, height);
    }

    /// Display callback
    pub fn on_animation_frame(&mut self, now_ms: f64, surface: &mut Frame) -> LiveTick {
        if self.state != PlaybackState::Running {
            return LiveTick {
                stepped: false,
                request_next: false,
            };
        }

        let Some(last) = self.last_time else {
            self.last_time = Some(now_ms);
            return LiveTick {
                stepped: false,
                request_next: true,
            };
        };

        let delta = now_ms - last;
        let stepped = delta >= FRAME_INTERVAL_MS;
        if stepped {
            tick(&mut self.scene);
            self.draw(surface);
            self.last_time = Some(now_ms - delta % FRAME_INTERVAL_MS);
        }
        LiveTick {
            stepped,
            request_next: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Template;
    use crate::render::MemoryAssetResolver;

    fn driver() -> (LiveDriver, Frame) {
        let config = Configuration {
            canvas_width: 240,
            canvas_height: 320,
            template: Template::SquareBattle,
            seed: 9,
            ..Default::default()
        };
        let driver = LiveDriver::new(&config, Arc::new(MemoryAssetResolver::new())).unwrap();
        (driver, Frame::new(240, 320))
    }

    #[test]
    fn test_stopped_does_not_step() {
        let (mut d, mut surface) = driver();
        let t = d.on_animation_frame(100.0, &mut surface);
        assert!(!t.stepped && !t.request_next);
        assert_eq!(d.current_frame(), 0);
    }

    #[test]
    fn test_paced_stepping_carries_remainder() {
        let (mut d, mut surface) = driver();
        d.play();
        // first callback anchors
        assert!(!d.on_animation_frame(1000.0, &mut surface).stepped);
        // too early
        assert!(!d.on_animation_frame(1010.0, &mut surface).stepped);
        // 20ms elapsed: one step, 3.33ms carried
        assert!(d.on_animation_frame(1020.0, &mut surface).stepped);
        assert_eq!(d.current_frame(), 1);
        // 1020 - 3.33 + 16.67 = 1033.33
        assert!(!d.on_animation_frame(1033.0, &mut surface).stepped);
        assert!(d.on_animation_frame(1034.0, &mut surface).stepped);
        assert_eq!(d.current_frame(), 2);
    }

    #[test]
    fn test_long_gap_steps_once() {
        let (mut d, mut surface) = driver();
        d.play();
        d.on_animation_frame(0.0, &mut surface);
        assert!(d.on_animation_frame(500.0, &mut surface).stepped);
        assert_eq!(d.current_frame(), 1);
    }

    #[test]
    fn test_pause_halts_stepping() {
        let (mut d, mut surface) = driver();
        d.play();
        let mut now = 0.0;
        for _ in 0..10 {
            d.on_animation_frame(now, &mut surface);
            now += 17.0;
        }
        let frozen = d.current_frame();
        assert!(frozen > 0);

        d.pause();
        for _ in 0..10 {
            let t = d.on_animation_frame(now, &mut surface);
            assert!(!t.request_next);
            now += 17.0;
        }
        assert_eq!(d.current_frame(), frozen);

        d.play();
        d.on_animation_frame(now, &mut surface);
        d.on_animation_frame(now + 17.0, &mut surface);
        assert_eq!(d.current_frame(), frozen + 1);
    }

    #[test]
    fn test_reset_with_config() {
        let (mut d, mut surface) = driver();
        d.play();
        d.on_animation_frame(0.0, &mut surface);
        d.on_animation_frame(20.0, &mut surface);
        assert_eq!(d.current_frame(), 1);

        let config = Configuration {
            canvas_width: 240,
            canvas_height: 320,
            template: Template::RingBounce,
            ..Default::default()
        };
        d.reset_with_config(&config).unwrap();
        assert_eq!(d.current_frame(), 0);
        assert_eq!(d.state(), PlaybackState::Stopped);
        assert_eq!(d.scene().bodies.len(), 2);

        let bad = Configuration {
            canvas_width: 0,
            ..config
        };
        assert!(d.reset_with_config(&bad).is_err());
        assert_eq!(d.scene().bodies.len(), 2);
    }

    #[test]
    fn test_step_redraws_surface() {
        let (mut d, _) = driver();
        let mut surface = Frame::new(240, 320);
        let blank = surface.clone();
        d.play();
        d.on_animation_frame(0.0, &mut surface);
        d.on_animation_frame(17.0, &mut surface);
        assert_ne!(surface, blank);
    }
}
