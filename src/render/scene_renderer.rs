//! Draws a scene onto a frame
//!
//! Draw order: background, bodies, container outlines, then the sequence
//! overlay at the container center.

use std::collections::HashMap;

use glam::Vec2;
use image::RgbaImage;

use super::assets::AssetResolver;
use super::frame::Frame;
use crate::config::{Appearance, Color};
use crate::sim::body::{Body, BodyShape};
use crate::sim::container::Container;
use crate::sim::scene::Scene;
use crate::sim::sdf::{sd_arc, sd_box, sd_circle, sd_ring};

/// Container outline width in pixels
const STROKE_WIDTH: f32 = 2.0;
/// Overlay width as a fraction of the frame width
const OVERLAY_WIDTH: f32 = 0.3;

/// Resolved look of one body
#[derive(Debug, Clone)]
enum Skin {
    Solid(Color),
    Image(RgbaImage),
}

/// Holds decoded body skins so assets are resolved once per instance
#[derive(Debug, Clone)]
pub struct SceneRenderer {
    skins: HashMap<u32, Skin>,
    fallback: Color,
    /// Decoded sequence frames; None where a frame failed to load
    sequence: Vec<Option<RgbaImage>>,
}

impl SceneRenderer {
    /// Resolve every body's appearance; failed assets fall back to `fallback`
    pub fn new(scene: &Scene, resolver: &dyn AssetResolver, fallback: Color) -> Self {
        let skins = scene
            .bodies
            .iter()
            .map(|body| {
                let skin = match &body.appearance {
                    Appearance::Color(c) => Skin::Solid(*c),
                    Appearance::Asset(reference) => match resolver.resolve_image(reference) {
                        Ok(img) => Skin::Image(img),
                        Err(e) => {
                            log::warn!("body {} drawn with fallback color: {e}", body.id);
                            Skin::Solid(fallback)
                        }
                    },
                };
                (body.id, skin)
            })
            .collect();

        let sequence = scene
            .sequence
            .iter()
            .flat_map(|seq| seq.frames())
            .map(|reference| match resolver.resolve_image(reference) {
                Ok(img) => Some(img),
                Err(e) => {
                    log::warn!("sequence frame skipped: {e}");
                    None
                }
            })
            .collect();

        Self {
            skins,
            fallback,
            sequence,
        }
    }

    /// Render into an existing surface
    pub fn draw(&self, scene: &Scene, frame: &mut Frame) {
        frame.fill(scene.background);
        for body in &scene.bodies {
            self.draw_body(body, frame);
        }
        for container in &scene.containers {
            draw_container(container, frame);
        }
        self.draw_overlay(scene, frame);
    }

    /// Render into a fresh surface sized to the scene
    pub fn render(&self, scene: &Scene) -> Frame {
        let mut frame = Frame::new(
            scene.frame_size.x.max(1.0) as u32,
            scene.frame_size.y.max(1.0) as u32,
        );
        self.draw(scene, &mut frame);
        frame
    }

    fn draw_body(&self, body: &Body, frame: &mut Frame) {
        let h = body.shape.half_extent();
        // one pixel of room for the anti-aliasing ramp
        let min = body.pos - Vec2::splat(h + 1.0);
        let max = body.pos + Vec2::splat(h + 1.0);
        let center = body.pos;
        let sdf = move |p: Vec2| match body.shape {
            BodyShape::Particle { radius } => sd_circle(p, center, radius),
            BodyShape::Square { .. } => sd_box(p, center, Vec2::splat(h)),
        };

        match self.skins.get(&body.id) {
            Some(Skin::Image(img)) => {
                frame.draw_image_clipped(img, center - Vec2::splat(h), center + Vec2::splat(h), sdf)
            }
            Some(Skin::Solid(c)) => frame.fill_sdf(min, max, *c, sdf),
            None => frame.fill_sdf(min, max, self.fallback, sdf),
        }
    }
}

impl SceneRenderer {
    fn draw_overlay(&self, scene: &Scene, frame: &mut Frame) {
        let Some(seq) = &scene.sequence else {
            return;
        };
        let Some(Some(img)) = self.sequence.get(seq.index()) else {
            return;
        };
        let center = scene
            .containers
            .first()
            .map(Container::center)
            .unwrap_or(scene.frame_size / 2.0);
        let w = OVERLAY_WIDTH * scene.frame_size.x;
        let h = w * img.height() as f32 / img.width().max(1) as f32;
        let half = Vec2::new(w, h) / 2.0;
        frame.draw_image_clipped(img, center - half, center + half, |p| {
            sd_box(p, center, half)
        });
    }
}

fn draw_container(container: &Container, frame: &mut Frame) {
    let pad = Vec2::splat(STROKE_WIDTH + 1.0);
    match container {
        Container::Box(b) => {
            let center = b.center();
            let half = Vec2::splat(b.size / 2.0);
            frame.fill_sdf(b.min() - pad, b.max() + pad, Color::RED, |p| {
                sd_box(p, center, half).abs() - STROKE_WIDTH / 2.0
            });
        }
        Container::Ring(r) => {
            let reach = Vec2::splat(r.radius);
            frame.fill_sdf(r.center - reach - pad, r.center + reach + pad, Color::BLUE, |p| {
                sd_ring(p, r.center, r.radius, STROKE_WIDTH)
            });
        }
        Container::Arc(a) => {
            let reach = Vec2::splat(a.radius);
            frame.fill_sdf(a.center - reach - pad, a.center + reach + pad, Color::RED, |p| {
                sd_arc(p, a.center, a.start_angle, a.end_angle, a.radius, STROKE_WIDTH)
            });
        }
    }
}
