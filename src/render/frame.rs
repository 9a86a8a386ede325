//! In-memory raster surface
//!
//! A thin wrapper over `image::RgbaImage` with alpha-blended shape fills.
//! Pixel centers sit at (x + 0.5, y + 0.5) in scene coordinates.

use std::path::Path;

use glam::Vec2;
use image::{Rgba, RgbaImage};

use crate::config::Color;
use crate::error::{SimError, SimResult};
use crate::sim::sdf::coverage;

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image: RgbaImage,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn fill(&mut self, color: Color) {
        for px in self.image.pixels_mut() {
            *px = Rgba(color.0);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        (x < self.width() && y < self.height()).then(|| Color(self.image.get_pixel(x, y).0))
    }

    /// Source-over blend of `color` scaled by `amount` in [0, 1]
    pub fn blend(&mut self, x: u32, y: u32, color: Color, amount: f32) {
        if x >= self.width() || y >= self.height() {
            return;
        }
        let a = (color.0[3] as f32 / 255.0) * amount.clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x, y);
        for c in 0..3 {
            let mixed = color.0[c] as f32 * a + dst.0[c] as f32 * (1.0 - a);
            dst.0[c] = mixed.round().clamp(0.0, 255.0) as u8;
        }
        let out_a = a + (dst.0[3] as f32 / 255.0) * (1.0 - a);
        dst.0[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Pixel range covering [min, max], clipped to the surface
    fn span(&self, min: Vec2, max: Vec2) -> Option<(u32, u32, u32, u32)> {
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(self.width());
        let y1 = (max.y.ceil().max(0.0) as u32).min(self.height());
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    /// Fill the inside of a signed distance field within a bounding box
    pub fn fill_sdf<F>(&mut self, min: Vec2, max: Vec2, color: Color, sdf: F)
    where
        F: Fn(Vec2) -> f32,
    {
        let Some((x0, y0, x1, y1)) = self.span(min, max) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let cov = coverage(sdf(p));
                if cov > 0.0 {
                    self.blend(x, y, color, cov);
                }
            }
        }
    }

    /// Draw `src` stretched over [min, max], clipped to the inside of `sdf`
    pub fn draw_image_clipped<F>(&mut self, src: &RgbaImage, min: Vec2, max: Vec2, sdf: F)
    where
        F: Fn(Vec2) -> f32,
    {
        let extent = max - min;
        if extent.x <= 0.0 || extent.y <= 0.0 || src.width() == 0 || src.height() == 0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.span(min, max) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let cov = coverage(sdf(p));
                if cov <= 0.0 {
                    continue;
                }
                let uv = (p - min) / extent;
                let sx = ((uv.x * src.width() as f32) as u32).min(src.width() - 1);
                let sy = ((uv.y * src.height() as f32) as u32).min(src.height() - 1);
                let texel = Color(src.get_pixel(sx, sy).0);
                self.blend(x, y, texel, cov);
            }
        }
    }

    /// Write the frame as PNG
    pub fn save_png(&self, path: impl AsRef<Path>) -> SimResult<()> {
        let path = path.as_ref();
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| SimError::FrameSink {
                frame: 0,
                reason: format!("{}: {e}", path.display()),
            })
    }
}
