//! CPU surface backed by an `image::RgbaImage`.

use std::path::Path;

use glam::Vec2;
use image::RgbaImage;
use penline_platform::ViewportMetrics;
use tracing::debug;

use crate::color::Rgba;
use crate::surface::{Rect, Surface};

/// Software surface sized to the viewport times its device pixel ratio.
///
/// Draw calls take logical coordinates and are scaled to physical pixels,
/// the same way a canvas context is scaled once after a resize.
pub struct RasterSurface {
    image: RgbaImage,
    metrics: ViewportMetrics,
    background: Rgba,
}

impl RasterSurface {
    pub fn new(metrics: ViewportMetrics) -> Self {
        let metrics = metrics.sanitized(ViewportMetrics::default());
        let (width, height) = metrics.physical_size();
        Self {
            image: RgbaImage::new(width, height),
            metrics,
            background: Rgba::TRANSPARENT,
        }
    }

    pub fn with_background(mut self, background: Rgba) -> Self {
        self.background = background;
        self.clear();
        self
    }

    pub fn metrics(&self) -> ViewportMetrics {
        self.metrics
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Pixel at physical coordinates, `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.image.width() || y >= self.image.height() {
            return None;
        }
        let index = (y * self.image.width() + x) as usize;
        Some(self.pixels()[index])
    }

    pub fn pixels(&self) -> &[Rgba] {
        let bytes: &[u8] = &self.image;
        bytemuck::cast_slice(bytes)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.image.save(path)
    }

    fn scale(&self) -> f32 {
        self.metrics.device_pixel_ratio
    }

    /// Blends `color` into every pixel whose center satisfies `inside`,
    /// scanning only the physical box spanned by `min..max`.
    fn shade(&mut self, min: Vec2, max: Vec2, color: Rgba, inside: impl Fn(Vec2) -> bool) {
        if color.a == 0 {
            return;
        }
        let width = self.image.width();
        let height = self.image.height();
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(width);
        let y1 = (max.y.ceil().max(0.0) as u32).min(height);
        let bytes: &mut [u8] = &mut self.image;
        let pixels: &mut [Rgba] = bytemuck::cast_slice_mut(bytes);
        for y in y0..y1 {
            for x in x0..x1 {
                let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if inside(center) {
                    let index = (y * width + x) as usize;
                    pixels[index] = color.over(pixels[index]);
                }
            }
        }
    }
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

impl Surface for RasterSurface {
    fn clear(&mut self) {
        let background = self.background;
        let bytes: &mut [u8] = &mut self.image;
        let pixels: &mut [Rgba] = bytemuck::cast_slice_mut(bytes);
        pixels.fill(background);
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        let scale = self.scale();
        let (a, b) = (from * scale, to * scale);
        let half = (width * scale * 0.5).max(0.5);
        let min = a.min(b) - Vec2::splat(half);
        let max = a.max(b) + Vec2::splat(half);
        self.shade(min, max, color, |p| distance_to_segment(p, a, b) <= half);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let scale = self.scale();
        let (min, max) = (rect.min * scale, rect.max() * scale);
        self.shade(min, max, color, |p| p.cmpge(min).all() && p.cmple(max).all());
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgba, width: f32) {
        let scale = self.scale();
        let half = Vec2::splat((width * scale * 0.5).max(0.5));
        let (min, max) = (rect.min * scale, rect.max() * scale);
        let (outer_min, outer_max) = (min - half, max + half);
        let (inner_min, inner_max) = (min + half, max - half);
        self.shade(outer_min, outer_max, color, |p| {
            let in_outer = p.cmpge(outer_min).all() && p.cmple(outer_max).all();
            let in_inner = p.cmpgt(inner_min).all() && p.cmplt(inner_max).all();
            in_outer && !in_inner
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        let scale = self.scale();
        let (c, r) = (center * scale, radius * scale);
        if r <= 0.0 {
            return;
        }
        self.shade(c - Vec2::splat(r), c + Vec2::splat(r), color, |p| {
            p.distance_squared(c) <= r * r
        });
    }

    fn resize(&mut self, metrics: ViewportMetrics) {
        let metrics = metrics.sanitized(self.metrics);
        if metrics == self.metrics {
            return;
        }
        let (width, height) = metrics.physical_size();
        debug!(
            "raster surface resize {}x{} @ {} -> {width}x{height}px",
            metrics.width, metrics.height, metrics.device_pixel_ratio
        );
        self.metrics = metrics;
        self.image = RgbaImage::new(width, height);
        self.clear();
    }
}
