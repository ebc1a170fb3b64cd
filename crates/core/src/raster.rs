//! CPU software [`RenderSurface`] backed by an sRGB pixel buffer.
//!
//! Used for headless rendering and PNG snapshots. Shapes are rasterized with
//! a one-pixel linear coverage ramp at their edges and composited with
//! straight alpha over an opaque background.

use glam::DVec2;

use crate::color::Srgb;
use crate::error::EngineError;
use crate::surface::RenderSurface;

/// An opaque sRGB image with a background color.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    background: Srgb,
    pixels: Vec<Srgb>,
}

impl Raster {
    /// Creates a raster cleared to `background`.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize, background: Srgb) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let len = width
            .checked_mul(height)
            .ok_or(EngineError::InvalidDimensions)?;
        Ok(Self {
            width,
            height,
            background,
            pixels: vec![background; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn background(&self) -> Srgb {
        self.background
    }

    /// Row-major pixel data.
    pub fn pixels(&self) -> &[Srgb] {
        &self.pixels
    }

    /// The pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Srgb> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Blends `color` into every pixel whose center has non-zero coverage.
    fn cover(&mut self, min: DVec2, max: DVec2, color: Srgb, coverage: impl Fn(DVec2) -> f64) {
        if self.pixels.is_empty() || !min.is_finite() || !max.is_finite() {
            return;
        }
        let x0 = min.x.floor().max(0.0) as usize;
        let y0 = min.y.floor().max(0.0) as usize;
        let x1 = (max.x.ceil().max(0.0) as usize).min(self.width);
        let y1 = (max.y.ceil().max(0.0) as usize).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                let alpha = coverage(DVec2::new(x as f64 + 0.5, y as f64 + 0.5));
                if alpha > 0.0 {
                    let idx = y * self.width + x;
                    self.pixels[idx] = color.blend_over(self.pixels[idx], alpha);
                }
            }
        }
    }
}

/// Distance from `p` to the segment `a`-`b`.
fn segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

impl RenderSurface for Raster {
    fn size(&self) -> (f64, f64) {
        (self.width as f64, self.height as f64)
    }

    fn resize(&mut self, width: f64, height: f64) {
        let w = if width.is_finite() { width.max(0.0).round() as usize } else { 0 };
        let h = if height.is_finite() { height.max(0.0).round() as usize } else { 0 };
        let len = w.checked_mul(h).unwrap_or(0);
        self.width = if len == 0 { 0 } else { w };
        self.height = if len == 0 { 0 } else { h };
        self.pixels = vec![self.background; len];
    }

    fn clear(&mut self) {
        let bg = self.background;
        self.pixels.iter_mut().for_each(|p| *p = bg);
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Srgb, opacity: f64) {
        if radius <= 0.0 || opacity <= 0.0 {
            return;
        }
        let reach = DVec2::splat(radius + 1.0);
        self.cover(center - reach, center + reach, color, |p| {
            (radius + 0.5 - p.distance(center)).clamp(0.0, 1.0) * opacity
        });
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Srgb, opacity: f64) {
        if width <= 0.0 || opacity <= 0.0 {
            return;
        }
        let half = width / 2.0;
        let reach = DVec2::splat(half + 1.0);
        self.cover(from.min(to) - reach, from.max(to) + reach, color, |p| {
            (half + 0.5 - segment_distance(p, from, to)).clamp(0.0, 1.0) * opacity
        });
    }
}
