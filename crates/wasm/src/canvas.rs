//! [`RenderSurface`] over a 2d canvas context.

use std::f64::consts::TAU;

use glam::DVec2;
use particle_field_core::{RenderSurface, Srgb};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl CanvasSurface {
    /// Sizes the backing store to the element's layout size and grabs its
    /// 2d context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, String> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| format!("{e:?}"))?
            .ok_or("no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "not a 2d context")?;
        let mut surface = Self {
            width: 0.0,
            height: 0.0,
            canvas,
            ctx,
        };
        let (w, h) = surface.layout_size();
        surface.resize(w, h);
        Ok(surface)
    }

    /// The element's current CSS size.
    pub fn layout_size(&self) -> (f64, f64) {
        (
            self.canvas.client_width() as f64,
            self.canvas.client_height() as f64,
        )
    }
}

impl RenderSurface for CanvasSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: f64, height: f64) {
        let w = if width.is_finite() { width.max(0.0) } else { 0.0 };
        let h = if height.is_finite() { height.max(0.0) } else { 0.0 };
        self.canvas.set_width(w as u32);
        self.canvas.set_height(h as u32);
        self.width = w;
        self.height = h;
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Srgb, opacity: f64) {
        if radius <= 0.0 {
            return;
        }
        self.ctx.begin_path();
        self.ctx.arc(center.x, center.y, radius, 0.0, TAU).ok();
        self.ctx.set_fill_style_str(&color.to_css_rgba(opacity));
        self.ctx.fill();
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Srgb, opacity: f64) {
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.set_stroke_style_str(&color.to_css_rgba(opacity));
        self.ctx.set_line_width(width);
        self.ctx.stroke();
    }
}
