//! The drawing abstraction the engine paints into.
//!
//! A [`RenderSurface`] is anything resizable that can clear itself, fill a
//! circle and stroke a line. The browser canvas, the CPU [`Raster`] and the
//! command-recording surface used in tests all implement it.
//!
//! [`Raster`]: crate::raster::Raster

use std::cell::RefCell;
use std::rc::Rc;

use glam::DVec2;

use crate::color::Srgb;

/// A resizable 2D drawing target.
pub trait RenderSurface {
    /// Current drawable size in surface units.
    fn size(&self) -> (f64, f64);

    /// Changes the drawable size. Contents after a resize are unspecified
    /// until the next [`clear`](RenderSurface::clear).
    fn resize(&mut self, width: f64, height: f64);

    /// Erases the whole surface.
    fn clear(&mut self);

    /// Fills a circle of `radius` around `center`.
    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Srgb, opacity: f64);

    /// Strokes a straight segment of the given `width`.
    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Srgb, opacity: f64);
}

impl<S: RenderSurface + ?Sized> RenderSurface for Box<S> {
    fn size(&self) -> (f64, f64) {
        (**self).size()
    }

    fn resize(&mut self, width: f64, height: f64) {
        (**self).resize(width, height)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Srgb, opacity: f64) {
        (**self).fill_circle(center, radius, color, opacity)
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Srgb, opacity: f64) {
        (**self).stroke_line(from, to, width, color, opacity)
    }
}

/// Shared surface, so a host can read back pixels or commands while the
/// loop owns a handle. The loop never holds a borrow across calls.
impl<S: RenderSurface> RenderSurface for Rc<RefCell<S>> {
    fn size(&self) -> (f64, f64) {
        self.borrow().size()
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.borrow_mut().resize(width, height)
    }

    fn clear(&mut self) {
        self.borrow_mut().clear()
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Srgb, opacity: f64) {
        self.borrow_mut().fill_circle(center, radius, color, opacity)
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Srgb, opacity: f64) {
        self.borrow_mut()
            .stroke_line(from, to, width, color, opacity)
    }
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Circle {
        center: DVec2,
        radius: f64,
        opacity: f64,
    },
    Line {
        from: DVec2,
        to: DVec2,
        width: f64,
        opacity: f64,
    },
}

/// Surface that records the draw calls of the most recent frame.
///
/// `clear` discards the previous frame's commands, so after a tick
/// [`commands`](RecordingSurface::commands) holds exactly one frame.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
    frames: usize,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Commands issued since the last clear, starting with the clear itself.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of clears, i.e. painted frames.
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
    }
}

impl RenderSurface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
        self.frames += 1;
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, _color: Srgb, opacity: f64) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            opacity,
        });
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, _color: Srgb, opacity: f64) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            opacity,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_starts_a_new_frame() {
        let mut s = RecordingSurface::new(10.0, 10.0);
        s.clear();
        s.fill_circle(DVec2::ZERO, 1.0, Srgb::WHITE, 1.0);
        s.clear();
        assert_eq!(s.commands(), &[DrawCommand::Clear]);
        assert_eq!(s.frames(), 2);
    }

    #[test]
    fn circles_and_lines_filter_by_kind() {
        let mut s = RecordingSurface::new(10.0, 10.0);
        s.clear();
        s.fill_circle(DVec2::ZERO, 1.0, Srgb::WHITE, 0.5);
        s.stroke_line(DVec2::ZERO, DVec2::ONE, 0.5, Srgb::WHITE, 0.1);
        s.fill_circle(DVec2::ONE, 2.0, Srgb::WHITE, 0.5);
        assert_eq!(s.circles().count(), 2);
        assert_eq!(s.lines().count(), 1);
    }

    #[test]
    fn boxed_surface_forwards_calls() {
        let mut s: Box<dyn RenderSurface> = Box::new(RecordingSurface::new(4.0, 3.0));
        assert_eq!(s.size(), (4.0, 3.0));
        s.resize(8.0, 6.0);
        assert_eq!(s.size(), (8.0, 6.0));
    }

    #[test]
    fn shared_surface_is_visible_through_both_handles() {
        let shared = Rc::new(RefCell::new(RecordingSurface::new(4.0, 4.0)));
        let mut handle: Box<dyn RenderSurface> = Box::new(Rc::clone(&shared));
        handle.clear();
        handle.fill_circle(DVec2::ONE, 1.0, Srgb::WHITE, 1.0);
        assert_eq!(shared.borrow().circles().count(), 1);
        assert_eq!(shared.borrow().frames(), 1);
    }
}
