//! The `Engine` trait the frame loop drives.
//!
//! The trait is object-safe so the loop can own a `Box<dyn Engine>`; the
//! particle [`Field`](crate::field::Field) is the one production
//! implementation.

use glam::DVec2;
use serde_json::Value;

use crate::input::InputSnapshot;
use crate::surface::RenderSurface;

/// Something that can be advanced and painted once per display frame.
pub trait Engine {
    /// Runs one frame: update state from `input`, then paint into `surface`.
    ///
    /// `timestamp_ms` is the scheduler's frame time. Returns `false` when the
    /// frame was skipped (for example because the surface has no area).
    fn frame(
        &mut self,
        input: &InputSnapshot,
        timestamp_ms: f64,
        surface: &mut dyn RenderSurface,
    ) -> bool;

    /// Called for every pointer move, between frames.
    fn pointer_moved(&mut self, _position: DVec2) {}

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters.
    fn param_schema(&self) -> Value;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::Bounds;
    use crate::surface::RecordingSurface;
    use serde_json::json;

    /// Counts frames and moves; paints one dot per frame at the pointer.
    struct MockEngine {
        frames: usize,
        moves: usize,
    }

    impl Engine for MockEngine {
        fn frame(
            &mut self,
            input: &InputSnapshot,
            _timestamp_ms: f64,
            surface: &mut dyn RenderSurface,
        ) -> bool {
            self.frames += 1;
            surface.clear();
            if let Some(p) = input.pointer {
                surface.fill_circle(p, 1.0, crate::color::Srgb::WHITE, 1.0);
            }
            true
        }

        fn pointer_moved(&mut self, _position: DVec2) {
            self.moves += 1;
        }

        fn params(&self) -> Value {
            json!({"frames": self.frames})
        }

        fn param_schema(&self) -> Value {
            json!({"frames": {"type": "integer"}})
        }
    }

    #[test]
    fn engine_trait_is_object_safe() {
        let mut engine: Box<dyn Engine> = Box::new(MockEngine { frames: 0, moves: 0 });
        let mut surface = RecordingSurface::new(10.0, 10.0);
        let input = InputSnapshot {
            pointer: Some(DVec2::new(2.0, 3.0)),
            bounds: Bounds::new(10.0, 10.0),
        };
        assert!(engine.frame(&input, 0.0, &mut surface));
        engine.pointer_moved(DVec2::ZERO);
        assert_eq!(engine.params()["frames"], 1);
        assert_eq!(surface.circles().count(), 1);
        assert_eq!(engine.param_schema()["frames"]["type"], "integer");
    }
}
