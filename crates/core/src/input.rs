//! Pointer and surface-size tracking.
//!
//! The environment delivers [`InputEvent`]s whenever it likes. The
//! [`InputTracker`] keeps only the latest pointer position and surface size,
//! and the simulation reads them through an immutable [`InputSnapshot`]
//! taken once per tick.

use glam::DVec2;

use crate::boundary::Bounds;

/// A raw signal from the host environment, in surface-relative coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove { x: f64, y: f64 },
    /// The pointer left the surface.
    PointerLeave,
    Resize { width: f64, height: f64 },
}

/// Read-only view of the input state for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSnapshot {
    /// Latest pointer position, `None` until the first move or after a leave.
    pub pointer: Option<DVec2>,
    pub bounds: Bounds,
}

/// Latest-value store for pointer and size signals. No event queue.
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    pointer: Option<DVec2>,
    bounds: Bounds,
}

impl InputTracker {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            pointer: None,
            bounds: Bounds::new(width, height),
        }
    }

    /// Records an event. Non-finite coordinates are ignored.
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { x, y } => {
                if x.is_finite() && y.is_finite() {
                    self.pointer = Some(DVec2::new(x, y));
                }
            }
            InputEvent::PointerLeave => self.pointer = None,
            InputEvent::Resize { width, height } => self.bounds = Bounds::new(width, height),
        }
    }

    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            pointer: self.pointer,
            bounds: self.bounds,
        }
    }
}
