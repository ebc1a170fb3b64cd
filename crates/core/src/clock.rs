//! Maps scheduler timestamps to a per-frame step scale.

use crate::config::Integration;

/// Upper bound on a single delta-scaled step, in reference frames. Keeps a
/// long stall (background tab, debugger) from launching particles.
pub const MAX_STEP_SCALE: f64 = 4.0;

#[derive(Debug, Clone)]
pub struct FrameClock {
    mode: Integration,
    /// Duration of one reference frame in milliseconds.
    reference_ms: f64,
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new(mode: Integration, reference_fps: f64) -> Self {
        Self {
            mode,
            reference_ms: 1000.0 / reference_fps,
            last_ms: None,
        }
    }

    /// Step scale for a frame stamped `timestamp_ms`.
    ///
    /// Frame-coupled clocks always return 1. Delta clocks return elapsed time
    /// in reference frames, 1 for the first frame, clamped to
    /// `[0, MAX_STEP_SCALE]`.
    pub fn advance(&mut self, timestamp_ms: f64) -> f64 {
        let previous = self.last_ms.replace(timestamp_ms);
        match (self.mode, previous) {
            (Integration::Frame, _) | (Integration::Delta, None) => 1.0,
            (Integration::Delta, Some(prev)) => {
                let scale = (timestamp_ms - prev) / self.reference_ms;
                if scale.is_finite() {
                    scale.clamp(0.0, MAX_STEP_SCALE)
                } else {
                    1.0
                }
            }
        }
    }
}
