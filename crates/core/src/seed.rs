//! Reproducible description of a headless render.
//!
//! A [`Seed`] captures everything needed to recreate a frame: preset name,
//! surface dimensions, parameter overrides, PRNG seed, tick count and the
//! scripted pointer path fed to the field while it runs.

use std::f64::consts::TAU;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Scripted pointer motion, evaluated once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerPath {
    /// No pointer over the surface.
    #[default]
    None,
    /// Orbit the surface center. `radius` is a fraction of half the shorter side.
    Circle { radius: f64, period_ticks: u64 },
    /// Move left to right across the vertical middle, then wrap.
    Sweep { period_ticks: u64 },
}

impl PointerPath {
    /// Pointer position at `tick` on a `width` x `height` surface.
    pub fn position(&self, tick: u64, width: f64, height: f64) -> Option<DVec2> {
        match *self {
            PointerPath::None => None,
            PointerPath::Circle {
                radius,
                period_ticks,
            } => {
                let phase = (tick % period_ticks.max(1)) as f64 / period_ticks.max(1) as f64;
                let r = radius * width.min(height) * 0.5;
                let center = DVec2::new(width, height) * 0.5;
                Some(center + DVec2::from_angle(phase * TAU) * r)
            }
            PointerPath::Sweep { period_ticks } => {
                let phase = (tick % period_ticks.max(1)) as f64 / period_ticks.max(1) as f64;
                Some(DVec2::new(phase * width, height * 0.5))
            }
        }
    }
}

/// Reproducible headless render.
///
/// Two identical `Seed` values rendered by the same binary produce
/// bit-identical output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    pub preset: String,
    pub width: usize,
    pub height: usize,
    pub params: serde_json::Value,
    pub seed: u64,
    pub ticks: u64,
    #[serde(default)]
    pub pointer: PointerPath,
}

impl Seed {
    /// Creates a Seed with empty params, zero ticks and no pointer.
    pub fn new(preset: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            preset: preset.to_string(),
            width,
            height,
            params: serde_json::Value::Object(serde_json::Map::new()),
            seed,
            ticks: 0,
            pointer: PointerPath::None,
        }
    }

    /// Rejects zero dimensions and pixel counts that overflow `usize`.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(EngineError::InvalidDimensions)?;
        if !self.params.is_object() {
            return Err(EngineError::invalid_config("params", "must be a JSON object"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_seed_with_empty_params_and_no_pointer() {
        let s = Seed::new("neural-network", 640, 480, 42);
        assert_eq!(s.preset, "neural-network");
        assert_eq!(s.ticks, 0);
        assert_eq!(s.params, serde_json::json!({}));
        assert_eq!(s.pointer, PointerPath::None);
    }

    #[test]
    fn json_round_trip_with_pointer_path() {
        let mut s = Seed::new("attraction", 400, 300, 7);
        s.params = serde_json::json!({"count": 40, "damping": 0.95});
        s.ticks = 600;
        s.pointer = PointerPath::Circle {
            radius: 0.5,
            period_ticks: 240,
        };
        let json = serde_json::to_string_pretty(&s).unwrap();
        let restored: Seed = serde_json::from_str(&json).unwrap();
        assert_eq!(s, restored);
    }

    #[test]
    fn missing_pointer_defaults_to_none() {
        let s: Seed = serde_json::from_value(serde_json::json!({
            "preset": "floating", "width": 10, "height": 10,
            "params": {}, "seed": 1, "ticks": 5,
        }))
        .unwrap();
        assert_eq!(s.pointer, PointerPath::None);
    }

    #[test]
    fn validate_rejects_bad_dimensions_and_params() {
        assert!(Seed::new("trail", 0, 10, 1).validate().is_err());
        assert!(Seed::new("trail", usize::MAX, 2, 1).validate().is_err());
        let mut s = Seed::new("trail", 10, 10, 1);
        s.params = serde_json::json!([1, 2]);
        assert!(s.validate().is_err());
        assert!(Seed::new("trail", 10, 10, 1).validate().is_ok());
    }

    #[test]
    fn circle_path_orbits_the_center() {
        let path = PointerPath::Circle {
            radius: 1.0,
            period_ticks: 4,
        };
        let start = path.position(0, 200.0, 100.0).unwrap();
        assert!((start - DVec2::new(150.0, 50.0)).length() < 1e-9);
        let quarter = path.position(1, 200.0, 100.0).unwrap();
        assert!((quarter - DVec2::new(100.0, 100.0)).length() < 1e-9);
        assert_eq!(path.position(4, 200.0, 100.0), path.position(0, 200.0, 100.0));
    }

    #[test]
    fn sweep_path_wraps() {
        let path = PointerPath::Sweep { period_ticks: 10 };
        assert_eq!(path.position(5, 100.0, 40.0), Some(DVec2::new(50.0, 20.0)));
        assert_eq!(path.position(10, 100.0, 40.0), Some(DVec2::new(0.0, 20.0)));
        assert_eq!(PointerPath::None.position(3, 100.0, 40.0), None);
    }
}
