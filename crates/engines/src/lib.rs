#![deny(unsafe_code)]
//! Preset registry: maps effect names to field configurations, plus the
//! headless driver and CPU-side snapshot output.
//!
//! This crate sits between `particle-field-core` (which defines the field and
//! the frame loop) and the front ends. Both the CLI and the WASM bindings
//! depend on it so that preset names resolve the same way everywhere.

pub mod pixel;
pub mod render;

#[cfg(feature = "png")]
pub mod snapshot;

use particle_field_core::config::{FieldConfig, ForceKind, Layout};
use particle_field_core::error::EngineError;
use particle_field_core::force::{DEFAULT_TETHER_ATTRACT_GAIN, DEFAULT_TETHER_ATTRACT_RADIUS};
use particle_field_core::Srgb;
use serde_json::Value;

pub use render::{render_seed, Render};

/// All preset names, in listing order.
const PRESET_NAMES: &[&str] = &[
    "neural-network",
    "floating",
    "attraction",
    "network",
    "trail",
    "repel",
];

/// Accent green shared by the demo effects.
fn accent() -> Srgb {
    Srgb::from_rgb8(0x4a, 0xde, 0x80)
}

/// One named decorative effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Full-page white network with a subtle pull toward the pointer.
    NeuralNetwork,
    /// Unlinked green particles drifting and bouncing.
    Floating,
    /// Particles tethered to their spawn point, drawn toward the pointer.
    Attraction,
    /// Few large nodes with bright links.
    Network,
    /// Nothing but a fading pointer trail.
    Trail,
    /// A 3x3 grid of dots pushed away from the pointer.
    Repel,
}

impl Preset {
    /// Looks a preset up by name.
    ///
    /// Returns `EngineError::UnknownPreset` if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "neural-network" => Ok(Preset::NeuralNetwork),
            "floating" => Ok(Preset::Floating),
            "attraction" => Ok(Preset::Attraction),
            "network" => Ok(Preset::Network),
            "trail" => Ok(Preset::Trail),
            "repel" => Ok(Preset::Repel),
            _ => Err(EngineError::UnknownPreset(name.to_string())),
        }
    }

    /// Returns a slice of all recognized preset names.
    pub fn list_names() -> &'static [&'static str] {
        PRESET_NAMES
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::NeuralNetwork => "neural-network",
            Preset::Floating => "floating",
            Preset::Attraction => "attraction",
            Preset::Network => "network",
            Preset::Trail => "trail",
            Preset::Repel => "repel",
        }
    }

    /// The preset's base configuration.
    pub fn config(self) -> FieldConfig {
        let base = FieldConfig::default();
        match self {
            Preset::NeuralNetwork => base,
            Preset::Floating => FieldConfig {
                count: 30,
                connection_radius: None,
                force: ForceKind::Drift,
                damping: None,
                speed: 0.5,
                radius_min: 1.0,
                radius_max: 4.0,
                opacity_min: 0.2,
                opacity_max: 0.7,
                color: accent(),
                ..base
            },
            Preset::Attraction => FieldConfig {
                count: 40,
                connection_radius: None,
                force: ForceKind::OriginReturn,
                attraction_radius: DEFAULT_TETHER_ATTRACT_RADIUS,
                attraction_gain: DEFAULT_TETHER_ATTRACT_GAIN,
                damping: Some(0.95),
                radius_min: 1.0,
                radius_max: 3.0,
                opacity_min: 0.6,
                opacity_max: 0.6,
                bounded: false,
                color: accent(),
                ..base
            },
            Preset::Network => FieldConfig {
                count: 25,
                connection_radius: Some(100.0),
                link_opacity: 0.3,
                link_width: 1.0,
                force: ForceKind::Drift,
                damping: None,
                speed: 0.3,
                radius_min: 3.0,
                radius_max: 3.0,
                opacity_min: 0.8,
                opacity_max: 0.8,
                color: accent(),
                ..base
            },
            Preset::Trail => FieldConfig {
                count: 0,
                connection_radius: None,
                force: ForceKind::Drift,
                damping: None,
                trail: true,
                color: accent(),
                ..base
            },
            Preset::Repel => FieldConfig {
                count: 9,
                connection_radius: None,
                force: ForceKind::Repel,
                damping: None,
                speed: 0.0,
                radius_min: 20.0,
                radius_max: 20.0,
                opacity_min: 0.3,
                opacity_max: 0.3,
                layout: Layout::Grid,
                grid_columns: 3,
                color: accent(),
                ..base
            },
        }
    }

    /// Preset config with `params` applied and the PRNG seed set.
    ///
    /// The result is validated, so it can be mounted as is.
    pub fn build_config(self, seed: u64, params: &Value) -> Result<FieldConfig, EngineError> {
        let mut config = self.config().with_overrides(params)?;
        config.seed = seed;
        config.validate()?;
        Ok(config)
    }
}
