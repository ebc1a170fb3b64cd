//! Field configuration: JSON extraction, validation and parameter schema.
//!
//! Configs are plain data. [`FieldConfig::with_overrides`] reads a JSON
//! object leniently: missing keys keep the current value, and a present key
//! of the wrong type is ignored the same way. Range checking happens in
//! [`FieldConfig::validate`], which mounting calls before anything starts.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::boundary::BoundaryPolicy;
use crate::color::Srgb;
use crate::error::EngineError;
use crate::force::{
    ForceModel, DEFAULT_ATTRACT_GAIN, DEFAULT_ATTRACT_RADIUS, DEFAULT_REPEL_RADIUS,
    DEFAULT_REPEL_STRENGTH, DEFAULT_SPRING_GAIN, DEFAULT_TETHER_ATTRACT_GAIN,
    DEFAULT_TETHER_ATTRACT_RADIUS,
};
use crate::proximity::ProximityLinker;

/// Largest accepted particle population.
pub const MAX_COUNT: usize = 500;
/// Largest accepted trail length.
pub const MAX_TRAIL_LENGTH: usize = 1000;

/// Which [`ForceModel`] variant a field uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceKind {
    Drift,
    #[default]
    Attract,
    OriginReturn,
    Repel,
}

/// Initial particle placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Uniformly random positions over the surface.
    #[default]
    Scatter,
    /// Cell centers of a regular grid with `grid_columns` columns.
    Grid,
}

/// How elapsed time maps onto simulation steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integration {
    /// One tick per frame regardless of frame duration.
    #[default]
    Frame,
    /// Steps are scaled by elapsed time relative to `reference_fps`.
    Delta,
}

/// Everything needed to build a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Particle population. May be 0 only for pure trail fields.
    pub count: usize,
    /// Link threshold; `None` disables links.
    pub connection_radius: Option<f64>,
    pub link_opacity: f64,
    pub link_width: f64,
    pub force: ForceKind,
    pub attraction_radius: f64,
    pub attraction_gain: f64,
    pub spring_gain: f64,
    pub repulsion_radius: f64,
    pub repulsion_strength: f64,
    /// Per-tick velocity multiplier in (0, 1); `None` disables damping.
    pub damping: Option<f64>,
    pub trail: bool,
    pub trail_max_length: usize,
    pub trail_decay_rate: f64,
    pub trail_opacity: f64,
    /// Spread of initial velocity components, centered on zero.
    pub speed: f64,
    pub radius_min: f64,
    pub radius_max: f64,
    pub opacity_min: f64,
    pub opacity_max: f64,
    pub layout: Layout,
    pub grid_columns: usize,
    /// Whether particles reflect off the surface edges.
    pub bounded: bool,
    pub color: Srgb,
    pub integration: Integration,
    pub reference_fps: f64,
    pub seed: u64,
}

/// Defaults reproduce the full-page neural-network background.
impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            count: 60,
            connection_radius: Some(120.0),
            link_opacity: 0.15,
            link_width: 0.5,
            force: ForceKind::Attract,
            attraction_radius: DEFAULT_ATTRACT_RADIUS,
            attraction_gain: DEFAULT_ATTRACT_GAIN,
            spring_gain: DEFAULT_SPRING_GAIN,
            repulsion_radius: DEFAULT_REPEL_RADIUS,
            repulsion_strength: DEFAULT_REPEL_STRENGTH,
            damping: Some(0.99),
            trail: false,
            trail_max_length: 50,
            trail_decay_rate: 0.02,
            trail_opacity: 0.6,
            speed: 0.3,
            radius_min: 0.5,
            radius_max: 2.0,
            opacity_min: 0.6,
            opacity_max: 0.6,
            layout: Layout::Scatter,
            grid_columns: 3,
            bounded: true,
            color: Srgb::WHITE,
            integration: Integration::Frame,
            reference_fps: 60.0,
            seed: 42,
        }
    }
}

fn param_f64(params: &Value, name: &str, current: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(current)
}

fn param_usize(params: &Value, name: &str, current: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| usize::try_from(v).unwrap_or(usize::MAX))
        .unwrap_or(current)
}

fn param_u64(params: &Value, name: &str, current: u64) -> u64 {
    params.get(name).and_then(Value::as_u64).unwrap_or(current)
}

fn param_bool(params: &Value, name: &str, current: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(current)
}

/// Like [`param_f64`], but an explicit `null` switches the option off.
fn param_opt_f64(params: &Value, name: &str, current: Option<f64>) -> Option<f64> {
    match params.get(name) {
        Some(Value::Null) => None,
        Some(v) => v.as_f64().or(current),
        None => current,
    }
}

/// Parses a snake_case enum value; a present but unrecognized name is an error.
fn param_enum<T>(params: &Value, name: &str, current: T) -> Result<T, EngineError>
where
    T: for<'de> Deserialize<'de>,
{
    match params.get(name) {
        Some(v @ Value::String(_)) => serde_json::from_value(v.clone())
            .map_err(|_| EngineError::invalid_config(name, format!("unrecognized value {v}"))),
        _ => Ok(current),
    }
}

impl FieldConfig {
    /// Default config with `params` applied on top.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        Self::default().with_overrides(params)
    }

    /// Applies the keys present in `params`.
    ///
    /// Switching `force` without also giving `attraction_radius` /
    /// `attraction_gain` picks that force's own defaults, so
    /// `{"force": "origin_return"}` alone yields the tethered behavior.
    pub fn with_overrides(mut self, params: &Value) -> Result<Self, EngineError> {
        let force = param_enum(params, "force", self.force)?;
        if force != self.force {
            let (radius, gain) = match force {
                ForceKind::OriginReturn => {
                    (DEFAULT_TETHER_ATTRACT_RADIUS, DEFAULT_TETHER_ATTRACT_GAIN)
                }
                _ => (DEFAULT_ATTRACT_RADIUS, DEFAULT_ATTRACT_GAIN),
            };
            self.attraction_radius = radius;
            self.attraction_gain = gain;
            self.bounded = force != ForceKind::OriginReturn;
            self.force = force;
        }

        self.count = param_usize(params, "count", self.count);
        self.connection_radius =
            param_opt_f64(params, "connection_radius", self.connection_radius);
        self.link_opacity = param_f64(params, "link_opacity", self.link_opacity);
        self.link_width = param_f64(params, "link_width", self.link_width);
        self.attraction_radius = param_f64(params, "attraction_radius", self.attraction_radius);
        self.attraction_gain = param_f64(params, "attraction_gain", self.attraction_gain);
        self.spring_gain = param_f64(params, "spring_gain", self.spring_gain);
        self.repulsion_radius = param_f64(params, "repulsion_radius", self.repulsion_radius);
        self.repulsion_strength =
            param_f64(params, "repulsion_strength", self.repulsion_strength);
        self.damping = param_opt_f64(params, "damping", self.damping);
        self.trail = param_bool(params, "trail", self.trail);
        self.trail_max_length = param_usize(params, "trail_max_length", self.trail_max_length);
        self.trail_decay_rate = param_f64(params, "trail_decay_rate", self.trail_decay_rate);
        self.trail_opacity = param_f64(params, "trail_opacity", self.trail_opacity);
        self.speed = param_f64(params, "speed", self.speed);
        self.radius_min = param_f64(params, "radius_min", self.radius_min);
        self.radius_max = param_f64(params, "radius_max", self.radius_max);
        self.opacity_min = param_f64(params, "opacity_min", self.opacity_min);
        self.opacity_max = param_f64(params, "opacity_max", self.opacity_max);
        self.layout = param_enum(params, "layout", self.layout)?;
        self.grid_columns = param_usize(params, "grid_columns", self.grid_columns);
        self.bounded = param_bool(params, "bounded", self.bounded);
        if let Some(hex) = params.get("color").and_then(Value::as_str) {
            self.color = Srgb::from_hex(hex)?;
        }
        self.integration = param_enum(params, "integration", self.integration)?;
        self.reference_fps = param_f64(params, "reference_fps", self.reference_fps);
        self.seed = param_u64(params, "seed", self.seed);
        Ok(self)
    }

    /// Checks every range constraint. Mounting refuses a config that fails here.
    pub fn validate(&self) -> Result<(), EngineError> {
        fn positive(name: &str, v: f64) -> Result<(), EngineError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(EngineError::invalid_config(name, format!("must be > 0, got {v}")))
            }
        }
        fn non_negative(name: &str, v: f64) -> Result<(), EngineError> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(EngineError::invalid_config(name, format!("must be >= 0, got {v}")))
            }
        }
        fn unit(name: &str, v: f64) -> Result<(), EngineError> {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(EngineError::invalid_config(name, format!("must be in [0, 1], got {v}")))
            }
        }
        fn open_unit(name: &str, v: f64) -> Result<(), EngineError> {
            if v > 0.0 && v < 1.0 {
                Ok(())
            } else {
                Err(EngineError::invalid_config(name, format!("must be in (0, 1), got {v}")))
            }
        }

        if self.count == 0 && !self.trail {
            return Err(EngineError::invalid_config(
                "count",
                "must be > 0 unless the field is a pure trail",
            ));
        }
        if self.count > MAX_COUNT {
            return Err(EngineError::invalid_config(
                "count",
                format!("must be <= {MAX_COUNT}, got {}", self.count),
            ));
        }
        if let Some(r) = self.connection_radius {
            positive("connection_radius", r)?;
            unit("link_opacity", self.link_opacity)?;
            positive("link_width", self.link_width)?;
        }
        if let Some(d) = self.damping {
            open_unit("damping", d)?;
        }
        match self.force {
            ForceKind::Drift => {}
            ForceKind::Attract => {
                positive("attraction_radius", self.attraction_radius)?;
                non_negative("attraction_gain", self.attraction_gain)?;
            }
            ForceKind::OriginReturn => {
                positive("attraction_radius", self.attraction_radius)?;
                non_negative("attraction_gain", self.attraction_gain)?;
                non_negative("spring_gain", self.spring_gain)?;
            }
            ForceKind::Repel => {
                positive("repulsion_radius", self.repulsion_radius)?;
                non_negative("repulsion_strength", self.repulsion_strength)?;
            }
        }
        if self.trail {
            if !(1..=MAX_TRAIL_LENGTH).contains(&self.trail_max_length) {
                return Err(EngineError::invalid_config(
                    "trail_max_length",
                    format!("must be in [1, {MAX_TRAIL_LENGTH}], got {}", self.trail_max_length),
                ));
            }
            open_unit("trail_decay_rate", self.trail_decay_rate)?;
            unit("trail_opacity", self.trail_opacity)?;
        }
        non_negative("speed", self.speed)?;
        positive("radius_min", self.radius_min)?;
        positive("radius_max", self.radius_max)?;
        if self.radius_max < self.radius_min {
            return Err(EngineError::invalid_config(
                "radius_max",
                format!("must be >= radius_min ({})", self.radius_min),
            ));
        }
        unit("opacity_min", self.opacity_min)?;
        unit("opacity_max", self.opacity_max)?;
        if self.opacity_max < self.opacity_min {
            return Err(EngineError::invalid_config(
                "opacity_max",
                format!("must be >= opacity_min ({})", self.opacity_min),
            ));
        }
        if self.layout == Layout::Grid && self.grid_columns == 0 {
            return Err(EngineError::invalid_config("grid_columns", "must be > 0"));
        }
        if self.integration == Integration::Delta {
            positive("reference_fps", self.reference_fps)?;
        }
        Ok(())
    }

    /// The force strategy this config selects.
    pub fn force_model(&self) -> ForceModel {
        match self.force {
            ForceKind::Drift => ForceModel::Drift,
            ForceKind::Attract => ForceModel::PointerAttract {
                radius: self.attraction_radius,
                gain: self.attraction_gain,
            },
            ForceKind::OriginReturn => ForceModel::OriginReturn {
                attraction_radius: self.attraction_radius,
                attraction_gain: self.attraction_gain,
                spring_gain: self.spring_gain,
            },
            ForceKind::Repel => ForceModel::PointerRepel {
                radius: self.repulsion_radius,
                strength: self.repulsion_strength,
            },
        }
    }

    pub fn boundary_policy(&self) -> BoundaryPolicy {
        if self.bounded {
            BoundaryPolicy::Reflect
        } else {
            BoundaryPolicy::Unbounded
        }
    }

    /// The linker, if links are enabled.
    pub fn linker(&self) -> Option<ProximityLinker> {
        self.connection_radius
            .map(|r| ProximityLinker::new(r, self.link_opacity, self.link_width))
    }

    /// Current values as a JSON object with the keys `with_overrides` reads.
    pub fn params(&self) -> Value {
        // Serialization of this struct cannot fail: all fields are plain data.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Schema describing every recognized key, its type, range and default.
    pub fn param_schema() -> Value {
        let d = Self::default();
        let entries = [
            ("count", json!({"type": "integer", "default": d.count, "min": 0, "max": MAX_COUNT}),
                "Particle population (0 only for pure trail fields)"),
            ("connection_radius", json!({"type": ["number", "null"], "default": d.connection_radius, "min": 0.0}),
                "Link threshold; null disables links"),
            ("link_opacity", json!({"type": "number", "default": d.link_opacity, "min": 0.0, "max": 1.0}),
                "Opacity of a link between touching particles"),
            ("link_width", json!({"type": "number", "default": d.link_width, "min": 0.0}),
                "Stroke width of links"),
            ("force", json!({"type": "string", "default": "attract", "enum": ["drift", "attract", "origin_return", "repel"]}),
                "Force model applied every tick"),
            ("attraction_radius", json!({"type": "number", "default": d.attraction_radius, "min": 0.0}),
                "Pointer attraction radius"),
            ("attraction_gain", json!({"type": "number", "default": d.attraction_gain, "min": 0.0}),
                "Pointer attraction gain"),
            ("spring_gain", json!({"type": "number", "default": d.spring_gain, "min": 0.0}),
                "Spring gain back to origin (origin_return)"),
            ("repulsion_radius", json!({"type": "number", "default": d.repulsion_radius, "min": 0.0}),
                "Pointer repulsion radius"),
            ("repulsion_strength", json!({"type": "number", "default": d.repulsion_strength, "min": 0.0}),
                "Maximum repulsion displacement"),
            ("damping", json!({"type": ["number", "null"], "default": d.damping, "min": 0.0, "max": 1.0}),
                "Per-tick velocity multiplier in (0, 1); null disables"),
            ("trail", json!({"type": "boolean", "default": d.trail}),
                "Spawn decaying particles on pointer moves"),
            ("trail_max_length", json!({"type": "integer", "default": d.trail_max_length, "min": 1, "max": MAX_TRAIL_LENGTH}),
                "Maximum number of live trail particles"),
            ("trail_decay_rate", json!({"type": "number", "default": d.trail_decay_rate, "min": 0.0, "max": 1.0}),
                "Life lost per tick by trail particles"),
            ("trail_opacity", json!({"type": "number", "default": d.trail_opacity, "min": 0.0, "max": 1.0}),
                "Opacity of a trail particle at full life"),
            ("speed", json!({"type": "number", "default": d.speed, "min": 0.0}),
                "Spread of initial velocity components"),
            ("radius_min", json!({"type": "number", "default": d.radius_min, "min": 0.0}),
                "Smallest particle radius"),
            ("radius_max", json!({"type": "number", "default": d.radius_max, "min": 0.0}),
                "Largest particle radius"),
            ("opacity_min", json!({"type": "number", "default": d.opacity_min, "min": 0.0, "max": 1.0}),
                "Lowest particle opacity"),
            ("opacity_max", json!({"type": "number", "default": d.opacity_max, "min": 0.0, "max": 1.0}),
                "Highest particle opacity"),
            ("layout", json!({"type": "string", "default": "scatter", "enum": ["scatter", "grid"]}),
                "Initial placement"),
            ("grid_columns", json!({"type": "integer", "default": d.grid_columns, "min": 1}),
                "Columns of the grid layout"),
            ("bounded", json!({"type": "boolean", "default": d.bounded}),
                "Reflect particles at the surface edges"),
            ("color", json!({"type": "string", "default": d.color.to_hex()}),
                "Base color as #rrggbb"),
            ("integration", json!({"type": "string", "default": "frame", "enum": ["frame", "delta"]}),
                "Frame-coupled or elapsed-time-scaled stepping"),
            ("reference_fps", json!({"type": "number", "default": d.reference_fps, "min": 0.0}),
                "Frame rate a delta-scaled step is normalized to"),
            ("seed", json!({"type": "integer", "default": d.seed, "min": 0}),
                "PRNG seed for placement and trail sizes"),
        ];
        let mut schema = Map::new();
        for (key, mut entry, description) in entries {
            entry["description"] = Value::from(description);
            schema.insert(key.to_owned(), entry);
        }
        Value::Object(schema)
    }
}
