//! Error types for the particle field core.

use thiserror::Error;

/// Errors produced while configuring or mounting a particle field.
///
/// The frame loop itself never returns errors: once a field is running,
/// degenerate states (zero-sized surface, coincident particles, callbacks
/// firing after teardown) degrade to "nothing drawn" instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero (or not finite) where a drawable area is required.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A configuration value was outside its accepted range.
    #[error("invalid config '{name}': {reason}")]
    InvalidConfig { name: String, reason: String },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// No preset is registered under the requested name.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    /// Writing an output artifact failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidConfig`].
    pub fn invalid_config(name: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidConfig {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}
