//! The particle entity and its per-tick integration step.

use glam::DVec2;

/// A single point entity in a field.
///
/// Drifting particles carry only kinematics, radius and a constant opacity.
/// Tethered particles additionally remember the `origin` they spring back to,
/// and trail particles carry a decaying `life`.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: DVec2,
    pub velocity: DVec2,
    /// Render radius, fixed at creation. Always > 0.
    pub radius: f64,
    /// Base opacity in [0, 1].
    pub opacity: f64,
    /// Anchor for spring-back forces.
    pub origin: Option<DVec2>,
    /// Remaining life in [0, 1]; the particle is dead once this reaches 0.
    pub life: Option<f64>,
    /// Positional offset recomputed every tick and never integrated.
    pub displacement: DVec2,
}

impl Particle {
    /// A free particle with constant opacity.
    pub fn drifting(position: DVec2, velocity: DVec2, radius: f64, opacity: f64) -> Self {
        Self {
            position,
            velocity,
            radius,
            opacity,
            origin: None,
            life: None,
            displacement: DVec2::ZERO,
        }
    }

    /// A particle at rest, anchored to its spawn position.
    pub fn anchored(position: DVec2, radius: f64, opacity: f64) -> Self {
        Self {
            origin: Some(position),
            ..Self::drifting(position, DVec2::ZERO, radius, opacity)
        }
    }

    /// A trail particle with full life and no motion.
    pub fn trail(position: DVec2, radius: f64) -> Self {
        Self {
            life: Some(1.0),
            ..Self::drifting(position, DVec2::ZERO, radius, 1.0)
        }
    }

    /// Where the particle is drawn this frame.
    pub fn rendered_position(&self) -> DVec2 {
        self.position + self.displacement
    }

    /// Advances position by velocity, scaled by the elapsed frame fraction.
    pub fn integrate(&mut self, scale: f64) {
        self.position += self.velocity * scale;
    }

    /// Multiplies velocity by `damping^scale`.
    pub fn damp(&mut self, damping: f64, scale: f64) {
        let factor = if scale == 1.0 {
            damping
        } else {
            damping.powf(scale)
        };
        self.velocity *= factor;
    }

    /// Whether a trail particle has expired. Non-trail particles never expire.
    pub fn is_dead(&self) -> bool {
        self.life.is_some_and(|life| life <= LIFE_EPSILON)
    }
}

/// Life at or below this is treated as zero, absorbing accumulated rounding
/// from repeated fixed-step decrements.
pub const LIFE_EPSILON: f64 = 1e-9;
