//! Force models: per-tick velocity impulses and positional displacements
//! derived from a particle's state and the latest pointer position.
//!
//! Every variant implements the same contract, [`ForceModel::impulse`], which
//! maps `(particle, pointer)` to a 2D vector. For the impulse variants that
//! vector is added to velocity; for [`ForceModel::PointerRepel`] it replaces
//! the particle's displacement for the current frame only.

use glam::DVec2;

use crate::particle::Particle;

/// Gain used by the neural-network background's subtle pull toward the pointer.
pub const DEFAULT_ATTRACT_GAIN: f64 = 5e-5;
/// Radius within which the subtle pointer pull applies.
pub const DEFAULT_ATTRACT_RADIUS: f64 = 200.0;
/// Pointer gain for tethered particles.
pub const DEFAULT_TETHER_ATTRACT_GAIN: f64 = 0.02;
/// Pointer radius for tethered particles.
pub const DEFAULT_TETHER_ATTRACT_RADIUS: f64 = 100.0;
/// Spring gain pulling tethered particles back to their origin.
pub const DEFAULT_SPRING_GAIN: f64 = 0.02;
/// Repulsion radius.
pub const DEFAULT_REPEL_RADIUS: f64 = 80.0;
/// Maximum repulsion displacement, reached at distance zero.
pub const DEFAULT_REPEL_STRENGTH: f64 = 30.0;

/// The force strategy a field is built with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForceModel {
    /// No external force.
    Drift,
    /// Within `radius`, pull toward the pointer by `gain * (pointer - p)`.
    PointerAttract { radius: f64, gain: f64 },
    /// Spring back to `origin`, plus a falloff-weighted pull toward the
    /// pointer within `attraction_radius`.
    OriginReturn {
        attraction_radius: f64,
        attraction_gain: f64,
        spring_gain: f64,
    },
    /// Within `radius`, displace away from the pointer by
    /// `strength * (radius - d) / radius`.
    PointerRepel { radius: f64, strength: f64 },
}

impl ForceModel {
    /// True for variants whose output is a per-frame displacement rather
    /// than a velocity impulse.
    pub fn is_displacement(&self) -> bool {
        matches!(self, ForceModel::PointerRepel { .. })
    }

    /// Whether particles of this model are anchored to their spawn point.
    pub fn uses_origin(&self) -> bool {
        matches!(self, ForceModel::OriginReturn { .. })
    }

    /// Computes this model's contribution for one particle.
    ///
    /// `pointer` is `None` when no pointer is over the surface. Coincident
    /// particle and pointer positions contribute nothing.
    pub fn impulse(&self, particle: &Particle, pointer: Option<DVec2>) -> DVec2 {
        match *self {
            ForceModel::Drift => DVec2::ZERO,
            ForceModel::PointerAttract { radius, gain } => match pointer {
                Some(ptr) => {
                    let to_pointer = ptr - particle.position;
                    if to_pointer.length() < radius {
                        to_pointer * gain
                    } else {
                        DVec2::ZERO
                    }
                }
                None => DVec2::ZERO,
            },
            ForceModel::OriginReturn {
                attraction_radius,
                attraction_gain,
                spring_gain,
            } => {
                let spring = particle
                    .origin
                    .map_or(DVec2::ZERO, |origin| (origin - particle.position) * spring_gain);
                let pull = pointer.map_or(DVec2::ZERO, |ptr| {
                    let to_pointer = ptr - particle.position;
                    let d = to_pointer.length();
                    if d < attraction_radius {
                        let falloff = (attraction_radius - d) / attraction_radius;
                        to_pointer * falloff * attraction_gain
                    } else {
                        DVec2::ZERO
                    }
                });
                spring + pull
            }
            ForceModel::PointerRepel { radius, strength } => {
                let Some(ptr) = pointer else {
                    return DVec2::ZERO;
                };
                let away = particle.position - ptr;
                let d = away.length();
                if d == 0.0 || d >= radius {
                    return DVec2::ZERO;
                }
                let magnitude = strength * (radius - d) / radius;
                let angle = away.y.atan2(away.x);
                DVec2::new(angle.cos(), angle.sin()) * magnitude
            }
        }
    }

    /// Applies the contribution to `particle`, scaled by the elapsed frame
    /// fraction for impulse variants.
    ///
    /// Displacement is overwritten, not accumulated: it drops to zero as
    /// soon as the pointer leaves the repulsion radius.
    pub fn apply(&self, particle: &mut Particle, pointer: Option<DVec2>, scale: f64) {
        let contribution = self.impulse(particle, pointer);
        if self.is_displacement() {
            particle.displacement = contribution;
        } else {
            particle.velocity += contribution * scale;
        }
    }
}
