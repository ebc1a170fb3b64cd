//! Boundary handling at the surface edges.

use glam::DVec2;

use crate::particle::Particle;

/// Current drawable extent, `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when there is nothing to draw into (zero, negative or NaN extent).
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn contains(&self, p: DVec2) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }
}

/// What happens when a particle leaves the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// Elastic reflection: the outward velocity component is negated.
    /// Position is never clamped, so a particle may sit outside for a frame.
    #[default]
    Reflect,
    /// No boundary. Used for tethered particles, whose spring keeps them near
    /// their origin.
    Unbounded,
}

impl BoundaryPolicy {
    /// Applies the policy to one particle after integration.
    ///
    /// Only a component that points further out is flipped. A particle left
    /// outside by a shrinking resize therefore heads back in instead of
    /// flipping every frame.
    pub fn apply(self, particle: &mut Particle, bounds: Bounds) {
        if self == BoundaryPolicy::Unbounded {
            return;
        }
        let p = particle.position;
        let v = &mut particle.velocity;
        if (p.x < 0.0 && v.x < 0.0) || (p.x > bounds.width && v.x > 0.0) {
            v.x = -v.x;
        }
        if (p.y < 0.0 && v.y < 0.0) || (p.y > bounds.height && v.y > 0.0) {
            v.y = -v.y;
        }
    }
}
