//! Distance-threshold links between particles.
//!
//! Edges are derived from scratch every frame by a full pairwise scan. The
//! scan is O(N²) and only meant for the small populations these effects use
//! (tens of particles, at most a few hundred).

use glam::DVec2;

use crate::particle::Particle;

/// A transient connection between particles `a < b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub opacity: f64,
}

/// Emits an [`Edge`] for every pair closer than `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityLinker {
    /// Connection radius `T`, > 0.
    pub threshold: f64,
    /// Opacity of an edge between (almost) touching particles.
    pub base_opacity: f64,
    /// Stroke width of drawn edges.
    pub width: f64,
}

impl ProximityLinker {
    pub fn new(threshold: f64, base_opacity: f64, width: f64) -> Self {
        Self {
            threshold,
            base_opacity,
            width,
        }
    }

    /// Opacity of a link between two points, or `None` if they are not linked.
    ///
    /// Coincident points are not linked: a zero-length segment draws nothing.
    pub fn link_opacity(&self, p: DVec2, q: DVec2) -> Option<f64> {
        let d = p.distance(q);
        if d > 0.0 && d < self.threshold {
            Some(self.base_opacity * (1.0 - d / self.threshold))
        } else {
            None
        }
    }

    /// All edges for the current rendered positions, ordered by `(a, b)`.
    pub fn edges(&self, particles: &[Particle]) -> Vec<Edge> {
        let mut edges = Vec::new();
        for (a, pa) in particles.iter().enumerate() {
            let pos_a = pa.rendered_position();
            for (offset, pb) in particles[a + 1..].iter().enumerate() {
                if let Some(opacity) = self.link_opacity(pos_a, pb.rendered_position()) {
                    edges.push(Edge {
                        a,
                        b: a + 1 + offset,
                        opacity,
                    });
                }
            }
        }
        edges
    }
}
