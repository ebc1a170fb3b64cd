//! Pointer trail: short-lived particles spawned on pointer moves.
//!
//! The trail is a bounded FIFO. Each pointer move appends one particle, the
//! oldest is evicted past `max_len`, and every tick ages all particles by a
//! fixed decay. Memory and visual density stay bounded no matter how fast
//! the pointer moves.

use std::collections::VecDeque;

use glam::DVec2;

use crate::particle::Particle;
use crate::prng::Xorshift64;

/// Smallest spawned trail radius.
pub const TRAIL_RADIUS_MIN: f64 = 2.0;
/// Upper bound (exclusive) of spawned trail radii.
pub const TRAIL_RADIUS_MAX: f64 = 6.0;

/// A trail particle as it should be drawn this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailDot {
    pub center: DVec2,
    pub radius: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone)]
pub struct TrailEmitter {
    particles: VecDeque<Particle>,
    max_len: usize,
    decay_rate: f64,
    /// Opacity of a particle at full life.
    opacity: f64,
}

impl TrailEmitter {
    pub fn new(max_len: usize, decay_rate: f64, opacity: f64) -> Self {
        Self {
            particles: VecDeque::new(),
            max_len,
            decay_rate,
            opacity,
        }
    }

    /// Appends one particle at `position`, evicting the oldest beyond capacity.
    pub fn emit(&mut self, position: DVec2, rng: &mut Xorshift64) {
        let radius = rng.next_range(TRAIL_RADIUS_MIN, TRAIL_RADIUS_MAX);
        self.particles.push_back(Particle::trail(position, radius));
        while self.particles.len() > self.max_len {
            self.particles.pop_front();
        }
    }

    /// Ages every particle by one (scaled) decay step.
    pub fn decay(&mut self, scale: f64) {
        let step = self.decay_rate * scale;
        for p in &mut self.particles {
            if let Some(life) = p.life.as_mut() {
                *life -= step;
            }
        }
    }

    /// Drawables for particles that are still alive, oldest first.
    ///
    /// Radius and opacity are both scaled by the remaining life.
    pub fn dots(&self) -> impl Iterator<Item = TrailDot> + '_ {
        self.particles
            .iter()
            .filter(|p| !p.is_dead())
            .map(|p| {
                let life = p.life.unwrap_or(1.0);
                TrailDot {
                    center: p.position,
                    radius: p.radius * life,
                    opacity: self.opacity * life,
                }
            })
    }

    /// Drops particles whose life has run out.
    pub fn cull(&mut self) {
        self.particles.retain(|p| !p.is_dead());
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emitter() -> TrailEmitter {
        TrailEmitter::new(50, 0.02, 0.6)
    }

    #[test]
    fn emit_spawns_at_pointer_with_full_life() {
        let mut trail = emitter();
        let mut rng = Xorshift64::new(1);
        trail.emit(DVec2::new(12.0, 34.0), &mut rng);
        let p = trail.particles().next().unwrap();
        assert_eq!(p.position, DVec2::new(12.0, 34.0));
        assert_eq!(p.life, Some(1.0));
        assert!((TRAIL_RADIUS_MIN..TRAIL_RADIUS_MAX).contains(&p.radius));
    }

    #[test]
    fn emit_evicts_oldest_first() {
        let mut trail = TrailEmitter::new(3, 0.02, 0.6);
        let mut rng = Xorshift64::new(1);
        for i in 0..5 {
            trail.emit(DVec2::new(i as f64, 0.0), &mut rng);
        }
        let xs: Vec<f64> = trail.particles().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn dots_scale_radius_and_opacity_by_life() {
        let mut trail = emitter();
        let mut rng = Xorshift64::new(5);
        trail.emit(DVec2::ZERO, &mut rng);
        let radius = trail.particles().next().unwrap().radius;
        for _ in 0..25 {
            trail.decay(1.0);
        }
        let dot = trail.dots().next().unwrap();
        assert!((dot.radius - radius * 0.5).abs() < 1e-9);
        assert!((dot.opacity - 0.3).abs() < 1e-9);
    }

    #[test]
    fn particle_dies_after_fifty_ticks_and_is_culled() {
        let mut trail = emitter();
        let mut rng = Xorshift64::new(9);
        trail.emit(DVec2::new(1.0, 1.0), &mut rng);
        for _ in 0..49 {
            trail.decay(1.0);
            trail.cull();
        }
        assert_eq!(trail.dots().count(), 1, "still alive after 49 ticks");
        trail.decay(1.0);
        assert_eq!(trail.dots().count(), 0, "not drawn on the 50th tick");
        trail.cull();
        assert!(trail.is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn length_never_exceeds_max(
                max_len in 1_usize..80,
                moves_per_frame in proptest::collection::vec(0_usize..20, 1..60),
            ) {
                let mut trail = TrailEmitter::new(max_len, 0.02, 0.6);
                prop_assert_eq!(trail.max_len(), max_len);
                let mut rng = Xorshift64::new(3);
                for moves in moves_per_frame {
                    for m in 0..moves {
                        trail.emit(DVec2::new(m as f64, 0.0), &mut rng);
                        prop_assert!(trail.len() <= trail.max_len());
                    }
                    trail.decay(1.0);
                    trail.cull();
                    prop_assert!(trail.len() <= trail.max_len());
                }
            }

            #[test]
            fn every_particle_dies_within_ceil_inverse_rate(rate in 0.005_f64..0.9) {
                let mut trail = TrailEmitter::new(10, rate, 1.0);
                let mut rng = Xorshift64::new(11);
                trail.emit(DVec2::ZERO, &mut rng);
                let limit = (1.0 / rate).ceil() as usize;
                for _ in 0..limit {
                    trail.decay(1.0);
                }
                prop_assert_eq!(trail.dots().count(), 0);
                trail.cull();
                prop_assert!(trail.is_empty());
            }
        }
    }
}
