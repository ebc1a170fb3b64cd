//! Deterministic PRNG used for particle placement and trail sizes.
//!
//! A field owns one generator seeded from its config, so the same seed and
//! the same input sequence reproduce the same frames on every platform.

use serde::{Deserialize, Serialize};

/// Xorshift64 generator with shifts (13, 7, 17).
///
/// A seed of 0 is a fixed point of xorshift and is replaced by a non-zero
/// fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    /// Used in place of a zero seed.
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a generator; a zero seed is replaced by `FALLBACK_SEED`.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Advances the state and returns it.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform f64 in [0, 1) built from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform f64 in [min, max).
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Uniform f64 in [-spread / 2, spread / 2).
    ///
    /// Used for initial drift velocities, which are symmetric around zero.
    pub fn next_centered(&mut self, spread: f64) -> f64 {
        (self.next_f64() - 0.5) * spread
    }
}
