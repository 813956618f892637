//! Additive Gaussian noise: `y = x + amplitude · N(0, 1)`.
//!
//! Deterministic via an explicit seed. Uses a seeded ChaCha8 RNG and the
//! Box-Muller transform for the normal sample. `reset()` restores the
//! construction seed; `clone()` carries the live RNG state so a clone
//! continues the exact noise sequence.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Seeded additive-noise transform.
///
/// With `amplitude <= 0` the transform is a passthrough and the RNG is
/// never advanced.
#[derive(Clone, Debug)]
pub struct Noise {
    amplitude: f64,
    seed: u64,
    rng: ChaCha8Rng,
}

impl Noise {
    /// Create a noise source with the given amplitude and seed.
    pub fn new(amplitude: f64, seed: u64) -> Self {
        Self {
            amplitude,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate a standard normal sample using the Box-Muller transform.
    /// Avoids the `rand_distr` dependency.
    fn box_muller(rng: &mut ChaCha8Rng) -> f64 {
        let u1: f64 = rng.gen::<f64>().max(1e-300); // avoid ln(0)
        let u2: f64 = rng.gen();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Apply to one sample.
    pub fn apply(&mut self, input: f64) -> f64 {
        if self.amplitude <= 0.0 {
            return input;
        }
        input + self.amplitude * Self::box_muller(&mut self.rng)
    }

    /// Restore the RNG to the construction seed.
    pub fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }
}
