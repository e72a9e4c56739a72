//! Spawn randomization for particle initialization.
//!
//! All spawn-time randomness flows through a [`SpawnContext`], which wraps
//! an RNG behind the two distributions particle init actually uses. Keeping
//! the RNG behind this seam means deterministic tests can inject
//! `rand::rngs::mock::StepRng` instead of entropy.

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

/// RNG wrapper providing the spawn distributions.
///
/// Two distributions cover every randomized particle field:
///
/// - [`rand`](SpawnContext::rand): uniform magnitude over `[0, n)`, used
///   for x position, ttl, speed, radius, and hue.
/// - [`rand_range`](SpawnContext::rand_range): symmetric offset over
///   `(-n, n]`, used for the vertical spawn offset.
///
/// No seeding contract is offered; the default constructor seeds from
/// entropy because the field only needs visual variety, not
/// reproducibility.
pub struct SpawnContext {
    rng: Box<dyn RngCore>,
}

impl SpawnContext {
    /// Create a spawn context seeded from system entropy.
    pub fn new() -> Self {
        Self {
            rng: Box::new(SmallRng::from_entropy()),
        }
    }

    /// Create a spawn context from a caller-supplied RNG.
    ///
    /// Tests use this with `StepRng` to make spawns deterministic.
    pub fn from_rng(rng: impl RngCore + 'static) -> Self {
        Self { rng: Box::new(rng) }
    }

    /// Uniform random magnitude over `[0, n)`.
    #[inline]
    pub fn rand(&mut self, n: f32) -> f32 {
        n * self.rng.gen::<f32>()
    }

    /// Symmetric random offset over `(-n, n]`, computed as `n - 2n·u`
    /// for uniform `u` in `[0, 1)`.
    #[inline]
    pub fn rand_range(&mut self, n: f32) -> f32 {
        n - self.rng.gen::<f32>() * 2.0 * n
    }
}

impl Default for SpawnContext {
    fn default() -> Self {
        Self::new()
    }
}
