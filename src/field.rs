//! The flow field that steers particle motion.
//!
//! A [`NoiseField`] turns a smooth 3D scalar noise source into a steering
//! angle: the source is sampled at `(x·x_off, y·y_off, tick·z_off)` and the
//! result scaled by `noise_steps · 2π`. Because the source is continuous,
//! neighboring particles get nearly identical angles and trace coherent
//! flow lines; the `noise_steps` multiplier lets the angle wrap several
//! full turns across the source's [-1, 1] output, folding the flow into
//! swirls.
//!
//! [`FlowSource`] is the seam between the engine and the noise backend.
//! Production uses [`noise::OpenSimplex`]; tests use [`noise::Constant`]
//! for a field with a single, known angle everywhere.

use std::f32::consts::TAU;

use noise::NoiseFn;

use crate::config::VortexConfig;

/// A smooth scalar field over (x, y, time), sampled in [-1, 1].
///
/// Implementations must be deterministic: the same inputs always produce
/// the same output. Smoothness is what turns per-particle sampling into
/// visually coherent flow, so discontinuous sources are not suitable.
pub trait FlowSource: Send + Sync {
    /// Sample the field at the given point.
    fn sample(&self, x: f64, y: f64, z: f64) -> f64;
}

/// Any 3D noise function from the `noise` crate is a flow source.
impl<T> FlowSource for T
where
    T: NoiseFn<f64, 3> + Send + Sync,
{
    fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        self.get([x, y, z])
    }
}

/// Noise-driven steering field.
pub struct NoiseField {
    source: Box<dyn FlowSource>,
    steps: f32,
    x_off: f64,
    y_off: f64,
    z_off: f64,
}

impl NoiseField {
    /// Create a field over OpenSimplex noise, seeded from entropy.
    pub fn new(config: &VortexConfig) -> Self {
        Self::with_source(noise::OpenSimplex::new(rand::random()), config)
    }

    /// Create a field that yields the same source value everywhere.
    ///
    /// With `value = 0.0` the steering angle is 0 rad at every point,
    /// which drives all particles straight along +x. Used by tests.
    pub fn constant(value: f64, config: &VortexConfig) -> Self {
        Self::with_source(noise::Constant::new(value), config)
    }

    /// Create a field over a caller-supplied source.
    pub fn with_source(source: impl FlowSource + 'static, config: &VortexConfig) -> Self {
        Self {
            source: Box::new(source),
            steps: config.noise_steps,
            x_off: config.x_off,
            y_off: config.y_off,
            z_off: config.z_off,
        }
    }

    /// Steering angle in radians at pixel `(x, y)` on frame `tick`.
    #[inline]
    pub fn angle(&self, x: f32, y: f32, tick: u64) -> f32 {
        let n = self.source.sample(
            x as f64 * self.x_off,
            y as f64 * self.y_off,
            tick as f64 * self.z_off,
        );
        n as f32 * self.steps * TAU
    }
}
