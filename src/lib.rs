//! # Vortex
//!
//! A noise-driven particle field backdrop with glowing trails.
//!
//! Vortex simulates a fixed pool of particles steered by a smooth 3D
//! noise field and renders each one as a short, round-capped line segment
//! with a fade-in/fade-out opacity envelope. A two-pass additive blur
//! turns the thin strokes into luminous trails. The result is a purely
//! decorative animated background, meant to sit behind foreground
//! content.
//!
//! ## Quick Start
//!
//! ```ignore
//! use vortex::VortexConfig;
//!
//! fn main() -> Result<(), vortex::VortexError> {
//!     let config = VortexConfig::default()
//!         .with_particle_count(700)
//!         .with_base_hue(220.0)
//!         .with_background("#000000");
//!     vortex::run(config)
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Particles
//!
//! Particle state lives in one flat `f32` buffer, nine fields per
//! particle ([`ParticleStore`]). A particle that outlives its ttl or
//! leaves the surface is reinitialized in place; the pool never grows,
//! shrinks, or reallocates while running.
//!
//! ### The flow field
//!
//! Each frame, every particle samples a 3D gradient-noise field at its
//! position and the current frame number ([`NoiseField`]). The sample
//! becomes a steering angle; velocity is low-pass blended toward that
//! direction, so direction changes stay smooth and neighboring particles
//! trace coherent flow lines.
//!
//! ### Driving it yourself
//!
//! [`run`] owns a window and the frame loop, but the simulation itself is
//! plain CPU code: build a [`VortexEngine`], call
//! [`update`](VortexEngine::update) per frame, and render the returned
//! [`SegmentInstance`] strokes however you like. Everything up to the GPU
//! upload works headless, which is also how the test suite drives it.

pub mod config;
pub mod engine;
pub mod error;
pub mod field;
mod gpu;
pub mod particles;
pub mod spawn;
mod window;

pub use config::{parse_hex_color, VortexConfig};
pub use engine::{LoopState, SegmentInstance, VortexEngine};
pub use error::{ConfigError, GpuError, VortexError};
pub use field::{FlowSource, NoiseField};
pub use particles::{Particle, ParticleStore, PARTICLE_PROPS};
pub use spawn::SpawnContext;
pub use window::run;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use vortex::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::VortexConfig;
    pub use crate::engine::{LoopState, SegmentInstance, VortexEngine};
    pub use crate::error::VortexError;
    pub use crate::field::{FlowSource, NoiseField};
    pub use crate::particles::{Particle, ParticleStore};
    pub use crate::spawn::SpawnContext;
    pub use crate::run;
}
