//! The per-frame simulation core.
//!
//! [`VortexEngine`] owns the particle pool, the flow field, and the frame
//! counter, and advances the whole field by one frame per
//! [`update`](VortexEngine::update) call. It knows nothing about the GPU:
//! each
//! update emits one [`SegmentInstance`] per particle (the line stroke
//! that particle contributes to the frame) and the renderer decides what
//! to do with them. That split keeps the entire simulation testable
//! without a window or an adapter.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::config::VortexConfig;
use crate::field::NoiseField;
use crate::particles::{check_bounds, fade_in_out, lerp, Particle, ParticleStore};
use crate::spawn::SpawnContext;

/// Velocity low-pass factor: each frame the velocity moves halfway from
/// its previous value toward the flow field direction.
const VELOCITY_BLEND: f32 = 0.5;

/// Stroke saturation and lightness for the `hsla(hue, 100%, 60%, a)` color.
const STROKE_SATURATION: f32 = 1.0;
const STROKE_LIGHTNESS: f32 = 0.6;

/// Run state of the frame loop.
///
/// There is no pause state: resize happens while Running, and teardown
/// goes straight to Stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Not simulating; [`VortexEngine::update`] emits nothing.
    Stopped,
    /// Advancing one frame per update call.
    Running,
}

/// One particle's stroke for the current frame.
///
/// Instances are uploaded verbatim as a GPU vertex buffer; the vertex
/// shader expands each one into an oriented quad and the fragment shader
/// carves out a round-capped line from it.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SegmentInstance {
    /// Segment start, in pixels.
    pub p0: [f32; 2],
    /// Segment end, in pixels.
    pub p1: [f32; 2],
    /// Stroke width, in pixels.
    pub width: f32,
    /// Straight-alpha linear RGBA.
    pub color: [f32; 4],
}

impl SegmentInstance {
    fn stroke(p0: Vec2, p1: Vec2, width: f32, hue: f32, alpha: f32) -> Self {
        let [r, g, b] = hsl_to_rgb(hue, STROKE_SATURATION, STROKE_LIGHTNESS);
        Self {
            p0: p0.to_array(),
            p1: p1.to_array(),
            width,
            color: [
                srgb_to_linear(r),
                srgb_to_linear(g),
                srgb_to_linear(b),
                alpha,
            ],
        }
    }
}

/// The particle field simulation.
pub struct VortexEngine {
    config: VortexConfig,
    store: ParticleStore,
    field: NoiseField,
    spawn: SpawnContext,
    state: LoopState,
    tick: u64,
    width: f32,
    height: f32,
    center: Vec2,
    segments: Vec<SegmentInstance>,
}

impl VortexEngine {
    /// Build an engine with OpenSimplex noise and an entropy-seeded RNG.
    ///
    /// The engine starts Stopped; call [`start`](Self::start) once the
    /// surface size is known.
    pub fn new(config: VortexConfig) -> Self {
        let field = NoiseField::new(&config);
        Self::with_parts(config, field, SpawnContext::new())
    }

    /// Build an engine from explicit parts.
    ///
    /// This is the deterministic seam: pass a constant field and a stub
    /// RNG to make every update reproducible.
    pub fn with_parts(config: VortexConfig, field: NoiseField, spawn: SpawnContext) -> Self {
        let count = config.particle_count;
        Self {
            config,
            store: ParticleStore::new(count),
            field,
            spawn,
            state: LoopState::Stopped,
            tick: 0,
            width: 0.0,
            height: 0.0,
            center: Vec2::ZERO,
            segments: Vec::with_capacity(count),
        }
    }

    /// Size the field and spawn every particle, then begin running.
    pub fn start(&mut self, width: f32, height: f32) {
        self.resize(width, height);
        self.init_particles();
        self.state = LoopState::Running;
    }

    /// Stop the loop. Particle state is left in place but updates become
    /// no-ops until the next [`start`](Self::start).
    pub fn stop(&mut self) {
        self.state = LoopState::Stopped;
    }

    /// Adopt a new surface size.
    ///
    /// Only the bounds and the spawn center change; particle positions
    /// are not renormalized. Particles stranded outside the new rectangle
    /// respawn through the ordinary out-of-bounds check within a frame.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.center = Vec2::new(0.5 * width, 0.5 * height);
    }

    /// Advance every particle by one frame.
    ///
    /// Returns the strokes for this frame, one per particle, in index
    /// order. Returns an empty slice while Stopped.
    pub fn update(&mut self) -> &[SegmentInstance] {
        self.segments.clear();
        if self.state != LoopState::Running {
            return &self.segments;
        }

        self.tick += 1;
        for i in 0..self.store.count() {
            self.update_particle(i);
        }
        &self.segments
    }

    fn update_particle(&mut self, i: usize) {
        let mut p = self.store.load(i);

        let n = self.field.angle(p.x, p.y, self.tick);
        let vx = lerp(p.vx, n.cos(), VELOCITY_BLEND);
        let vy = lerp(p.vy, n.sin(), VELOCITY_BLEND);
        let next = Vec2::new(p.x + vx * p.speed, p.y + vy * p.speed);

        // The stroke is emitted before the bounds/ttl check so a dying
        // particle's final segment still shows for one frame.
        let alpha = fade_in_out(p.life, p.ttl);
        self.segments.push(SegmentInstance::stroke(
            Vec2::new(p.x, p.y),
            next,
            p.radius,
            p.hue,
            alpha,
        ));

        p.x = next.x;
        p.y = next.y;
        p.vx = vx;
        p.vy = vy;
        p.life += 1.0;
        let expired = p.life > p.ttl;
        self.store.store(i, p);

        if check_bounds(next.x, next.y, self.width, self.height) || expired {
            self.init_particle(i);
        }
    }

    /// Reinitialize particle `i` in place: fresh position, zero velocity,
    /// zero life, and freshly randomized ttl/speed/radius/hue.
    fn init_particle(&mut self, i: usize) {
        let p = Particle {
            x: self.spawn.rand(self.width),
            y: self.center.y + self.spawn.rand_range(self.config.range_y),
            vx: 0.0,
            vy: 0.0,
            life: 0.0,
            ttl: self.config.base_ttl + self.spawn.rand(self.config.range_ttl),
            speed: self.config.base_speed + self.spawn.rand(self.config.range_speed),
            radius: self.config.base_radius + self.spawn.rand(self.config.range_radius),
            hue: self.config.base_hue + self.spawn.rand(self.config.range_hue),
        };
        self.store.store(i, p);
    }

    /// Reset the frame counter, reallocate the pool zeroed, and spawn
    /// every particle.
    fn init_particles(&mut self) {
        self.tick = 0;
        self.store.reset();
        for i in 0..self.store.count() {
            self.init_particle(i);
        }
    }

    /// Current run state.
    #[inline]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Frames advanced since the last [`start`](Self::start).
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Surface width in pixels.
    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Surface height in pixels.
    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Spawn center, `(width/2, height/2)`.
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Read access to the particle pool.
    #[inline]
    pub fn store(&self) -> &ParticleStore {
        &self.store
    }
}

/// Convert HSL (hue in degrees, s/l in 0..=1) to sRGB.
fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let h = h.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = l - 0.5 * c;

    let (r, g, b) = match h as u32 % 6 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [r + m, g + m, b + m]
}

/// Convert one sRGB channel to linear space.
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use std::f32::consts::TAU;

    /// Engine with a constant flow source and an all-zeros RNG: particles
    /// spawn at `(0, center_y + range_y)` with base ttl/speed/radius/hue.
    fn deterministic_engine(config: VortexConfig, source_value: f64) -> VortexEngine {
        let field = NoiseField::constant(source_value, &config);
        VortexEngine::with_parts(config, field, SpawnContext::from_rng(StepRng::new(0, 0)))
    }

    #[test]
    fn test_new_engine_is_stopped() {
        let engine = VortexEngine::new(VortexConfig::default());
        assert_eq!(engine.state(), LoopState::Stopped);
        assert_eq!(engine.tick(), 0);
    }

    #[test]
    fn test_stopped_engine_emits_nothing() {
        let mut engine = deterministic_engine(VortexConfig::default(), 0.0);
        assert!(engine.update().is_empty());
        assert_eq!(engine.tick(), 0);
    }

    #[test]
    fn test_update_emits_one_segment_per_particle() {
        let config = VortexConfig::default().with_particle_count(13);
        let mut engine = deterministic_engine(config, 0.0);
        engine.start(200.0, 400.0);
        assert_eq!(engine.update().len(), 13);
        assert_eq!(engine.tick(), 1);
    }

    #[test]
    fn test_velocity_converges_toward_flow_direction() {
        // Source value 1.0 with 3 noise steps gives angle 3·TAU: the flow
        // target is (cos, sin) = (1, 0). Default base_speed is 0 so the
        // particle never moves and never leaves bounds.
        let config = VortexConfig::default().with_particle_count(1).with_ttl(1000.0, 0.0);
        let mut engine = deterministic_engine(config, 1.0);
        engine.start(200.0, 400.0);

        let target = (3.0 * TAU).cos();
        let mut prev_err = (engine.store().load(0).vx - target).abs();
        for _ in 0..20 {
            engine.update();
            let err = (engine.store().load(0).vx - target).abs();
            if err < 1e-6 {
                break;
            }
            assert!(err < prev_err, "velocity error did not shrink: {err} >= {prev_err}");
            prev_err = err;
        }
        assert!(prev_err < 1e-3);
    }

    #[test]
    fn test_ttl_expiry_respawns_in_place() {
        let config = VortexConfig::default()
            .with_particle_count(1)
            .with_ttl(10.0, 0.0);
        let mut engine = deterministic_engine(config, 0.0);
        engine.start(100.0, 300.0);

        // Calls 1..=10 raise life to 10, which never exceeds ttl = 10.
        for call in 1..=10 {
            engine.update();
            assert_eq!(engine.store().load(0).life, call as f32);
        }
        // Call 11 pushes life to 11 > 10 and must respawn after drawing.
        let segments = engine.update();
        assert_eq!(segments.len(), 1, "dying segment still drawn once");
        let p = engine.store().load(0);
        assert_eq!(p.life, 0.0);
        assert_eq!(p.ttl, 10.0);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 150.0 + 100.0);
    }

    #[test]
    fn test_out_of_bounds_respawns_with_resampled_position() {
        // Angle 0 drives along +x; base speed 5 crosses a 10px surface in
        // three updates (x: 2.5, 6.25, 10.625).
        let config = VortexConfig::default()
            .with_particle_count(1)
            .with_speed(5.0, 0.0)
            .with_ttl(1000.0, 0.0);
        let mut engine = deterministic_engine(config, 0.0);
        engine.start(10.0, 400.0);

        engine.update();
        engine.update();
        let segments = engine.update();
        assert!(segments[0].p1[0] > 10.0, "escaping stroke still drawn");

        let p = engine.store().load(0);
        assert_eq!(p.life, 0.0);
        assert!(p.x >= 0.0 && p.x < 10.0, "x resampled inside [0, width)");
        assert_eq!(p.vx, 0.0);
        assert_eq!(p.vy, 0.0);
    }

    #[test]
    fn test_resize_keeps_particles_and_tick() {
        let config = VortexConfig::default().with_particle_count(5);
        let mut engine = deterministic_engine(config, 0.25);
        engine.start(200.0, 400.0);
        engine.update();
        engine.update();

        let before = engine.store().raw().to_vec();
        let tick = engine.tick();

        engine.resize(200.0, 400.0);
        engine.resize(200.0, 400.0);
        assert_eq!(engine.width(), 200.0);
        assert_eq!(engine.center(), Vec2::new(100.0, 200.0));
        assert_eq!(engine.store().raw(), &before[..]);
        assert_eq!(engine.tick(), tick);

        engine.resize(640.0, 480.0);
        assert_eq!(engine.center(), Vec2::new(320.0, 240.0));
        assert_eq!(engine.store().raw(), &before[..]);
    }

    #[test]
    fn test_restart_resets_tick_and_pool() {
        let config = VortexConfig::default().with_particle_count(3);
        let mut engine = deterministic_engine(config, 0.0);
        engine.start(200.0, 400.0);
        for _ in 0..5 {
            engine.update();
        }
        assert_eq!(engine.tick(), 5);

        engine.start(200.0, 400.0);
        assert_eq!(engine.tick(), 0);
        assert_eq!(engine.store().load(0).life, 0.0);
    }

    #[test]
    fn test_stroke_alpha_follows_envelope() {
        let config = VortexConfig::default()
            .with_particle_count(1)
            .with_ttl(10.0, 0.0);
        let mut engine = deterministic_engine(config, 0.0);
        engine.start(100.0, 300.0);

        // First update draws at life = 0: fully transparent.
        assert_eq!(engine.update()[0].color[3], 0.0);
        // Four more updates reach life = 4; the fifth draw happens at
        // life = 5 = ttl/2: fully opaque.
        for _ in 0..4 {
            engine.update();
        }
        assert_eq!(engine.update()[0].color[3], 1.0);
    }

    #[test]
    fn test_hsl_primaries() {
        let [r, g, b] = hsl_to_rgb(0.0, 1.0, 0.5);
        assert!((r - 1.0).abs() < 1e-5 && g < 1e-5 && b < 1e-5);
        let [r, g, b] = hsl_to_rgb(120.0, 1.0, 0.5);
        assert!(r < 1e-5 && (g - 1.0).abs() < 1e-5 && b < 1e-5);
        let [r, g, b] = hsl_to_rgb(240.0, 1.0, 0.5);
        assert!(r < 1e-5 && g < 1e-5 && (b - 1.0).abs() < 1e-5);
        // Hue wraps.
        assert_eq!(hsl_to_rgb(360.0, 1.0, 0.5), hsl_to_rgb(0.0, 1.0, 0.5));
    }
}
