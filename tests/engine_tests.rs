//! Integration tests for the particle field engine.
//!
//! Everything here drives the public API the way an embedding caller
//! would: build an engine, start it at a surface size, pump updates, and
//! inspect the pool. Deterministic scenarios inject a constant flow field
//! and a stub RNG through `VortexEngine::with_parts`.

use rand::rngs::mock::StepRng;
use vortex::{
    LoopState, NoiseField, SpawnContext, VortexConfig, VortexEngine, PARTICLE_PROPS,
};

/// Engine whose flow field and RNG are both fixed: the noise source
/// always yields `source_value`, and every random draw is zero (so
/// `rand(n) = 0` and `rand_range(n) = n`).
fn deterministic_engine(config: VortexConfig, source_value: f64) -> VortexEngine {
    let field = NoiseField::constant(source_value, &config);
    VortexEngine::with_parts(config, field, SpawnContext::from_rng(StepRng::new(0, 0)))
}

// ============================================================================
// Buffer invariants
// ============================================================================

#[test]
fn test_buffer_sized_from_particle_count() {
    for count in [0, 1, 100, 700] {
        let config = VortexConfig::default().with_particle_count(count);
        let mut engine = VortexEngine::new(config);
        engine.start(800.0, 600.0);
        assert_eq!(engine.store().raw().len(), count * PARTICLE_PROPS);
    }
}

#[test]
fn test_spawned_fields_respect_configured_ranges() {
    let config = VortexConfig::default().with_particle_count(200);
    let mut engine = VortexEngine::new(config.clone());
    engine.start(800.0, 600.0);

    for i in 0..200 {
        let p = engine.store().load(i);
        assert!(p.x >= 0.0 && p.x < 800.0);
        assert!((p.y - 300.0).abs() <= config.range_y);
        assert_eq!(p.vx, 0.0);
        assert_eq!(p.vy, 0.0);
        assert_eq!(p.life, 0.0);
        assert!(p.ttl >= config.base_ttl && p.ttl < config.base_ttl + config.range_ttl);
        assert!(p.speed >= config.base_speed && p.speed < config.base_speed + config.range_speed);
        assert!(
            p.radius >= config.base_radius && p.radius < config.base_radius + config.range_radius
        );
        assert!(p.hue >= config.base_hue && p.hue < config.base_hue + config.range_hue);
    }
}

#[test]
fn test_zero_particles_is_harmless() {
    let config = VortexConfig::default().with_particle_count(0);
    let mut engine = deterministic_engine(config, 0.0);
    engine.start(800.0, 600.0);
    assert!(engine.update().is_empty());
    assert_eq!(engine.tick(), 1);
}

// ============================================================================
// Deterministic lifecycle scenarios
// ============================================================================

#[test]
fn test_single_particle_respawns_every_eleven_updates() {
    // ttl = 10 exactly (base 10, range 0, stub RNG adds nothing). Life
    // climbs 1..=10 over ten updates; the eleventh pushes it to 11 > 10
    // and respawns. With zero speed the particle never exits bounds, so
    // the cycle repeats with period 11.
    let config = VortexConfig::default()
        .with_particle_count(1)
        .with_ttl(10.0, 0.0)
        .with_speed(0.0, 0.0);
    let mut engine = deterministic_engine(config, 0.0);
    engine.start(100.0, 300.0);

    for cycle in 0..3 {
        for call in 1..=10 {
            engine.update();
            assert_eq!(
                engine.store().load(0).life,
                call as f32,
                "cycle {cycle}, call {call}"
            );
        }
        engine.update();
        assert_eq!(engine.store().load(0).life, 0.0, "cycle {cycle} respawn");
    }
}

#[test]
fn test_respawn_draws_fresh_ttl_speed_radius_hue() {
    let config = VortexConfig::default()
        .with_particle_count(1)
        .with_ttl(5.0, 0.0);
    // A real (seeded) RNG: after respawn, the randomized fields must land
    // in their configured ranges again.
    let field = NoiseField::constant(0.0, &config);
    let mut engine = VortexEngine::with_parts(config.clone(), field, SpawnContext::new());
    engine.start(10_000.0, 10_000.0);

    for _ in 0..6 {
        engine.update();
    }
    let p = engine.store().load(0);
    // ttl = 5 forces a respawn by the sixth update at the latest, so life
    // can no longer be the six frames an unrespawned particle would show.
    assert!(p.life < 6.0);
    assert!(p.ttl >= 5.0 && p.ttl < 5.0 + config.range_ttl.max(f32::EPSILON));
    assert!(p.speed >= 0.0 && p.speed < config.range_speed);
    assert!(p.radius >= config.base_radius);
    assert!(p.hue >= config.base_hue);
}

#[test]
fn test_bounds_exit_resamples_inside_surface() {
    // Constant angle 0 pushes straight along +x at speed 5 across a 10 px
    // wide surface; the particle escapes on the third update.
    let config = VortexConfig::default()
        .with_particle_count(1)
        .with_speed(5.0, 0.0)
        .with_ttl(1000.0, 0.0);
    let mut engine = deterministic_engine(config, 0.0);
    engine.start(10.0, 400.0);

    for _ in 0..3 {
        engine.update();
    }
    let p = engine.store().load(0);
    assert_eq!(p.life, 0.0);
    assert!(p.x >= 0.0 && p.x < 10.0);
}

// ============================================================================
// Resize and lifecycle
// ============================================================================

#[test]
fn test_resize_is_idempotent() {
    let config = VortexConfig::default().with_particle_count(50);
    let mut engine = VortexEngine::new(config);
    engine.start(800.0, 600.0);
    for _ in 0..10 {
        engine.update();
    }

    let before = engine.store().raw().to_vec();
    engine.resize(800.0, 600.0);
    engine.resize(800.0, 600.0);

    assert_eq!(engine.width(), 800.0);
    assert_eq!(engine.height(), 600.0);
    assert_eq!(engine.center().x, 400.0);
    assert_eq!(engine.center().y, 300.0);
    assert_eq!(engine.store().raw(), &before[..]);
    assert_eq!(engine.state(), LoopState::Running);
}

#[test]
fn test_shrinking_surface_respawns_strays_within_one_update() {
    let config = VortexConfig::default().with_particle_count(100);
    let mut engine = VortexEngine::new(config);
    engine.start(800.0, 600.0);
    engine.update();

    // Shrink hard: most particles are now stranded outside the rectangle.
    engine.resize(50.0, 40.0);
    engine.update();

    for i in 0..100 {
        let p = engine.store().load(i);
        // Either it respawned inside the new bounds (life reset), or it
        // was already inside and kept going.
        assert!(
            p.life == 0.0 || (p.x <= 50.0 && p.x >= 0.0 && p.y <= 40.0 && p.y >= 0.0),
            "particle {i} left stranded at ({}, {})",
            p.x,
            p.y
        );
    }
}

#[test]
fn test_build_then_drop_without_frames() {
    // The zero-frame mount/unmount: building and dropping an engine must
    // not advance anything or panic.
    let engine = VortexEngine::new(VortexConfig::default());
    assert_eq!(engine.state(), LoopState::Stopped);
    assert_eq!(engine.tick(), 0);
    drop(engine);
}

#[test]
fn test_stop_halts_updates() {
    let config = VortexConfig::default().with_particle_count(4);
    let mut engine = deterministic_engine(config, 0.0);
    engine.start(200.0, 400.0);
    engine.update();
    assert_eq!(engine.tick(), 1);

    engine.stop();
    assert_eq!(engine.state(), LoopState::Stopped);
    assert!(engine.update().is_empty());
    assert_eq!(engine.tick(), 1, "stopped updates must not advance the tick");
}
