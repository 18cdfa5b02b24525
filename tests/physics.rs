use gso_sim::bodies::{mass_for_radius, BodyId, BodyStore, SpawnRequest, MIN_SPAWN_RADIUS};
use gso_sim::physics::{mass_factor, PhysicsEngine};
use gso_sim::{LocalSimulation, SimulationService, SimulationSettings};
use ultraviolet::Vec2;

/// Settings with no time scaling and no gravity unless a test adds it
pub fn test_settings() -> SimulationSettings {
    SimulationSettings {
        max_velocity: 50.0,
        gravity_constant: 0.0,
        bounds: 100.0,
        mass_exponent: 4.0,
        absorb_rate: 0.15,
        time_scale: 1.0,
    }
}

pub fn body_at(x: f32, y: f32, radius: f32) -> SpawnRequest {
    SpawnRequest::new(Vec2::new(x, y), Vec2::zero(), radius)
}

fn world(settings: SimulationSettings, pool: usize, spawns: &[SpawnRequest]) -> (PhysicsEngine, BodyStore) {
    let engine = PhysicsEngine::new(settings).unwrap();
    let mut store = BodyStore::new(pool);
    for spawn in spawns {
        store.spawn(spawn, settings.mass_exponent).unwrap();
    }
    (engine, store)
}

fn assert_mass_invariant(store: &BodyStore, exponent: f32) {
    for body in store.bodies() {
        assert_eq!(body.mass(), mass_for_radius(body.radius(), exponent), "body {} mass drifted", body.id);
    }
}

// ==================================================================================
// Merging
// ==================================================================================

#[test]
fn overlapping_equal_bodies_merge_in_one_step() {
    let settings = test_settings();
    let (mut engine, mut store) = world(settings, 4, &[body_at(0.0, 0.0, 1.0), body_at(0.0, 0.5, 1.0)]);

    let report = engine.step(&mut store, 0.016);

    assert_eq!(store.len(), 1);
    let survivor = &store.bodies()[0];
    assert_eq!(survivor.id, 0, "equal radii keep the lower id");
    assert!((survivor.radius() - (1.0 + settings.absorb_rate)).abs() < 1e-6);
    assert_eq!(report.absorbed, vec![(0, 1)]);
    assert_mass_invariant(&store, settings.mass_exponent);
}

#[test]
fn larger_body_absorbs_smaller_regardless_of_order() {
    let settings = test_settings();
    let (mut engine, mut store) = world(settings, 4, &[body_at(0.0, 0.0, 1.0), body_at(1.0, 0.0, 2.0)]);

    engine.step(&mut store, 0.016);

    assert_eq!(store.len(), 1);
    let survivor = &store.bodies()[0];
    assert_eq!(survivor.id, 1);
    assert!((survivor.radius() - (2.0 + 1.0 * settings.absorb_rate)).abs() < 1e-6);
    assert_mass_invariant(&store, settings.mass_exponent);
}

#[test]
fn merge_keeps_survivor_velocity() {
    let settings = test_settings();
    let big = SpawnRequest::new(Vec2::zero(), Vec2::new(1.0, 0.0), 2.0);
    let small = SpawnRequest::new(Vec2::new(0.5, 0.0), Vec2::new(-5.0, 3.0), 0.5);
    let (mut engine, mut store) = world(settings, 4, &[big, small]);

    engine.step(&mut store, 0.01);

    assert_eq!(store.len(), 1);
    assert_eq!(store.bodies()[0].vel, Vec2::new(1.0, 0.0));
}

#[test]
fn survivor_keeps_growing_within_one_step() {
    let settings = test_settings();
    // the third body only touches the survivor once it has grown
    let (mut engine, mut store) = world(
        settings,
        4,
        &[body_at(0.0, 0.0, 2.0), body_at(2.5, 0.0, 1.0), body_at(-3.1, 0.0, 1.0)],
    );

    let report = engine.step(&mut store, 0.016);

    assert_eq!(report.absorbed, vec![(0, 1), (0, 2)]);
    assert_eq!(store.len(), 1);
    let survivor = &store.bodies()[0];
    assert!((survivor.radius() - (2.0 + 2.0 * settings.absorb_rate)).abs() < 1e-5);
    assert_mass_invariant(&store, settings.mass_exponent);
}

#[test]
fn absorbed_body_absorbs_nothing_else() {
    let settings = test_settings();
    // body 0 overlaps both, but body 1 takes it before the pair (0, 2) is checked
    let (mut engine, mut store) = world(
        settings,
        4,
        &[body_at(0.0, 0.0, 1.0), body_at(2.0, 0.0, 2.0), body_at(-1.2, 0.0, 0.5)],
    );

    let report = engine.step(&mut store, 0.016);

    assert_eq!(report.absorbed, vec![(1, 0)]);
    let left: Vec<BodyId> = store.bodies().iter().map(|b| b.id).collect();
    assert_eq!(left, vec![1, 2]);
    assert_eq!(store.get(2).unwrap().radius(), 0.5);
}

#[test]
fn separated_bodies_do_not_merge() {
    let (mut engine, mut store) = world(test_settings(), 4, &[body_at(-2.0, 0.0, 1.0), body_at(2.0, 0.0, 1.0)]);
    let report = engine.step(&mut store, 0.016);
    assert!(report.is_empty());
    assert_eq!(store.len(), 2);
}

#[test]
fn absorbed_ids_are_released() {
    let settings = test_settings();
    let (mut engine, mut store) = world(settings, 2, &[body_at(0.0, 0.0, 1.0), body_at(0.5, 0.0, 0.5)]);
    assert!(!store.is_ready());

    engine.step(&mut store, 0.016);

    assert!(store.is_ready());
    let id: BodyId = store.spawn(&body_at(50.0, 0.0, 1.0), settings.mass_exponent).unwrap();
    assert_eq!(id, 1);
}

// ==================================================================================
// Bounds
// ==================================================================================

#[test]
fn body_leaving_bounds_is_removed() {
    let settings = SimulationSettings {
        max_velocity: 10.0,
        bounds: 2.0,
        ..test_settings()
    };
    let runaway = SpawnRequest::new(Vec2::zero(), Vec2::new(10.0, 0.0), 1.0);
    let (mut engine, mut store) = world(settings, 1, &[runaway]);

    let report = engine.step(&mut store, 1.0);

    assert_eq!(report.evicted, vec![0]);
    assert!(store.snapshot().is_empty());
    assert!(store.is_ready());
}

#[test]
fn evicted_body_is_not_absorbed() {
    let settings = SimulationSettings {
        bounds: 10.0,
        ..test_settings()
    };
    let (mut engine, mut store) = world(settings, 4, &[body_at(0.0, 9.5, 1.0), body_at(0.0, 10.5, 0.5)]);

    let report = engine.step(&mut store, 0.016);

    assert_eq!(report.evicted, vec![1]);
    assert!(report.absorbed.is_empty());
    assert_eq!(store.len(), 1);
    assert_eq!(store.bodies()[0].radius(), 1.0);
}

// ==================================================================================
// Integration
// ==================================================================================

#[test]
fn velocity_moves_position() {
    let settings = SimulationSettings {
        max_velocity: 5.0,
        ..test_settings()
    };
    let (mut engine, mut store) = world(settings, 1, &[body_at(0.0, 0.0, 1.0)]);

    engine.step(&mut store, 1.0);
    assert_eq!(store.bodies()[0].pos, Vec2::zero());

    store.set_velocity(0, Vec2::new(1.0, 1.0)).unwrap();
    engine.step(&mut store, 1.0);
    assert_eq!(store.bodies()[0].pos, Vec2::new(1.0, 1.0));
}

#[test]
fn time_scale_multiplies_dt() {
    let settings = SimulationSettings {
        time_scale: 2.0,
        ..test_settings()
    };
    let mover = SpawnRequest::new(Vec2::zero(), Vec2::new(1.0, 0.0), 1.0);
    let (mut engine, mut store) = world(settings, 1, &[mover]);

    engine.step(&mut store, 0.5);

    assert_eq!(store.bodies()[0].pos, Vec2::new(1.0, 0.0));
}

#[test]
fn velocity_is_clamped() {
    let settings = SimulationSettings {
        max_velocity: 10.0,
        ..test_settings()
    };
    let fast = SpawnRequest::new(Vec2::zero(), Vec2::new(0.0, 100.0), 1.0);
    let (mut engine, mut store) = world(settings, 1, &[fast]);

    engine.step(&mut store, 0.01);

    let vel = store.bodies()[0].vel;
    assert!((vel.mag() - 10.0).abs() < 1e-4);
    assert!((store.bodies()[0].pos.y - 0.1).abs() < 1e-5);
}

#[test]
fn gravity_pulls_bodies_together() {
    let settings = SimulationSettings {
        gravity_constant: 1.0,
        max_velocity: 1.0,
        bounds: 10.0,
        ..test_settings()
    };
    let (mut engine, mut store) = world(settings, 2, &[body_at(-2.0, 0.0, 1.0), body_at(2.0, 0.0, 1.0)]);

    engine.step(&mut store, 1.0);

    let bodies = store.bodies();
    assert!(bodies[0].pos.x > -2.0);
    assert_eq!(bodies[0].pos.y, 0.0);
    assert!(bodies[1].pos.x < 2.0);
    assert_eq!(bodies[1].pos.y, 0.0);
}

#[test]
fn summed_force_is_clamped() {
    let settings = SimulationSettings {
        gravity_constant: 100.0,
        max_velocity: 50.0,
        ..test_settings()
    };
    let (mut engine, mut store) = world(settings, 2, &[body_at(-2.0, 0.0, 1.0), body_at(2.0, 0.0, 1.0)]);
    let mass = store.bodies()[1].mass();
    // unclamped g * m / d^2 = 100 * 16 / 16
    assert!(settings.gravity_constant * mass / 16.0 > settings.max_velocity);

    engine.step(&mut store, 0.1);

    let expected = settings.max_velocity * mass_factor(mass) * 0.1;
    let vel = store.bodies()[0].vel;
    assert!((vel.x - expected).abs() < 1e-6, "got {}, expected {}", vel.x, expected);
    assert_eq!(vel.y, 0.0);
    assert!((store.bodies()[1].vel.x + expected).abs() < 1e-6);
}

#[test]
fn heavier_bodies_respond_less_to_force() {
    let settings = SimulationSettings {
        gravity_constant: 1.0,
        ..test_settings()
    };
    let (mut engine, mut store) = world(settings, 2, &[body_at(0.0, 0.0, 0.25), body_at(3.0, 0.0, 0.25)]);
    let mass = store.bodies()[1].mass();

    engine.step(&mut store, 0.1);

    // g * m / d^2, scaled by 1 / (1 + m)^2 rather than 1 / m
    let expected = settings.gravity_constant * mass / 9.0 * mass_factor(mass) * 0.1;
    let vel = store.bodies()[0].vel;
    assert!((vel.x - expected).abs() < 1e-6, "got {}, expected {}", vel.x, expected);
    assert!((store.bodies()[1].vel.x + expected).abs() < 1e-6);
}

// ==================================================================================
// Local service
// ==================================================================================

#[test]
fn local_service_spawns_until_pool_is_full() {
    let mut local = LocalSimulation::new(test_settings(), 2).unwrap();
    assert!(!local.is_ready());

    local.activate();
    assert!(local.is_ready());
    local.add_body(body_at(-10.0, 0.0, 1.0));
    local.add_body(body_at(10.0, 0.0, 1.0));
    assert!(!local.is_ready());

    local.add_body(body_at(30.0, 0.0, 1.0));
    assert_eq!(local.object_count(), 2);
    assert_eq!(local.player_count(), 1);
    assert!(local.try_get_connection_error().is_none());
}

#[test]
fn local_service_steps_on_tick_and_resets_on_reactivate() {
    let mut local = LocalSimulation::new(test_settings(), 4).unwrap();
    local.activate();
    assert!(local.take_status_changed());
    assert!(!local.take_status_changed());

    local.add_body(body_at(0.0, 0.0, 1.0));
    local.add_body(body_at(0.0, 0.5, 1.0));
    local.tick(0.016);

    let frame = local.read_bodies();
    assert_eq!(frame.bodies.len(), 1);
    assert_eq!(frame.player_count, 1);

    local.reactivate();
    assert_eq!(local.object_count(), 0);
    assert!(local.store().is_ready());
}

#[test]
fn non_positive_radius_cannot_poison_the_world() {
    let settings = SimulationSettings {
        gravity_constant: 5.0,
        mass_exponent: 3.5,
        ..test_settings()
    };
    let mut local = LocalSimulation::new(settings, 4).unwrap();
    local.activate();
    local.add_body(body_at(10.0, 0.0, 1.0));
    local.add_body(body_at(-10.0, 0.0, -2.0));

    for _ in 0..3 {
        local.tick(0.016);
    }

    let frame = local.read_bodies();
    assert_eq!(frame.bodies.len(), 2);
    for body in &frame.bodies {
        assert!(body.pos.x.is_finite() && body.pos.y.is_finite(), "body {} at {:?}", body.id, body.pos);
        assert!(body.mass().is_finite());
    }
    assert_eq!(local.store().get(1).unwrap().radius(), MIN_SPAWN_RADIUS);
}

#[test]
fn degenerate_settings_fail_at_construction() {
    let settings = SimulationSettings {
        mass_exponent: f32::INFINITY,
        ..test_settings()
    };
    assert!(LocalSimulation::new(settings, 4).is_err());
}
