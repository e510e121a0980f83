use glam::DVec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use space_sim::collision::{resolve_collision, CollisionOutcome, SkipReason};
use space_sim::config::{BodyConfig, Distribution, NudgeMode, ProceduralConfig, SimConfig};
use space_sim::gravity::{angular_momentum, total_energy, total_momentum};
use space_sim::input::FrameInput;
use space_sim::registry::BodyRegistry;
use space_sim::trace::{TraceMode, TraceSpacing};
use space_sim::{Body, Color, FrameOutcome, Simulation};

const G: f64 = 6.6743e-11;

fn body(mass: f64, radius: f64, position: [f64; 2], velocity: [f64; 2]) -> Body {
    Body::new(
        mass,
        radius,
        DVec2::from(position),
        DVec2::from(velocity),
        Color::WHITE,
    )
}

/// Config with no seeded bodies, running from the first frame
fn bare_config(g: f64, dt: f64) -> SimConfig {
    let mut config = SimConfig::default();
    config.bodies.clear();
    config.procedural.count = 0;
    config.physics.gravitational_constant = g;
    config.physics.dt = dt;
    config.physics.steps_per_frame = 1;
    config.display.start_paused = false;
    config
}

fn assert_close(actual: f64, expected: f64, tol: f64) {
    let scale = expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tol * scale,
        "expected {} but got {} (tol {})",
        expected,
        actual,
        tol
    );
}

/// Overlapping, closing pairs with assorted masses and angles
fn colliding_pairs() -> Vec<(Body, Body)> {
    vec![
        (
            body(1.0, 5.0, [-4.9, 0.0], [10.0, 0.0]),
            body(1.0, 5.0, [4.9, 0.0], [-10.0, 0.0]),
        ),
        (
            body(3.0, 2.0, [0.0, 0.0], [4.0, 1.0]),
            body(0.5, 1.0, [2.5, 1.0], [-2.0, 3.0]),
        ),
        (
            body(1.0e16, 40.0, [0.0, 0.1], [0.0, 0.1]),
            body(10.0, 4.0, [30.0, 28.0], [-36.0, -20.0]),
        ),
        (
            body(2.0, 1.0, [1.0, 1.0], [-1.0, -3.0]),
            body(7.0, 1.5, [0.2, -1.1], [0.5, 0.5]),
        ),
    ]
}

// ==================================================================================
// Collision tests
// ==================================================================================

#[test]
fn collision_conserves_momentum() {
    for (mut a, mut b) in colliding_pairs() {
        let before = a.momentum() + b.momentum();
        let outcome = resolve_collision(&mut a, &mut b, 0.001, 1.0);
        assert!(outcome.is_resolved(), "pair not resolved: {:?}", outcome);

        let after = a.momentum() + b.momentum();
        let scale = a.mass * a.velocity.length() + b.mass * b.velocity.length();
        assert!(
            (after - before).length() <= 1e-12 * scale.max(1.0),
            "momentum changed from {:?} to {:?}",
            before,
            after
        );
    }
}

#[test]
fn collision_conserves_normal_kinetic_energy() {
    for (mut a, mut b) in colliding_pairs() {
        let n = (a.position - b.position).normalize();
        let normal_energy =
            |a: &Body, b: &Body| 0.5 * a.mass * a.velocity.dot(n).powi(2) + 0.5 * b.mass * b.velocity.dot(n).powi(2);
        let tangential = |v: DVec2| v - n * v.dot(n);

        let energy_before = normal_energy(&a, &b);
        let (ta, tb) = (tangential(a.velocity), tangential(b.velocity));

        assert!(resolve_collision(&mut a, &mut b, 0.001, 1.0).is_resolved());

        assert_close(normal_energy(&a, &b), energy_before, 1e-10);
        assert!((tangential(a.velocity) - ta).length() < 1e-9);
        assert!((tangential(b.velocity) - tb).length() < 1e-9);
    }
}

#[test]
fn head_on_equal_masses_exchange_velocities() {
    let config = bare_config(G, 0.01);
    let mut sim = Simulation::from_bodies(
        config,
        vec![
            body(1.0, 5.0, [-6.0, 0.0], [10.0, 0.0]),
            body(1.0, 5.0, [6.0, 0.0], [-10.0, 0.0]),
        ],
    );

    let start = sim.bodies()[0].position.distance(sim.bodies()[1].position);
    assert!(start > 10.0);

    for _ in 0..30 {
        sim.step();
    }

    let stats = sim.stats();
    assert_eq!(stats.collisions, 1);

    let (a, b) = (sim.bodies()[0], sim.bodies()[1]);
    assert_close(a.velocity.x, -10.0, 1e-6);
    assert_close(b.velocity.x, 10.0, 1e-6);
    assert!(a.position.distance(b.position) > a.radius + b.radius);
}

#[test]
fn coincident_bodies_stay_finite() {
    let config = bare_config(1.0, 0.01);
    let mut sim = Simulation::from_bodies(
        config,
        vec![
            body(1.0, 1.0, [0.0, 0.0], [1.0, 0.0]),
            body(1.0, 1.0, [0.0, 0.0], [-1.0, 0.0]),
        ],
    );

    sim.step();
    assert!(sim.bodies().iter().all(Body::is_finite));
}

#[test]
fn grazing_bodies_are_left_alone() {
    let mut a = body(1.0, 5.0, [0.0, 0.0], [0.0, 2.0]);
    let mut b = body(1.0, 5.0, [9.0, 0.0], [0.0, 2.0]);
    let outcome = resolve_collision(&mut a, &mut b, 0.001, 1.0);
    assert!(matches!(outcome, CollisionOutcome::Skipped(_)));
    assert!(a.is_finite() && b.is_finite());
    assert_eq!(a.velocity, DVec2::new(0.0, 2.0));
}

#[test]
fn separating_overlap_is_not_resolved() {
    let mut a = body(2.0, 5.0, [-4.0, 0.0], [-3.0, 1.0]);
    let mut b = body(1.0, 5.0, [4.0, 0.0], [3.0, -1.0]);
    let before = (a, b);

    let outcome = resolve_collision(&mut a, &mut b, 0.001, 0.01);

    assert_eq!(outcome, CollisionOutcome::Skipped(SkipReason::NotClosing));
    assert_eq!((a, b), before);
    assert!(a.is_finite() && b.is_finite());
}

#[test]
fn tiny_closing_speed_keeps_bodies_in_place() {
    for closing in [1e-307, 1e-14] {
        let mut a = body(1.0, 5.0, [0.0, 3.0], [0.0, 100.0]);
        let mut b = body(1.0, 5.0, [9.0, 3.0], [-closing, 100.0]);

        let outcome = resolve_collision(&mut a, &mut b, 0.001, 0.01);

        assert!(a.is_finite() && b.is_finite(), "non-finite state for {:e}", closing);
        match outcome {
            CollisionOutcome::Resolved { time_since_contact } => {
                assert!(time_since_contact <= 0.01);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_close(a.position.y, 3.0, 1e-12);
        assert_close(b.position.y, 3.0, 1e-12);
        assert!(a.position.distance(DVec2::new(0.0, 3.0)) < 1e-9);
        assert!(b.position.distance(DVec2::new(9.0, 3.0)) < 1e-9);
    }
}

#[test]
fn resting_contact_under_gravity_stays_finite() {
    let config = bare_config(1.0, 0.01);
    let mut sim = Simulation::from_bodies(
        config,
        vec![
            body(1.0e3, 5.0, [0.0, 0.0], [0.0, 0.0]),
            body(1.0e3, 5.0, [10.0005, 0.0], [0.0, 0.0]),
        ],
    );

    for _ in 0..500 {
        sim.step();
    }

    assert!(sim.bodies().iter().all(Body::is_finite));
    let (a, b) = (sim.bodies()[0], sim.bodies()[1]);
    assert!(a.position.y.abs() < 1e-9 && b.position.y.abs() < 1e-9);
}

// ==================================================================================
// Gravity tests
// ==================================================================================

#[test]
fn light_body_falls_toward_heavy_body() {
    let config = bare_config(G, 0.001);
    let mut sim = Simulation::from_bodies(
        config,
        vec![
            body(1.0e18, 10.0, [0.0, 0.0], [0.0, 0.0]),
            body(1.0e14, 1.0, [100.0, 0.0], [0.0, 0.0]),
        ],
    );

    sim.step();

    let (a, b) = (sim.bodies()[0], sim.bodies()[1]);
    assert!(b.velocity.x < 0.0, "B should move toward A: {:?}", b.velocity);
    assert!(a.velocity.x > 0.0, "A should move toward B: {:?}", a.velocity);
    assert_eq!(a.velocity.y, 0.0);
    assert_eq!(b.velocity.y, 0.0);

    let ratio = b.velocity.x.abs() / a.velocity.x.abs();
    assert_close(ratio, 1.0e4, 1e-9);
    // G·m_a / r² · dt
    assert_close(b.velocity.x, -6.6743, 1e-9);
}

#[test]
fn two_body_orbit_conserves_energy_and_angular_momentum() {
    let g = 1.0;
    let config = bare_config(g, 1.0e-3);
    let mut sim = Simulation::from_bodies(
        config,
        vec![
            body(1.0, 0.0, [0.0, 0.0], [0.0, -1.0e-3]),
            body(1.0e-3, 0.0, [1.0, 0.0], [0.0, 1.0]),
        ],
    );

    let energy = total_energy(sim.bodies(), g);
    let angular = angular_momentum(sim.bodies());
    let momentum = total_momentum(sim.bodies());

    for _ in 0..10_000 {
        sim.step();
    }

    let bodies = sim.bodies();
    assert!((total_energy(bodies, g) - energy).abs() <= 5e-3 * energy.abs());
    assert!((angular_momentum(bodies) - angular).abs() <= 1e-9 * angular.abs());
    assert!((total_momentum(bodies) - momentum).length() < 1e-12);
    assert_eq!(sim.stats().collisions, 0);
}

// ==================================================================================
// Trace tests
// ==================================================================================

#[test]
fn traces_never_exceed_capacity() {
    let mut config = bare_config(0.0, 0.1);
    config.trace.capacity = 16;
    config.trace.spacing = TraceSpacing::Fixed(0.5);
    let mut sim = Simulation::from_bodies(
        config,
        vec![
            body(1.0, 1.0, [0.0, 0.0], [10.0, 0.0]),
            body(1.0, 1.0, [0.0, 100.0], [0.0, 0.0]),
        ],
    );

    for _ in 0..200 {
        sim.step();
        assert!(sim.traces().iter().all(|t| t.len() <= 16));
    }

    let moving = &sim.traces()[0];
    assert_eq!(moving.len(), 16);
    assert_eq!(moving.front(), Some(sim.bodies()[0].position));

    // the resting body only has its starting sample
    assert_eq!(sim.traces()[1].len(), 1);
}

#[test]
fn recording_the_front_again_is_a_no_op() {
    let config = bare_config(0.0, 0.1);
    let mut sim = Simulation::from_bodies(config, vec![body(1.0, 2.0, [0.0, 0.0], [0.0, 0.0])]);
    let trace = &sim.traces()[0];
    let mut trace = trace.clone();

    let front = trace.front().unwrap();
    assert!(!trace.record(front));
    assert_eq!(trace.len(), 1);

    sim.step();
    assert_eq!(sim.traces()[0].len(), 1);
}

#[test]
fn body_radius_spacing_follows_each_body() {
    let mut config = bare_config(0.0, 1.0);
    config.trace.spacing = TraceSpacing::BodyRadius;
    let mut sim = Simulation::from_bodies(
        config,
        vec![
            body(1.0, 3.0, [0.0, 0.0], [2.0, 0.0]),
            body(1.0, 0.5, [0.0, 50.0], [2.0, 0.0]),
        ],
    );

    for _ in 0..6 {
        sim.step();
    }

    // moving 2 per step: radius 3 samples every other step, radius 0.5 every step
    assert_eq!(sim.traces()[0].len(), 4);
    assert_eq!(sim.traces()[1].len(), 7);
}

// ==================================================================================
// Placement tests
// ==================================================================================

fn placement_config(count: usize, radial: Distribution) -> SimConfig {
    let mut config = bare_config(G, 0.01);
    config.bodies = vec![BodyConfig {
        mass: 1.0e16,
        radius: 40.0,
        position: [0.0, 0.0],
        velocity: [0.0, 0.0],
        color: [255, 0, 0],
    }];
    config.procedural = ProceduralConfig {
        count,
        radial,
        radius: 4.0,
        max_attempts: 10,
        ..ProceduralConfig::default()
    };
    config
}

#[test]
fn rejection_sampling_avoids_overlap() {
    let config = placement_config(30, Distribution::Uniform { min: 60.0, max: 1000.0 });
    let mut rng = StdRng::seed_from_u64(42);
    let (registry, report) = BodyRegistry::seed(&config, &mut rng);

    assert_eq!(registry.len(), 31);
    assert_eq!(report.placed, 30);
    assert_eq!(report.overlapping, 0);

    let bodies = registry.bodies();
    for i in 0..bodies.len() {
        for j in 0..i {
            let gap = bodies[i].position.distance(bodies[j].position);
            assert!(gap >= bodies[i].radius + bodies[j].radius, "bodies {} and {} overlap", i, j);
        }
    }
}

#[test]
fn exhausted_placement_accepts_overlap() {
    let config = placement_config(2, Distribution::Constant { value: 0.0 });
    let mut rng = StdRng::seed_from_u64(1);
    let (registry, report) = BodyRegistry::seed(&config, &mut rng);

    assert_eq!(registry.len(), 3);
    assert_eq!(report.placed, 2);
    assert_eq!(report.overlapping, 2);
    assert!(registry.bodies().iter().all(|b| b.mass > 0.0 && b.is_finite()));
}

#[test]
fn procedural_bodies_orbit_the_fixed_mass() {
    let config = placement_config(5, Distribution::Uniform { min: 200.0, max: 400.0 });
    let mut rng = StdRng::seed_from_u64(9);
    let (registry, _) = BodyRegistry::seed(&config, &mut rng);

    for b in &registry.bodies()[1..] {
        let r = b.position.length();
        let circular = (G * 1.0e16 / r).sqrt();
        assert_close(b.velocity.length(), circular, 1e-9);
        assert!(b.position.perp_dot(b.velocity) > 0.0);
    }
}

#[test]
fn seeded_runs_are_reproducible() {
    let mut config = placement_config(4, Distribution::Uniform { min: 100.0, max: 300.0 });
    config.seed = Some(5);

    let mut first = Simulation::new(config.clone());
    let second = Simulation::new(config);
    assert_eq!(first.bodies(), second.bodies());

    let initial: Vec<Body> = first.bodies().to_vec();
    for _ in 0..10 {
        first.step();
    }
    first.reset();
    assert_eq!(first.bodies(), initial.as_slice());
    assert_eq!(first.clock().steps, 0);
}

// ==================================================================================
// Frame control tests
// ==================================================================================

#[test]
fn paused_frames_only_handle_toggles() {
    let mut config = bare_config(G, 0.01);
    config.display.start_paused = true;
    let mut sim = Simulation::from_bodies(config, vec![body(1.0, 1.0, [0.0, 0.0], [1.0, 0.0])]);

    let idle = FrameInput {
        direction: DVec2::X,
        ..FrameInput::default()
    };
    assert_eq!(sim.frame(&idle), FrameOutcome::Continue);
    assert_eq!(sim.clock().steps, 0);
    assert_eq!(sim.bodies()[0].position, DVec2::ZERO);

    let cycle = FrameInput {
        cycle_trace: true,
        ..FrameInput::default()
    };
    sim.frame(&cycle);
    assert_eq!(sim.trace_mode(), TraceMode::Circles);

    let unpause = FrameInput {
        toggle_pause: true,
        ..FrameInput::default()
    };
    sim.frame(&unpause);
    assert!(!sim.is_paused());
    assert_eq!(sim.clock().steps, 1);
    assert_close(sim.clock().elapsed, 0.01, 1e-12);

    let quit = FrameInput {
        quit: true,
        ..FrameInput::default()
    };
    assert_eq!(sim.frame(&quit), FrameOutcome::Quit);
}

#[test]
fn nudge_moves_the_designated_body() {
    let mut config = bare_config(0.0, 0.01);
    config.nudge.body = 1;
    config.nudge.factor = 2.0;
    config.nudge.mode = NudgeMode::Position;
    let mut sim = Simulation::from_bodies(
        config,
        vec![
            body(1.0, 1.0, [0.0, 0.0], [0.0, 0.0]),
            body(1.0, 1.0, [10.0, 0.0], [0.0, 0.0]),
        ],
    );

    let input = FrameInput {
        direction: DVec2::new(1.0, -1.0),
        ..FrameInput::default()
    };
    sim.frame(&input);

    assert_eq!(sim.bodies()[0].position, DVec2::ZERO);
    assert_eq!(sim.bodies()[1].position, DVec2::new(12.0, -2.0));
}

#[test]
fn velocity_nudge_and_missing_target() {
    let mut config = bare_config(0.0, 0.01);
    config.nudge.mode = NudgeMode::Velocity;
    config.nudge.factor = 1.5;
    let mut sim = Simulation::from_bodies(config.clone(), vec![body(1.0, 1.0, [0.0, 0.0], [0.0, 0.0])]);
    sim.nudge(DVec2::Y);
    assert_eq!(sim.bodies()[0].velocity, DVec2::new(0.0, 1.5));

    config.nudge.body = 7;
    let mut sim = Simulation::from_bodies(config, vec![body(1.0, 1.0, [0.0, 0.0], [0.0, 0.0])]);
    sim.nudge(DVec2::Y);
    assert_eq!(sim.bodies()[0].velocity, DVec2::ZERO);
}

#[test]
fn default_scene_runs_cleanly() {
    let mut config = SimConfig::default();
    config.seed = Some(3);
    config.display.start_paused = false;
    let mut sim = Simulation::new(config);
    assert_eq!(sim.bodies().len(), 6);

    for _ in 0..100 {
        sim.frame(&FrameInput::default());
    }

    assert!(sim.bodies().iter().all(Body::is_finite));
    assert_eq!(sim.view().len(), 6);
    assert!(sim.traces().iter().all(|t| t.len() <= 128));
}

#[test]
fn bundled_scenarios_parse() {
    let head_on = SimConfig::from_toml(include_str!("../scenarios/head_on.toml")).unwrap();
    assert_eq!(head_on.bodies.len(), 2);
    assert_eq!(head_on.trace.mode, TraceMode::Lines);

    let disk = SimConfig::from_toml(include_str!("../scenarios/crowded_disk.toml")).unwrap();
    assert_eq!(disk.body_count(), 25);
    assert_eq!(disk.trace.spacing, TraceSpacing::BodyRadius);
    assert_eq!(disk.seed, Some(42));
}
