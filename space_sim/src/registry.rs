//! Fixed-size body collection and its initial placement

use std::f64::consts::{FRAC_PI_2, TAU};

use glam::{DMat2, DVec2};
use rand::Rng;

use crate::body::{Body, Color};
use crate::config::{ProceduralConfig, SimConfig};

/// Smallest mass a procedural body is given when its distribution
/// keeps producing non-positive values
const MIN_PROCEDURAL_MASS: f64 = 1e-9;

/// Outcome of procedural placement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementReport {
    pub placed: usize,
    /// Bodies accepted while still overlapping a neighbour
    pub overlapping: usize,
}

/// Ordered set of bodies; the count never changes after seeding
#[derive(Debug, Clone)]
pub struct BodyRegistry {
    bodies: Vec<Body>,
}

impl BodyRegistry {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self { bodies }
    }

    /// Place the configured bodies, then the procedural ones
    pub fn seed<R: Rng + ?Sized>(config: &SimConfig, rng: &mut R) -> (Self, PlacementReport) {
        let mut bodies: Vec<Body> = config.bodies.iter().map(|b| b.to_body()).collect();
        let central_mass: f64 = bodies.iter().map(|b| b.mass).sum();

        let report = place_procedural(
            &mut bodies,
            &config.procedural,
            config.physics.gravitational_constant,
            central_mass,
            rng,
        );

        (Self { bodies }, report)
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Body> {
        self.bodies.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Mutable access to two distinct bodies, `i > j`
    pub fn pair_mut(&mut self, i: usize, j: usize) -> (&mut Body, &mut Body) {
        debug_assert!(i > j);
        let (head, tail) = self.bodies.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

/// Append `config.count` randomly placed bodies to `bodies`.
///
/// Each body is drawn at a sampled radius and uniform angle. Candidates that
/// touch an already placed body are redrawn up to `max_attempts` times; when
/// every attempt collides, the candidate with the most clearance is kept and
/// a warning is logged.
pub fn place_procedural<R: Rng + ?Sized>(
    bodies: &mut Vec<Body>,
    config: &ProceduralConfig,
    g: f64,
    central_mass: f64,
    rng: &mut R,
) -> PlacementReport {
    let mut report = PlacementReport::default();

    for n in 0..config.count {
        let mut best: Option<(DVec2, f64)> = None;

        for _ in 0..config.max_attempts.max(1) {
            let distance = config.radial.sample(rng);
            let angle = rng.gen_range(0.0..TAU);
            let candidate = DVec2::from_angle(angle) * distance;
            let clearance = clearance(bodies, candidate, config.radius);

            if best.map_or(true, |(_, c)| clearance > c) {
                best = Some((candidate, clearance));
            }
            if clearance >= 0.0 {
                break;
            }
        }

        let Some((position, clearance)) = best else {
            continue;
        };

        if clearance < 0.0 {
            log::warn!(
                "procedural body {} still overlaps a neighbour by {:.3} after {} attempts",
                n,
                -clearance,
                config.max_attempts
            );
            report.overlapping += 1;
        }

        let mass = sample_mass(config, rng);
        let velocity = orbit_velocity(position, config, g, central_mass);
        let color = Color::rgb(
            rng.gen_range(96..=255),
            rng.gen_range(96..=255),
            rng.gen_range(96..=255),
        );

        bodies.push(Body::new(mass, config.radius, position, velocity, color));
        report.placed += 1;
    }

    report
}

/// Smallest gap between a disc at `position` and every placed body;
/// negative when they overlap
fn clearance(bodies: &[Body], position: DVec2, radius: f64) -> f64 {
    bodies
        .iter()
        .map(|b| b.position.distance(position) - (b.radius + radius))
        .fold(f64::INFINITY, f64::min)
}

fn sample_mass<R: Rng + ?Sized>(config: &ProceduralConfig, rng: &mut R) -> f64 {
    for _ in 0..config.max_attempts.max(1) {
        let mass = config.mass.sample(rng);
        if mass > 0.0 && mass.is_finite() {
            return mass;
        }
    }
    log::warn!("procedural mass distribution keeps producing non-positive values");
    MIN_PROCEDURAL_MASS
}

/// Seed velocity as a scaled quarter-turn of the position vector.
///
/// Without an explicit scale, `k = sqrt(G·M / r³)` so that `|v|` is the
/// circular orbital speed about a central mass `M` at the origin.
pub fn orbit_velocity(position: DVec2, config: &ProceduralConfig, g: f64, central_mass: f64) -> DVec2 {
    let r = position.length();
    let scale = match config.orbit_scale {
        Some(k) => k,
        None if r > 0.0 => (g * central_mass / (r * r * r)).sqrt(),
        None => 0.0,
    };

    let angle = if config.prograde { FRAC_PI_2 } else { -FRAC_PI_2 };
    let transform = DMat2::from_angle(angle) * DMat2::from_diagonal(DVec2::splat(scale));
    let velocity = transform * position;

    if velocity.is_finite() {
        velocity
    } else {
        DVec2::ZERO
    }
}
