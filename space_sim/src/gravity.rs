//! Pairwise Newtonian gravity and semi-implicit Euler integration

use glam::DVec2;

use crate::body::Body;

/// Apply one step of mutual gravitational acceleration to a pair of bodies.
///
/// Uses the vector form `-G / r³ · d` with `d = a.position - b.position`, so
/// multiplying by the other body's mass gives the velocity increment directly.
/// `softening` adds a Plummer term: `r³` becomes `(r² + ε²)^(3/2)`.
///
/// Returns `false` and leaves both bodies untouched when the pair is
/// coincident (zero softened separation) or the increment is not finite.
pub fn apply_gravity(a: &mut Body, b: &mut Body, g: f64, dt: f64, softening: f64) -> bool {
    let d = a.position - b.position;
    let dist_sq = d.length_squared() + softening * softening;

    if dist_sq <= 0.0 {
        log::debug!("skipping gravity for coincident bodies at {:?}", a.position);
        return false;
    }

    let inv_r3 = 1.0 / (dist_sq * dist_sq.sqrt());
    let accel_dir = d * (-g * inv_r3);

    let dv_a = accel_dir * (dt * b.mass);
    let dv_b = accel_dir * (dt * a.mass);

    if !dv_a.is_finite() || !dv_b.is_finite() {
        log::debug!("skipping non-finite gravity increment (r² = {:e})", dist_sq);
        return false;
    }

    a.velocity += dv_a;
    b.velocity -= dv_b;
    true
}

/// Advance a body's position along its current velocity
pub fn integrate_position(body: &mut Body, dt: f64) {
    body.position += body.velocity * dt;
}

/// Total kinetic plus pairwise potential energy
pub fn total_energy(bodies: &[Body], g: f64) -> f64 {
    let kinetic: f64 = bodies.iter().map(Body::kinetic_energy).sum();

    let mut potential = 0.0;
    for i in 0..bodies.len() {
        for j in 0..i {
            let r = bodies[i].position.distance(bodies[j].position);
            if r > 0.0 {
                potential -= g * bodies[i].mass * bodies[j].mass / r;
            }
        }
    }

    kinetic + potential
}

pub fn total_momentum(bodies: &[Body]) -> DVec2 {
    bodies.iter().map(Body::momentum).sum()
}

/// Z component of the total angular momentum about the origin
pub fn angular_momentum(bodies: &[Body]) -> f64 {
    bodies
        .iter()
        .map(|body| body.position.perp_dot(body.momentum()))
        .sum()
}

/// Mass-weighted mean position, or zero when there is no mass
pub fn center_of_mass(bodies: &[Body]) -> DVec2 {
    let mut total_mass = 0.0;
    let mut com = DVec2::ZERO;

    for body in bodies {
        com += body.position * body.mass;
        total_mass += body.mass;
    }

    if total_mass > 0.0 {
        com / total_mass
    } else {
        DVec2::ZERO
    }
}
