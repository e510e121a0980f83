//! Elastic two-body collisions with time-of-impact backtracking
//!
//! When two discs are found overlapping, both are rewound along their
//! velocities to the instant of contact, an elastic impulse is exchanged
//! along the contact normal, and both are advanced again by the same
//! interval with their new velocities. Tangential velocity is untouched.

use crate::body::Body;

/// Why an overlapping pair was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Centres coincide, so the contact normal is undefined
    Coincident,
    /// No closing speed along the normal (grazing or already separating)
    NotClosing,
    /// The time-of-impact solve produced a non-finite value
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionOutcome {
    /// The bodies do not touch
    Separate,
    /// Velocities were exchanged; `time_since_contact` is how far both
    /// bodies were rewound and re-advanced
    Resolved { time_since_contact: f64 },
    Skipped(SkipReason),
}

impl CollisionOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, CollisionOutcome::Resolved { .. })
    }
}

/// Detect and resolve a collision between `a` and `b`.
///
/// Bodies collide when their centre distance is at most `ra + rb + slack`.
/// The time since contact is the linearized
/// `t = (d - contact) / (dv · n)` with `n` pointing from `b` to `a` and
/// `dv = va - vb`; it assumes constant velocity over the sub-step, so it is
/// clamped to `[0, max_rewind]`. A pair still overlapping after a clamped
/// rewind is already separating and is left alone on the next step.
pub fn resolve_collision(
    a: &mut Body,
    b: &mut Body,
    slack: f64,
    max_rewind: f64,
) -> CollisionOutcome {
    let direction = a.position - b.position;
    let distance = direction.length();
    let contact = a.radius + b.radius + slack;

    if distance > contact {
        return CollisionOutcome::Separate;
    }

    if distance <= 0.0 {
        log::debug!("overlapping bodies share a centre at {:?}", a.position);
        return CollisionOutcome::Skipped(SkipReason::Coincident);
    }

    let normal = direction / distance;
    let dv = a.velocity - b.velocity;
    let closing = dv.dot(normal);

    if closing >= 0.0 {
        return CollisionOutcome::Skipped(SkipReason::NotClosing);
    }

    let t = (distance - contact) / closing;
    if !t.is_finite() {
        log::debug!("non-finite time of impact (closing speed {:e})", closing);
        return CollisionOutcome::Skipped(SkipReason::NonFinite);
    }
    let t = t.clamp(0.0, max_rewind.max(0.0));

    let vpar = normal * (2.0 * closing / (a.mass + b.mass));
    let va = a.velocity - vpar * b.mass;
    let vb = b.velocity + vpar * a.mass;

    // back to the moment of contact, then forward with the new velocities
    let pa = a.position - a.velocity * t + va * t;
    let pb = b.position - b.velocity * t + vb * t;

    if !(pa.is_finite() && pb.is_finite() && va.is_finite() && vb.is_finite()) {
        log::debug!("collision response left non-finite state, t = {:e}", t);
        return CollisionOutcome::Skipped(SkipReason::NonFinite);
    }

    a.position = pa;
    a.velocity = va;
    b.position = pb;
    b.velocity = vb;

    log::trace!("resolved collision, t = {:e}", t);
    CollisionOutcome::Resolved {
        time_since_contact: t,
    }
}
