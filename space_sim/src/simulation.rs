//! Simulation state and the per-frame controller

use glam::DVec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::body::{Body, Color};
use crate::collision::resolve_collision;
use crate::config::{NudgeMode, SimConfig};
use crate::gravity::{
    apply_gravity, center_of_mass, integrate_position, total_energy, total_momentum,
};
use crate::input::FrameInput;
use crate::registry::BodyRegistry;
use crate::trace::{TraceBuffer, TraceMode};

/// Simulated time, advanced by a fixed delta per step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    pub elapsed: f64,
    pub dt: f64,
    pub steps: u64,
}

impl SimClock {
    pub fn new(dt: f64) -> Self {
        Self {
            elapsed: 0.0,
            dt,
            steps: 0,
        }
    }

    fn advance(&mut self) {
        self.steps += 1;
        self.elapsed = self.steps as f64 * self.dt;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Quit,
}

/// What the renderer needs to draw one body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyView {
    pub position: DVec2,
    pub radius: f64,
    pub color: Color,
}

/// Summary numbers for the status overlay
#[derive(Debug, Clone, Copy)]
pub struct SimStats {
    pub elapsed: f64,
    pub steps: u64,
    pub energy: f64,
    pub momentum: DVec2,
    pub center_of_mass: DVec2,
    pub collisions: u64,
}

pub struct Simulation {
    config: SimConfig,
    registry: BodyRegistry,
    traces: Vec<TraceBuffer>,
    clock: SimClock,
    paused: bool,
    trace_mode: TraceMode,
    collisions: u64,
    rng: StdRng,
    nudge_warned: bool,
}

impl Simulation {
    /// Seed the configured bodies and start the clock at zero
    pub fn new(config: SimConfig) -> Self {
        let mut rng = make_rng(config.seed);
        let (registry, report) = BodyRegistry::seed(&config, &mut rng);
        log::info!(
            "seeded {} bodies ({} procedural, {} overlapping)",
            registry.len(),
            report.placed,
            report.overlapping
        );
        Self::with_registry(config, registry, rng)
    }

    /// Start from an explicit body list, ignoring the configured ones
    pub fn from_bodies(config: SimConfig, bodies: Vec<Body>) -> Self {
        let rng = make_rng(config.seed);
        Self::with_registry(config, BodyRegistry::new(bodies), rng)
    }

    fn with_registry(config: SimConfig, registry: BodyRegistry, rng: StdRng) -> Self {
        let traces = build_traces(&config, registry.bodies());
        Self {
            clock: SimClock::new(config.physics.dt),
            paused: config.display.start_paused,
            trace_mode: config.trace.mode,
            config,
            registry,
            traces,
            collisions: 0,
            rng,
            nudge_warned: false,
        }
    }

    /// Advance every body by one fixed step.
    ///
    /// For each pair `(i, j)` with `j < i` the collision is resolved first,
    /// then gravity is applied; velocities are updated pair by pair. Positions
    /// are integrated once all pairs are done, and traces sampled last.
    pub fn step(&mut self) {
        let physics = &self.config.physics;
        let g = physics.gravitational_constant;
        let dt = physics.dt;
        let n = self.registry.len();

        for i in 0..n {
            for j in 0..i {
                let (a, b) = self.registry.pair_mut(i, j);
                if resolve_collision(a, b, physics.collision_slack, dt).is_resolved() {
                    self.collisions += 1;
                }
                apply_gravity(a, b, g, dt, physics.softening);
            }
        }

        for body in self.registry.bodies_mut() {
            integrate_position(body, dt);
        }

        for (trace, body) in self.traces.iter_mut().zip(self.registry.bodies()) {
            trace.record(body.position);
        }

        self.clock.advance();
    }

    /// Consume one frame of input and, unless paused, advance the simulation
    pub fn frame(&mut self, input: &FrameInput) -> FrameOutcome {
        if input.quit {
            return FrameOutcome::Quit;
        }

        if input.toggle_pause {
            self.paused = !self.paused;
            log::info!("{}", if self.paused { "paused" } else { "running" });
        }

        if input.cycle_trace {
            self.trace_mode = self.trace_mode.next();
            log::info!("trace mode: {}", self.trace_mode.label());
        }

        if input.reset {
            self.reset();
        }

        if !self.paused {
            for _ in 0..self.config.physics.steps_per_frame {
                self.step();
            }
            self.nudge(input.direction);
        }

        FrameOutcome::Continue
    }

    /// Offset the steered body by `direction` scaled by the nudge factor
    pub fn nudge(&mut self, direction: DVec2) {
        if direction == DVec2::ZERO {
            return;
        }

        let nudge = &self.config.nudge;
        let offset = direction * nudge.factor;
        match self.registry.get_mut(nudge.body) {
            Some(body) => match nudge.mode {
                NudgeMode::Position => body.position += offset,
                NudgeMode::Velocity => body.velocity += offset,
            },
            None if !self.nudge_warned => {
                log::warn!("no body {} to steer", nudge.body);
                self.nudge_warned = true;
            }
            None => {}
        }
    }

    /// Re-seed the bodies and clear traces, clock and counters
    pub fn reset(&mut self) {
        if self.config.seed.is_some() {
            self.rng = make_rng(self.config.seed);
        }
        let (registry, _) = BodyRegistry::seed(&self.config, &mut self.rng);
        self.traces = build_traces(&self.config, registry.bodies());
        self.registry = registry;
        self.clock = SimClock::new(self.config.physics.dt);
        self.collisions = 0;
        log::info!("simulation reset");
    }

    pub fn view(&self) -> Vec<BodyView> {
        self.registry
            .bodies()
            .iter()
            .map(|b| BodyView {
                position: b.position,
                radius: b.radius,
                color: b.color,
            })
            .collect()
    }

    /// Trace buffers, index-aligned with `bodies()`
    pub fn traces(&self) -> &[TraceBuffer] {
        &self.traces
    }

    pub fn bodies(&self) -> &[Body] {
        self.registry.bodies()
    }

    pub fn stats(&self) -> SimStats {
        let bodies = self.registry.bodies();
        SimStats {
            elapsed: self.clock.elapsed,
            steps: self.clock.steps,
            energy: total_energy(bodies, self.config.physics.gravitational_constant),
            momentum: total_momentum(bodies),
            center_of_mass: center_of_mass(bodies),
            collisions: self.collisions,
        }
    }

    pub fn clock(&self) -> SimClock {
        self.clock
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn trace_mode(&self) -> TraceMode {
        self.trace_mode
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn build_traces(config: &SimConfig, bodies: &[Body]) -> Vec<TraceBuffer> {
    bodies
        .iter()
        .map(|body| {
            let spacing = config.trace.spacing.resolve(body.radius);
            let mut trace = TraceBuffer::new(config.trace.capacity, spacing);
            trace.record(body.position);
            trace
        })
        .collect()
}
