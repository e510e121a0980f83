//! Bounded per-body position history for trail rendering

use std::collections::VecDeque;

use glam::DVec2;
use serde::Deserialize;

/// Default number of samples kept per body
pub const DEFAULT_TRACE_CAPACITY: usize = 128;

/// How far a body must move before a new sample is taken
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceSpacing {
    /// A fixed distance in world units
    Fixed(f64),
    /// The body's own radius
    #[default]
    BodyRadius,
}

impl TraceSpacing {
    pub fn resolve(self, radius: f64) -> f64 {
        match self {
            TraceSpacing::Fixed(distance) => distance,
            TraceSpacing::BodyRadius => radius,
        }
    }
}

/// How trails are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceMode {
    #[default]
    Off,
    Circles,
    Lines,
}

impl TraceMode {
    pub fn next(self) -> Self {
        match self {
            TraceMode::Off => TraceMode::Circles,
            TraceMode::Circles => TraceMode::Lines,
            TraceMode::Lines => TraceMode::Off,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TraceMode::Off => "off",
            TraceMode::Circles => "circles",
            TraceMode::Lines => "lines",
        }
    }
}

/// Most-recent-first history of sampled positions
#[derive(Debug, Clone)]
pub struct TraceBuffer {
    samples: VecDeque<DVec2>,
    capacity: usize,
    spacing: f64,
}

impl TraceBuffer {
    pub fn new(capacity: usize, spacing: f64) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
            spacing,
        }
    }

    /// Record `position` if it lies further than the spacing from the
    /// newest sample. Returns whether a sample was appended.
    pub fn record(&mut self, position: DVec2) -> bool {
        if let Some(front) = self.samples.front() {
            if front.distance(position) <= self.spacing {
                return false;
            }
        }

        self.samples.push_front(position);
        self.samples.truncate(self.capacity);
        true
    }

    /// Samples from newest to oldest
    pub fn snapshot(&self) -> impl ExactSizeIterator<Item = DVec2> + '_ {
        self.samples.iter().copied()
    }

    pub fn front(&self) -> Option<DVec2> {
        self.samples.front().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
