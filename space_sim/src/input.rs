//! Per-frame input, reduced to what the simulation consumes

use glam::DVec2;

/// Signals collected since the previous frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub quit: bool,
    pub toggle_pause: bool,
    pub cycle_trace: bool,
    pub reset: bool,
    /// Held steering direction, components in `{-1, 0, 1}`
    pub direction: DVec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Which steering keys are currently held
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyState {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl KeyState {
    pub fn set(&mut self, direction: Direction, held: bool) {
        match direction {
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    /// `(right - left, up - down)`
    pub fn direction(&self) -> DVec2 {
        let axis = |pos: bool, neg: bool| pos as i8 as f64 - neg as i8 as f64;
        DVec2::new(axis(self.right, self.left), axis(self.up, self.down))
    }

    pub fn release_all(&mut self) {
        *self = Self::default();
    }
}
