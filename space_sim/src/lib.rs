//! Mutually gravitating bodies in 2D
//!
//! The core of the `space_sim` binary, usable without a window:
//!
//! - **gravity**: pairwise Newtonian acceleration and semi-implicit Euler steps
//! - **collision**: elastic collisions with time-of-impact backtracking
//! - **registry**: the fixed body set and its rejection-sampled placement
//! - **trace**: bounded per-body position history for trails
//! - **simulation**: the controller tying them together once per frame
//!
//! All physics runs in `f64`.

pub mod body;
pub mod collision;
pub mod config;
pub mod gravity;
pub mod input;
pub mod registry;
pub mod simulation;
pub mod trace;

pub use body::{pack_color, Body, Color};
pub use config::{ConfigError, SimConfig};
pub use simulation::{BodyView, FrameOutcome, SimStats, Simulation};
