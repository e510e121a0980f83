//! Common utilities for physics simulations
//!
//! This crate provides the window/GPU setup and the 2D camera shared by the
//! simulation binaries in this workspace.

pub mod graphics;
pub mod camera;

pub use graphics::*;
pub use camera::*;
