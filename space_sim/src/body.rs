//! Bodies and their display colour

use glam::DVec2;

/// Opaque packed RGBA colour, stored as `0xAABBGGRR`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    pub const RED: Color = Color::rgba(255, 0, 0, 255);
    pub const GREEN: Color = Color::rgba(0, 255, 0, 255);
    pub const BLUE: Color = Color::rgba(0, 0, 255, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self((r as u32) | (g as u32) << 8 | (b as u32) << 16 | (a as u32) << 24)
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub const fn r(self) -> u8 {
        self.0 as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Same colour with alpha scaled by `fade` (clamped to `[0, 1]`)
    pub fn faded(self, fade: f32) -> Self {
        pack_color(self.r(), self.g(), self.b(), self.a(), fade)
    }

    /// Normalized `[r, g, b, a]` for GPU upload
    pub fn to_f32_array(self) -> [f32; 4] {
        [
            self.r() as f32 / 255.0,
            self.g() as f32 / 255.0,
            self.b() as f32 / 255.0,
            self.a() as f32 / 255.0,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Pack colour components, scaling alpha by `fade`
pub fn pack_color(r: u8, g: u8, b: u8, a: u8, fade: f32) -> Color {
    let fade = if fade.is_nan() { 0.0 } else { fade.clamp(0.0, 1.0) };
    let alpha = (a as f32 * fade).round() as u8;
    Color::rgba(r, g, b, alpha)
}

/// A simulated body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub mass: f64,
    pub radius: f64,
    pub position: DVec2,
    pub velocity: DVec2,
    pub color: Color,
}

impl Body {
    pub fn new(mass: f64, radius: f64, position: DVec2, velocity: DVec2, color: Color) -> Self {
        Self {
            mass,
            radius,
            position,
            velocity,
            color,
        }
    }

    pub fn momentum(&self) -> DVec2 {
        self.velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    /// True when the discs are within `slack` of touching
    pub fn overlaps(&self, other: &Body, slack: f64) -> bool {
        self.position.distance(other.position) <= self.radius + other.radius + slack
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}
