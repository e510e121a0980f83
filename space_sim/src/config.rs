//! Simulation configuration loaded from TOML.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. An example overriding the physics and adding procedural bodies:
//!
//! ```toml
//! seed = 7
//!
//! [physics]
//! gravitational_constant = 6.6743e-11
//! dt = 0.01
//! steps_per_frame = 8
//!
//! [trace]
//! capacity = 128
//! spacing = { fixed = 5.0 }
//! mode = "lines"
//!
//! [[bodies]]
//! mass = 1.0e16
//! radius = 40.0
//! position = [0.0, 0.0]
//! color = [255, 0, 0]
//!
//! [procedural]
//! count = 5
//! radial = { kind = "uniform", min = 200.0, max = 400.0 }
//! mass = { kind = "normal", mean = 1.0e10, std_dev = 2.0e9 }
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use glam::DVec2;
use rand::Rng;
use rand_distr::{Distribution as _, Normal, Uniform};
use serde::Deserialize;

use crate::body::{Body, Color};
use crate::trace::{TraceMode, TraceSpacing, DEFAULT_TRACE_CAPACITY};

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read config {}: {}", path.display(), source)
            }
            ConfigError::Parse(e) => write!(f, "invalid config syntax: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for procedural placement; entropy when absent
    pub seed: Option<u64>,
    pub physics: PhysicsConfig,
    pub trace: TraceConfig,
    pub nudge: NudgeConfig,
    pub display: DisplayConfig,
    /// Bodies placed verbatim, in order
    pub bodies: Vec<BodyConfig>,
    pub procedural: ProceduralConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravitational_constant: f64,
    /// Simulated seconds per step
    pub dt: f64,
    pub steps_per_frame: u32,
    /// Plummer softening length; 0 gives the exact inverse-square law
    pub softening: f64,
    /// Extra distance at which touching bodies count as colliding
    pub collision_slack: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub capacity: usize,
    pub spacing: TraceSpacing,
    pub mode: TraceMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NudgeMode {
    #[default]
    Position,
    Velocity,
}

/// Manual steering of one body from the directional keys
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NudgeConfig {
    /// Index of the steered body
    pub body: usize,
    /// Offset per frame for a unit direction
    pub factor: f64,
    pub mode: NudgeMode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    pub start_paused: bool,
    /// Visible half-height in world units
    pub zoom: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BodyConfig {
    pub mass: f64,
    pub radius: f64,
    pub position: [f64; 2],
    #[serde(default)]
    pub velocity: [f64; 2],
    #[serde(default = "default_body_color")]
    pub color: [u8; 3],
}

fn default_body_color() -> [u8; 3] {
    [255, 255, 255]
}

impl BodyConfig {
    pub fn to_body(&self) -> Body {
        let [r, g, b] = self.color;
        Body::new(
            self.mass,
            self.radius,
            DVec2::from(self.position),
            DVec2::from(self.velocity),
            Color::rgb(r, g, b),
        )
    }
}

/// A scalar distribution to sample procedural parameters from
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    Constant { value: f64 },
    Uniform { min: f64, max: f64 },
    Normal { mean: f64, std_dev: f64 },
}

impl Distribution {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Distribution::Constant { value } => value,
            Distribution::Uniform { min, max } => {
                if min < max && (max - min).is_finite() {
                    Uniform::new(min, max).sample(rng)
                } else {
                    min
                }
            }
            Distribution::Normal { mean, std_dev } => match Normal::new(mean, std_dev) {
                Ok(normal) => normal.sample(rng),
                Err(_) => mean,
            },
        }
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        match *self {
            Distribution::Constant { value } if !value.is_finite() => Err(ConfigError::Invalid(
                format!("{} value must be finite", name),
            )),
            Distribution::Uniform { min, max } if !(max - min).is_finite() => Err(
                ConfigError::Invalid(format!("{} uniform bounds must be finite", name)),
            ),
            Distribution::Uniform { min, max } if !(min < max) => Err(ConfigError::Invalid(
                format!("{} uniform range is empty ({} .. {})", name, min, max),
            )),
            Distribution::Normal { mean, .. } if !mean.is_finite() => Err(ConfigError::Invalid(
                format!("{} mean must be finite", name),
            )),
            Distribution::Normal { std_dev, .. } if !(std_dev >= 0.0 && std_dev.is_finite()) => {
                Err(ConfigError::Invalid(format!(
                    "{} std_dev must be finite and non-negative",
                    name
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Randomly placed bodies added after the fixed ones
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProceduralConfig {
    pub count: usize,
    /// Distance from the origin
    pub radial: Distribution,
    pub mass: Distribution,
    pub radius: f64,
    /// Candidates drawn per body before accepting an overlap
    pub max_attempts: u32,
    /// Velocity = rotated position times this factor; circular-orbit speed
    /// about the fixed bodies when absent
    pub orbit_scale: Option<f64>,
    /// Counter-clockwise orbits when true
    pub prograde: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            physics: PhysicsConfig::default(),
            trace: TraceConfig::default(),
            nudge: NudgeConfig::default(),
            display: DisplayConfig::default(),
            bodies: vec![
                BodyConfig {
                    mass: 1.0e16,
                    radius: 40.0,
                    position: [0.0, 0.0],
                    velocity: [0.0, 0.1],
                    color: [255, 0, 0],
                },
                BodyConfig {
                    mass: 10.0,
                    radius: 4.0,
                    position: [500.0, 0.0],
                    velocity: [0.0, 40.0],
                    color: [0, 255, 0],
                },
                BodyConfig {
                    mass: 2.0e12,
                    radius: 6.0,
                    position: [0.0, -200.0],
                    velocity: [57.7, 0.0],
                    color: [0, 0, 255],
                },
            ],
            procedural: ProceduralConfig::default(),
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: 6.6743e-11,
            dt: 0.01,
            steps_per_frame: 8,
            softening: 0.0,
            collision_slack: 0.001,
        }
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_TRACE_CAPACITY,
            spacing: TraceSpacing::BodyRadius,
            mode: TraceMode::Off,
        }
    }
}

impl Default for NudgeConfig {
    fn default() -> Self {
        Self {
            body: 0,
            factor: 0.5,
            mode: NudgeMode::Position,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: "space".to_string(),
            width: 1280,
            height: 720,
            frame_rate: 60,
            start_paused: true,
            zoom: 360.0,
        }
    }
}

impl Default for ProceduralConfig {
    fn default() -> Self {
        Self {
            count: 3,
            radial: Distribution::Uniform {
                min: 250.0,
                max: 450.0,
            },
            mass: Distribution::Uniform {
                min: 1.0e9,
                max: 1.0e11,
            },
            radius: 4.0,
            max_attempts: 10,
            orbit_scale: None,
            prograde: true,
        }
    }
}

impl SimConfig {
    /// Read and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Total number of bodies the registry will hold
    pub fn body_count(&self) -> usize {
        self.bodies.len() + self.procedural.count
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let physics = &self.physics;
        if !(physics.dt > 0.0 && physics.dt.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "physics.dt must be positive, got {}",
                physics.dt
            )));
        }
        if !physics.gravitational_constant.is_finite() {
            return Err(ConfigError::Invalid(
                "physics.gravitational_constant must be finite".to_string(),
            ));
        }
        if !(physics.softening >= 0.0) || !(physics.collision_slack >= 0.0) {
            return Err(ConfigError::Invalid(
                "physics.softening and physics.collision_slack must be non-negative".to_string(),
            ));
        }
        if self.trace.capacity == 0 {
            return Err(ConfigError::Invalid(
                "trace.capacity must be at least 1".to_string(),
            ));
        }
        if let TraceSpacing::Fixed(distance) = self.trace.spacing {
            if !(distance >= 0.0) {
                return Err(ConfigError::Invalid(
                    "trace spacing must be non-negative".to_string(),
                ));
            }
        }

        for (i, body) in self.bodies.iter().enumerate() {
            if !(body.mass > 0.0 && body.mass.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "bodies[{}].mass must be positive, got {}",
                    i, body.mass
                )));
            }
            if !(body.radius >= 0.0 && body.radius.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "bodies[{}].radius must be non-negative, got {}",
                    i, body.radius
                )));
            }
            let finite = body.position.iter().chain(&body.velocity).all(|v| v.is_finite());
            if !finite {
                return Err(ConfigError::Invalid(format!(
                    "bodies[{}] has a non-finite position or velocity",
                    i
                )));
            }
        }

        let procedural = &self.procedural;
        if procedural.count > 0 {
            procedural.radial.validate("procedural.radial")?;
            procedural.mass.validate("procedural.mass")?;
            if !(procedural.radius >= 0.0 && procedural.radius.is_finite()) {
                return Err(ConfigError::Invalid(
                    "procedural.radius must be non-negative".to_string(),
                ));
            }
            if procedural.max_attempts == 0 {
                return Err(ConfigError::Invalid(
                    "procedural.max_attempts must be at least 1".to_string(),
                ));
            }
        }

        if self.body_count() == 0 {
            return Err(ConfigError::Invalid("no bodies configured".to_string()));
        }
        if self.nudge.body >= self.body_count() {
            log::warn!(
                "nudge target {} is out of range for {} bodies; steering disabled",
                self.nudge.body,
                self.body_count()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn default_config_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.trace.capacity, 128);
        assert_eq!(config.physics.gravitational_constant, 6.6743e-11);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SimConfig::from_toml(
            r#"
            seed = 3

            [physics]
            dt = 0.001

            [trace]
            spacing = { fixed = 2.5 }
            mode = "lines"
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(3));
        assert_eq!(config.physics.dt, 0.001);
        assert_eq!(config.physics.steps_per_frame, 8);
        assert_eq!(config.trace.spacing, TraceSpacing::Fixed(2.5));
        assert_eq!(config.trace.mode, TraceMode::Lines);
        assert_eq!(config.bodies.len(), 3);
    }

    #[test]
    fn bodies_replace_the_default_set() {
        let config = SimConfig::from_toml(
            r#"
            [[bodies]]
            mass = 5.0
            radius = 1.0
            position = [1.0, 2.0]

            [procedural]
            count = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.bodies.len(), 1);
        let body = config.bodies[0].to_body();
        assert_eq!(body.position, DVec2::new(1.0, 2.0));
        assert_eq!(body.velocity, DVec2::ZERO);
        assert_eq!(body.color, Color::WHITE);
    }

    #[test]
    fn rejects_non_positive_mass() {
        let err = SimConfig::from_toml(
            r#"
            [[bodies]]
            mass = 0.0
            radius = 1.0
            position = [0.0, 0.0]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_numbers() {
        let mut config = SimConfig::default();
        config.physics.dt = 0.0;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.trace.capacity = 0;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.procedural.radial = Distribution::Uniform { min: 5.0, max: 5.0 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unbounded_distributions() {
        let config = SimConfig::from_toml(
            "[procedural]\ncount = 2\nradial = { kind = \"uniform\", min = 100.0, max = inf }",
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SimConfig::default();
        config.procedural.radial = Distribution::Normal {
            mean: f64::INFINITY,
            std_dev: 1.0,
        };
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.procedural.mass = Distribution::Uniform {
            min: -f64::MAX,
            max: f64::MAX,
        };
        assert!(config.validate().is_err());

        // unvalidated ranges fall back to the lower bound instead of panicking
        let mut rng = StdRng::seed_from_u64(3);
        let wide = Distribution::Uniform {
            min: 100.0,
            max: f64::INFINITY,
        };
        assert_eq!(wide.sample(&mut rng), 100.0);
    }

    #[test]
    fn syntax_errors_are_parse_errors() {
        let err = SimConfig::from_toml("physics = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn distributions_sample_within_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let uniform = Distribution::Uniform { min: 2.0, max: 3.0 };
        for _ in 0..100 {
            let x = uniform.sample(&mut rng);
            assert!((2.0..3.0).contains(&x));
        }
        assert_eq!(Distribution::Constant { value: 4.0 }.sample(&mut rng), 4.0);
        let degenerate = Distribution::Normal { mean: 1.0, std_dev: 0.0 };
        assert_eq!(degenerate.sample(&mut rng), 1.0);
    }
}
