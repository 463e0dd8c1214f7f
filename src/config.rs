//! Sandbox configuration.
//!
//! Loaded from YAML; every field has a default so a partial file only
//! overrides what it names.
//!
//! ```yaml
//! physics:
//!   gravity: 7.8
//!   max_sub_steps: 10
//! fracture:
//!   impulse_threshold: 250.0
//!   radial_iterations: 1
//!   random_iterations: 2
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration in m/s².
    pub gravity: f32,
    pub fixed_time_step: f32,
    pub max_sub_steps: u32,
    /// Frame deltas above this are clamped before stepping.
    pub max_frame_delta: f32,
    pub friction: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 7.8,
            fixed_time_step: 1.0 / 60.0,
            max_sub_steps: 10,
            max_frame_delta: 0.1,
            friction: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractureConfig {
    /// Contact impulse an object must exceed to break.
    pub impulse_threshold: f32,
    /// Cuts rotated about the impact normal through the impact point.
    pub radial_iterations: u32,
    /// Cuts through the piece centre at pseudo-random angles.
    pub random_iterations: u32,
    /// Share of the parent mass each piece receives.
    pub piece_mass_ratio: f32,
    /// Pieces smaller than this (bounding diameter) are not breakable again.
    /// `None` lets debris break down to slivers; the demo scene uses
    /// [`FractureConfig::MIN_BREAK_SIZE`].
    pub min_break_size: Option<f32>,
    /// Debris at or beyond this generation are not breakable again.
    pub max_generation: Option<u32>,
    pub seed: u64,
}

impl Default for FractureConfig {
    fn default() -> Self {
        Self {
            impulse_threshold: 250.0,
            radial_iterations: 1,
            random_iterations: 2,
            piece_mass_ratio: 0.5,
            min_break_size: None,
            max_generation: None,
            seed: 0x5eed,
        }
    }
}

impl FractureConfig {
    /// Bounding diameter below which the demo scene stops breaking debris.
    pub const MIN_BREAK_SIZE: f32 = 1.4;

    pub fn with_threshold(mut self, impulse_threshold: f32) -> Self {
        self.impulse_threshold = impulse_threshold;
        self
    }

    pub fn with_max_generation(mut self, max_generation: Option<u32>) -> Self {
        self.max_generation = max_generation;
        self
    }

    pub fn with_min_break_size(mut self, min_break_size: Option<f32>) -> Self {
        self.min_break_size = min_break_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Whether a piece of the given generation and bounding radius may break.
    pub fn allows_breaking(&self, generation: u32, bounding_radius: f32) -> bool {
        let deep_enough = self.max_generation.is_some_and(|max| generation >= max);
        let too_small = self
            .min_break_size
            .is_some_and(|min| 2.0 * bounding_radius <= min);
        !deep_enough && !too_small
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    pub mass: f32,
    pub radius: f32,
    pub speed: f32,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            mass: 35.0,
            radius: 0.4,
            speed: 24.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub physics: PhysicsConfig,
    pub fracture: FractureConfig,
    pub ball: BallConfig,
}

impl SandboxConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn with_fracture(mut self, fracture: FractureConfig) -> Self {
        self.fracture = fracture;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });

        if !(self.physics.fixed_time_step > 0.0) {
            return invalid("physics.fixed_time_step", "must be positive");
        }
        if self.physics.max_sub_steps == 0 {
            return invalid("physics.max_sub_steps", "must be at least 1");
        }
        if !(self.physics.max_frame_delta >= 0.0) {
            return invalid("physics.max_frame_delta", "must not be negative");
        }
        if !(self.fracture.impulse_threshold > 0.0) {
            return invalid("fracture.impulse_threshold", "must be positive");
        }
        if !(self.fracture.piece_mass_ratio > 0.0 && self.fracture.piece_mass_ratio <= 1.0) {
            return invalid("fracture.piece_mass_ratio", "must be in (0, 1]");
        }
        if !(self.ball.mass > 0.0 && self.ball.radius > 0.0) {
            return invalid("ball", "mass and radius must be positive");
        }
        Ok(())
    }
}
