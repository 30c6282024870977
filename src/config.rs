//! Configuration module for droplet simulation parameters.
//!
//! This module defines the parameter structures for the droplet simulation:
//! forces and friction, area growth while marching, trail splitting, merging,
//! and chance-gated emission. All values are plain data so tests can exercise
//! edge values without recompiling.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Parameters driving droplet motion.
///
/// A droplet accelerates downward under `mass * gravity` minus friction,
/// where mass is `radius^2 * density`. Static friction applies while the
/// droplet is at rest, dynamic friction once it is falling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceParameters {
    /// Gravitational acceleration in simulation units per second squared
    pub gravity: f32,

    /// Friction force opposing a droplet at rest
    pub static_friction: f32,

    /// Friction force opposing a falling droplet
    pub dynamic_friction: f32,

    /// Mass density factor (mass = radius^2 * density)
    pub density: f32,

    /// Scale applied to velocity when integrating position
    pub velocity_scale: f32,
}

impl Default for ForceParameters {
    fn default() -> Self {
        Self {
            gravity: 10.0,
            static_friction: 450.0,
            dynamic_friction: 350.0,
            density: 25.0,
            velocity_scale: 1.0,
        }
    }
}

/// Parameters controlling area growth while a droplet marches.
///
/// Each tick a moving droplet gains `marched * f` area, where `f` is drawn
/// from `factor_min..factor_max` with the uniform draw raised to `exponent`
/// (larger exponents bias toward the low end of the range).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthParameters {
    /// Minimum area gained per unit of marched distance
    pub factor_min: f32,

    /// Maximum area gained per unit of marched distance
    pub factor_max: f32,

    /// Exponent shaping the random draw (>= 1.0 biases small)
    pub exponent: f32,
}

impl Default for GrowthParameters {
    fn default() -> Self {
        Self {
            factor_min: 0.01,
            factor_max: 0.05,
            exponent: 2.0,
        }
    }
}

/// Parameters controlling trail splitting behind fast droplets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailParameters {
    /// Minimum speed before a droplet sheds trailing droplets
    pub split_velocity_threshold: f32,

    /// Minimum marched distance between two sheds
    pub distance_min: f32,

    /// Maximum marched distance between two sheds
    pub distance_max: f32,

    /// Child radius as a fraction of the parent radius, lower bound
    pub child_radius_min: f32,

    /// Child radius as a fraction of the parent radius, upper bound
    pub child_radius_max: f32,

    /// Lateral jitter applied to the child spawn position
    pub lateral_jitter: f32,

    /// Backward offset of the child, scaled by the parent radius
    pub offset_factor: f32,

    /// Vertical stretch of the child per unit of parent downward speed
    pub stretch_factor: f32,

    /// Fraction of the child's area removed from the parent (< 1.0)
    pub area_loss_factor: f32,

    /// Velocity damping applied to the parent after shedding (< 1.0)
    pub velocity_loss_factor: f32,
}

impl Default for TrailParameters {
    fn default() -> Self {
        Self {
            split_velocity_threshold: 300.0,
            distance_min: 20.0,
            distance_max: 50.0,
            child_radius_min: 0.3,
            child_radius_max: 0.5,
            lateral_jitter: 1.0,
            offset_factor: 1.5,
            stretch_factor: 0.002,
            area_loss_factor: 0.8,
            velocity_loss_factor: 0.9,
        }
    }
}

/// Parameters controlling droplet merging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeParameters {
    /// Fraction of the absorbed droplet's area gained by the survivor.
    /// 1.0 conserves area exactly; values below 1.0 shed a little area on
    /// every merge to avoid runaway growth.
    pub area_gain_factor: f32,
}

impl Default for MergeParameters {
    fn default() -> Self {
        Self {
            area_gain_factor: 0.8,
        }
    }
}

/// Parameters for chance-gated droplet emission.
///
/// Two presets are observed in practice: the per-movement default and the
/// stroke-end burst, which emits with certainty and a larger radius.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitParameters {
    /// Probability that a single emission attempt produces a droplet
    pub chance: f32,

    /// Minimum emitted radius
    pub radius_min: f32,

    /// Maximum emitted radius
    pub radius_max: f32,

    /// Exponent shaping the radius draw
    pub radius_exponent: f32,
}

impl Default for EmitParameters {
    fn default() -> Self {
        Self {
            chance: 0.01,
            radius_min: 0.3,
            radius_max: 0.7,
            radius_exponent: 2.0,
        }
    }
}

impl EmitParameters {
    /// Preset used when a stroke ends: always emits, with a larger radius
    /// biased toward the high end of the range.
    pub fn stroke_end() -> Self {
        Self {
            chance: 1.0,
            radius_min: 1.0,
            radius_max: 1.5,
            radius_exponent: 0.5,
        }
    }
}

/// Complete simulation configuration combining all parameter groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Gravity, friction and integration parameters
    #[serde(default)]
    pub force: ForceParameters,

    /// Area growth while marching
    #[serde(default)]
    pub growth: GrowthParameters,

    /// Trail splitting behind fast droplets
    #[serde(default)]
    pub trail: TrailParameters,

    /// Merge behavior for overlapping droplets
    #[serde(default)]
    pub merge: MergeParameters,
}

impl SimulationConfig {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|error| ConfigError::Io {
            path: path.as_ref().to_path_buf(),
            error,
        })?;
        serde_json::from_str(&contents).map_err(|error| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            error,
        })
    }

    /// Save configuration to a JSON file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents =
            serde_json::to_string_pretty(self).map_err(|error| ConfigError::Serialize { error })?;
        fs::write(path.as_ref(), contents).map_err(|error| ConfigError::Io {
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Error types for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error when reading or writing configuration files
    Io {
        path: std::path::PathBuf,
        error: std::io::Error,
    },
    /// JSON parsing error
    Parse {
        path: std::path::PathBuf,
        error: serde_json::Error,
    },
    /// JSON serialization error
    Serialize { error: serde_json::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, error } => {
                write!(
                    formatter,
                    "Failed to read/write config file '{}': {}",
                    path.display(),
                    error
                )
            }
            ConfigError::Parse { path, error } => {
                write!(
                    formatter,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    error
                )
            }
            ConfigError::Serialize { error } => {
                write!(formatter, "Failed to serialize config: {}", error)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { error, .. } => Some(error),
            ConfigError::Parse { error, .. } => Some(error),
            ConfigError::Serialize { error } => Some(error),
        }
    }
}
