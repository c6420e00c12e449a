//! Simulation settings, loaded from the same JSON file the UI reads.
//!
//! Only the keys the simulation needs are modelled here; window geometry,
//! colours and other presentation keys in the file are ignored.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::units::{km_per_s_to_m_per_s, million_miles_to_meters};

/// Launch defaults and animation pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Launch speed shown on reset [km/s]
    pub default_velocity: f64,
    /// Launch distance shown on reset [millions of miles]
    pub earth_distance: f64,
    /// Launch angle from the tangential direction shown on reset [rad]
    pub default_launch_angle: f64,
    /// Animation frames per second
    pub animation_fps: u32,
    /// Wall-clock seconds one full orbit should take on screen
    pub orbit_duration: f64,
    /// Points used to draw the orbit path
    pub trajectory_samples: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            default_velocity: 29.78,
            earth_distance: 92.96,
            default_launch_angle: 0.0,
            animation_fps: 30,
            orbit_duration: 10.0,
            trajectory_samples: 40,
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        let config = Self::from_json_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded simulation config");
        Ok(config)
    }

    /// Check that every field holds a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_velocity.is_finite() || self.default_velocity < 0.0 {
            return Err(ConfigError::Invalid {
                field: "default_velocity",
                reason: "must be finite and non-negative",
            });
        }
        if !self.earth_distance.is_finite() || self.earth_distance <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "earth_distance",
                reason: "must be finite and positive",
            });
        }
        if !(0.0..std::f64::consts::TAU).contains(&self.default_launch_angle) {
            return Err(ConfigError::Invalid {
                field: "default_launch_angle",
                reason: "must lie in [0, 2pi)",
            });
        }
        if self.animation_fps == 0 {
            return Err(ConfigError::Invalid {
                field: "animation_fps",
                reason: "must be at least 1",
            });
        }
        if !self.orbit_duration.is_finite() || self.orbit_duration <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "orbit_duration",
                reason: "must be finite and positive",
            });
        }
        if self.trajectory_samples < 2 {
            return Err(ConfigError::Invalid {
                field: "trajectory_samples",
                reason: "must be at least 2",
            });
        }
        Ok(())
    }

    /// Default launch speed [m/s].
    pub fn default_speed_m_per_s(&self) -> f64 {
        km_per_s_to_m_per_s(self.default_velocity)
    }

    /// Default launch distance [m].
    pub fn default_radius_m(&self) -> f64 {
        million_miles_to_meters(self.earth_distance)
    }

    /// Delay between animation frames (whole milliseconds).
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.animation_fps.max(1)))
    }
}
