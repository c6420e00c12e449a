//! Simulation driver: the mutable half of the simulation.
//!
//! The orbit model is immutable and timeless. The driver owns everything
//! that changes while the animation plays:
//!
//! - the launch conditions being edited;
//! - the elapsed simulated time;
//! - the run state.
//!
//! The UI forwards slider edits and button presses to the driver and calls
//! [`SimulationDriver::tick`] once per frame.

use std::time::Duration;

use crate::config::SimulationConfig;
use crate::error::DriverError;
use crate::orbit::{OrbitModel, OrbitState};
use crate::units::{km_per_s_to_m_per_s, million_miles_to_meters};

/// Owns the editable launch conditions and the animation clock.
#[derive(Debug, Clone)]
pub struct SimulationDriver {
    config: SimulationConfig,
    model: OrbitModel,
    elapsed: f64,
    time_step: Option<f64>,
    running: bool,
    started: bool,
}

impl SimulationDriver {
    /// Driver positioned at the config's default launch conditions.
    pub fn new(config: SimulationConfig) -> Result<Self, DriverError> {
        config.validate()?;
        let model = Self::default_model(&config)?;
        Ok(Self {
            config,
            model,
            elapsed: 0.0,
            time_step: None,
            running: false,
            started: false,
        })
    }

    fn default_model(config: &SimulationConfig) -> Result<OrbitModel, DriverError> {
        Ok(OrbitModel::with_launch_angle(
            config.default_speed_m_per_s(),
            config.default_radius_m(),
            config.default_launch_angle,
        )?)
    }

    /// Active configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Orbit built from the current launch conditions.
    pub fn model(&self) -> &OrbitModel {
        &self.model
    }

    /// Simulated seconds since launch.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Simulated seconds per frame, fixed when the simulation starts.
    pub fn time_step(&self) -> Option<f64> {
        self.time_step
    }

    /// Whether frames currently advance the clock.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the simulation has been started since the last reset.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Delay between frames.
    pub fn frame_delay(&self) -> Duration {
        self.config.frame_delay()
    }

    /// Change the launch distance [millions of miles].
    pub fn set_radius_million_miles(&mut self, distance: f64) -> Result<&OrbitModel, DriverError> {
        let m = self.model;
        self.rebuild(
            m.initial_speed(),
            million_miles_to_meters(distance),
            m.launch_angle(),
        )
    }

    /// Change the launch speed [km/s].
    pub fn set_speed_km_per_s(&mut self, speed: f64) -> Result<&OrbitModel, DriverError> {
        let m = self.model;
        self.rebuild(km_per_s_to_m_per_s(speed), m.initial_radius(), m.launch_angle())
    }

    /// Change the launch angle [rad].
    pub fn set_launch_angle(&mut self, angle: f64) -> Result<&OrbitModel, DriverError> {
        let m = self.model;
        self.rebuild(m.initial_speed(), m.initial_radius(), angle)
    }

    /// Replace the model; the old one is kept if the new conditions are
    /// invalid.
    fn rebuild(&mut self, speed: f64, radius: f64, angle: f64) -> Result<&OrbitModel, DriverError> {
        if self.started {
            return Err(DriverError::Locked);
        }
        self.model = OrbitModel::with_launch_angle(speed, radius, angle)?;
        Ok(&self.model)
    }

    /// Start or resume the animation.
    ///
    /// The time step is chosen so one orbit takes `orbit_duration` seconds
    /// at `animation_fps` frames per second. Returns the time step.
    pub fn start(&mut self) -> Result<f64, DriverError> {
        let period = self.model.orbital_period()?;
        let step = period / (f64::from(self.config.animation_fps) * self.config.orbit_duration);

        self.time_step = Some(step);
        self.running = true;
        self.started = true;
        tracing::debug!(period, step, elapsed = self.elapsed, "simulation started");
        Ok(step)
    }

    /// Pause the animation; the clock keeps its value.
    pub fn stop(&mut self) {
        self.running = false;
        tracing::debug!(elapsed = self.elapsed, "simulation stopped");
    }

    /// Stop, zero the clock and restore the default launch conditions.
    pub fn reset(&mut self) -> Result<(), DriverError> {
        self.model = Self::default_model(&self.config)?;
        self.elapsed = 0.0;
        self.time_step = None;
        self.running = false;
        self.started = false;
        tracing::debug!("simulation reset");
        Ok(())
    }

    /// Advance one frame.
    ///
    /// Returns `None` while stopped. A propagation failure stops the
    /// animation before the error is returned.
    pub fn tick(&mut self) -> Result<Option<OrbitState>, DriverError> {
        let step = match (self.running, self.time_step) {
            (true, Some(step)) => step,
            _ => return Ok(None),
        };

        self.elapsed += step;
        match self.model.state_at_time(self.elapsed) {
            Ok(state) => {
                tracing::trace!(t = self.elapsed, r = state.radius, phi = state.angle, "tick");
                Ok(Some(state))
            }
            Err(err) => {
                self.running = false;
                Err(err.into())
            }
        }
    }

    /// Current state: launch state before the first tick.
    pub fn current_state(&self) -> Result<OrbitState, DriverError> {
        Ok(self.model.state_at_time(self.elapsed)?)
    }

    /// Orbit path sampled over one period.
    pub fn trajectory(&self) -> Result<Vec<OrbitState>, DriverError> {
        Ok(self.model.trajectory(self.config.trajectory_samples)?)
    }
}
