//! Error types for the orbit model, its configuration and the simulation
//! driver.

use crate::solver::IntegrationError;

/// Failures of [`OrbitModel`](crate::OrbitModel) construction and queries.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OrbitError {
    /// A constructor or query argument is outside its domain.
    #[error("invalid {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
        /// What the value must satisfy
        reason: &'static str,
    },

    /// Geometry or period requested for a trajectory that never closes.
    #[error("orbit is unbound (specific energy {specific_energy} J/kg >= 0)")]
    Unbound {
        /// Specific energy of the trajectory
        specific_energy: f64,
    },

    /// The propagator could not reach the requested time.
    #[error("propagation to t = {requested_time} s diverged: {source}")]
    IntegrationDiverged {
        /// Elapsed time that was requested
        requested_time: f64,
        /// Underlying solver failure
        #[source]
        source: IntegrationError,
    },

    /// A derived quantity fell outside its physically valid range.
    #[error("numerical instability in {quantity}: {value}")]
    NumericalInstability {
        /// Quantity being derived
        quantity: &'static str,
        /// Value that failed the check
        value: f64,
    },
}

/// Failures loading or validating a [`SimulationConfig`](crate::SimulationConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Read(#[source] std::io::Error),

    /// The config file is not valid JSON for the expected schema.
    #[error("failed to parse config: {0}")]
    Parse(#[source] serde_json::Error),

    /// A field holds a value the simulation cannot run with.
    #[error("invalid config field `{field}`: {reason}")]
    Invalid {
        /// Field name as it appears in the file
        field: &'static str,
        /// What the value must satisfy
        reason: &'static str,
    },
}

/// Failures of [`SimulationDriver`](crate::SimulationDriver) operations.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Orbit model problem.
    #[error(transparent)]
    Orbit(#[from] OrbitError),

    /// Initial conditions were edited after the simulation started.
    #[error("initial conditions are locked once the simulation has started")]
    Locked,
}
