//! # kepler-orbit: two-body orbits around the Sun
//!
//! Models the Keplerian orbit of a planet launched at a given distance,
//! speed and angle from the Sun, and propagates it in time with a
//! high-order adaptive integrator.
//!
//! ## Features
//!
//! - Conserved specific energy and angular momentum from launch conditions
//! - Closed-form geometry: semi-major/minor axis, eccentricity, period,
//!   perihelion/aphelion distance and speed
//! - Time evolution of radius, angle and velocity with a 13-stage
//!   Runge-Kutta-Fehlberg 7(8) pair (NASA TR R-287)
//! - Apsis passage search via zero crossings of the radial velocity, refined
//!   with Brent's method
//! - A simulation driver and JSON configuration for animating the orbit
//!
//! ## Basic Usage
//!
//! ```rust
//! use kepler_orbit::{OrbitModel, ASTRONOMICAL_UNIT};
//!
//! // Launch tangentially at 1 AU, faster than circular speed
//! let model = OrbitModel::new(32_000.0, ASTRONOMICAL_UNIT).unwrap();
//!
//! let period = model.orbital_period().unwrap();
//! let e = model.eccentricity().unwrap();
//! assert!(e > 0.0 && e < 1.0);
//!
//! // Where is the planet a quarter of an orbit later?
//! let state = model.state_at_time(period / 4.0).unwrap();
//! let (x, y) = state.position();
//! assert!(state.radius > ASTRONOMICAL_UNIT && y > 0.0);
//! # let _ = x;
//! ```
//!
//! ## Animating
//!
//! ```rust
//! use kepler_orbit::{SimulationConfig, SimulationDriver};
//!
//! let mut driver = SimulationDriver::new(SimulationConfig::default()).unwrap();
//! driver.set_speed_km_per_s(31.0).unwrap();
//! driver.start().unwrap();
//!
//! let frame = driver.tick().unwrap().unwrap();
//! assert!(frame.angle > 0.0);
//! ```
//!
//! ## Accuracy
//!
//! Propagation uses absolute and relative tolerance `1e-8` and never steps
//! further than a hundredth of the orbital period or a twentieth of the
//! local crossing time r/|v|. Specific energy and angular momentum
//! recomputed from propagated states stay within ~1e-8 of their launch
//! values over many revolutions. A state whose energy has drifted by more
//! than 1e-6 is reported as an error instead of returned.
//!
//! ## References
//!
//! 1. Fehlberg, E. (1968). "Classical Fifth-, Sixth-, Seventh-, and
//!    Eighth-Order Runge-Kutta Formulas with Stepsize Control".
//!    NASA TR R-287.
//!
//! 2. Brent, R.P. (1973). "Algorithms for Minimization without
//!    Derivatives". Prentice-Hall.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod coefficients;
pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod events;
pub mod orbit;
pub mod solver;
pub mod units;

pub use config::SimulationConfig;
pub use constants::{ASTRONOMICAL_UNIT, GRAVITATIONAL_CONSTANT, SUN_MASS, SUN_MU};
pub use driver::SimulationDriver;
pub use error::{ConfigError, DriverError, OrbitError};
pub use events::{BrentError, BrentSolver, EventConfig, EventDirection, EventFunction, EventResult};
pub use orbit::{ApsisKind, ApsisPassage, OrbitModel, OrbitState, PolarTwoBody};
pub use solver::{
    IntegrationError, IntegrationResult, OdeSystem, Rkf78, Stats, StepController, StepResult,
    Tolerances,
};
