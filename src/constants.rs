//! Physical constants and propagation defaults.

/// Newtonian constant of gravitation [m³ kg⁻¹ s⁻²]
pub const GRAVITATIONAL_CONSTANT: f64 = 6.6743e-11;

/// Mass of the Sun [kg]
pub const SUN_MASS: f64 = 1.988416e30;

/// Gravitational parameter of the Sun, μ = G·M [m³/s²]
pub const SUN_MU: f64 = GRAVITATIONAL_CONSTANT * SUN_MASS;

/// Mean Sun-Earth distance [m]
pub const ASTRONOMICAL_UNIT: f64 = 1.496e11;

/// Absolute and relative tolerance of the orbit propagator.
pub const INTEGRATION_TOLERANCE: f64 = 1e-8;

/// Largest propagator step, as a fraction of the orbital period.
///
/// Keeps fast perihelion passes on eccentric orbits from being skipped over.
pub const MAX_STEP_FRACTION: f64 = 1.0 / 100.0;

/// Largest propagator step, as a fraction of the local crossing time
/// `r / |v|`.
///
/// On near-radial orbits the perihelion pass is far shorter than any
/// fraction of the period.
pub const CROSSING_STEP_FRACTION: f64 = 1.0 / 20.0;

/// Smallest propagator step, as a fraction of the orbital period.
pub const MIN_STEP_FRACTION: f64 = 1e-14;

/// First trial step, as a fraction of the orbital period.
pub const INITIAL_STEP_FRACTION: f64 = 1.0 / 1000.0;

/// Internal step budget for a single propagation.
pub const MAX_INTEGRATION_STEPS: u64 = 2_000_000;

/// Largest relative disagreement tolerated between the vis-viva and the
/// angular-momentum velocity at an apsis.
pub const APSIS_VELOCITY_AGREEMENT: f64 = 1e-6;

/// Largest relative drift of the specific energy tolerated in a
/// propagated state.
pub const ENERGY_DRIFT_LIMIT: f64 = 1e-6;

/// Round-off on e² that is absorbed into an exactly circular orbit.
pub const ECCENTRICITY_ROUNDOFF: f64 = 1e-12;

/// Below this eccentricity the apsides are considered undefined.
pub const CIRCULAR_ECCENTRICITY: f64 = 1e-6;
