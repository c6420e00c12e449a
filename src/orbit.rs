//! Two-body orbit of a planet around the Sun.
//!
//! An [`OrbitModel`] is built from the launch conditions (distance, speed
//! and an optional launch angle). It derives the conserved specific energy
//! and angular momentum once and answers every other question from them:
//! closed-form geometry (axes, eccentricity, period, apsis speeds) and the
//! time-evolved state, obtained by propagating the planar equations of
//! motion in polar coordinates with the RKF7(8) solver.
//!
//! The model is immutable. Elapsed time is always an argument and every
//! propagation restarts from the launch state, so repeated queries are
//! deterministic.

use std::f64::consts::{PI, TAU};

use crate::constants::{
    APSIS_VELOCITY_AGREEMENT, CIRCULAR_ECCENTRICITY, CROSSING_STEP_FRACTION,
    ECCENTRICITY_ROUNDOFF, ENERGY_DRIFT_LIMIT, INITIAL_STEP_FRACTION, INTEGRATION_TOLERANCE,
    MAX_INTEGRATION_STEPS, MAX_STEP_FRACTION, MIN_STEP_FRACTION, SUN_MASS, SUN_MU,
};
use crate::error::OrbitError;
use crate::events::{EventConfig, EventDirection, EventFunction};
use crate::solver::{IntegrationError, IntegrationResult, OdeSystem, Rkf78, Tolerances};

/// Planar two-body equations of motion in polar coordinates.
///
/// State `[r, phi, r_dot]`:
///
/// ```text
/// dr/dt     = r_dot
/// dphi/dt   = h / r²
/// dr_dot/dt = r (dphi/dt)² - mu / r²
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PolarTwoBody {
    /// Gravitational parameter [m³/s²]
    pub mu: f64,
    /// Specific angular momentum [m²/s]
    pub h: f64,
}

impl OdeSystem<3> for PolarTwoBody {
    fn rhs(&self, _t: f64, y: &[f64; 3], dydt: &mut [f64; 3]) {
        let r = y[0];
        let r2 = r * r;
        let phi_dot = self.h / r2;

        dydt[0] = y[2];
        dydt[1] = phi_dot;
        dydt[2] = r * phi_dot * phi_dot - self.mu / r2;
    }

    /// The planet has fallen into the central mass once `r <= 0`.
    fn is_admissible(&self, y: &[f64; 3]) -> bool {
        y[0] > 0.0
    }

    /// A fraction of the time to cross the current radius at the current
    /// speed, so the perihelion pass of a near-radial orbit is resolved.
    fn max_step(&self, _t: f64, y: &[f64; 3]) -> f64 {
        let r = y[0];
        let speed = y[2].hypot(self.h / r);
        if speed > 0.0 {
            CROSSING_STEP_FRACTION * r / speed
        } else {
            f64::INFINITY
        }
    }
}

/// Radial velocity, zero at both apsides.
struct RadialVelocity;

impl EventFunction<3> for RadialVelocity {
    fn eval(&self, _t: f64, y: &[f64; 3]) -> f64 {
        y[2]
    }
}

/// Planet state at an elapsed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    /// Elapsed time since launch [s]
    pub time: f64,
    /// Distance from the Sun [m]
    pub radius: f64,
    /// Polar angle from the launch direction [rad], accumulated over
    /// revolutions rather than wrapped
    pub angle: f64,
    /// dr/dt [m/s]
    pub radial_velocity: f64,
    /// Velocity perpendicular to the radius, `h / r` [m/s]
    pub tangential_velocity: f64,
}

impl OrbitState {
    /// Magnitude of the velocity [m/s].
    pub fn speed(&self) -> f64 {
        self.radial_velocity.hypot(self.tangential_velocity)
    }

    /// Heliocentric position `(x, y)` [m], with the launch point on +x.
    pub fn position(&self) -> (f64, f64) {
        let (sin, cos) = self.angle.sin_cos();
        (self.radius * cos, self.radius * sin)
    }

    /// Specific orbital energy of this state for gravitational parameter `mu`.
    pub fn specific_energy(&self, mu: f64) -> f64 {
        0.5 * self.speed().powi(2) - mu / self.radius
    }

    /// Specific angular momentum of this state.
    pub fn specific_angular_momentum(&self) -> f64 {
        self.radius * self.tangential_velocity
    }
}

/// Which apsis to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApsisKind {
    /// Closest approach; radial velocity turns from negative to positive.
    Perihelion,
    /// Farthest point; radial velocity turns from positive to negative.
    Aphelion,
}

impl ApsisKind {
    fn crossing(self) -> EventDirection {
        match self {
            ApsisKind::Perihelion => EventDirection::Rising,
            ApsisKind::Aphelion => EventDirection::Falling,
        }
    }
}

/// A located apsis passage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApsisPassage {
    /// Apsis that was passed
    pub kind: ApsisKind,
    /// Time of the passage [s]
    pub time: f64,
    /// State at the passage
    pub state: OrbitState,
}

/// Keplerian orbit around the Sun defined by its launch conditions.
///
/// ```
/// use kepler_orbit::OrbitModel;
///
/// let model = OrbitModel::new(35_000.0, 1.496e11).unwrap();
/// let e = model.eccentricity().unwrap();
/// assert!(e > 0.2 && e < 0.4);
///
/// let half = model.state_at_time(model.orbital_period().unwrap() / 2.0).unwrap();
/// assert!(half.radius > 1.496e11);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitModel {
    mu: f64,
    initial_radius: f64,
    initial_speed: f64,
    launch_angle: f64,
    specific_energy: f64,
    specific_angular_momentum: f64,
}

impl OrbitModel {
    /// Orbit launched tangentially (perpendicular to the radius).
    pub fn new(initial_speed: f64, initial_radius: f64) -> Result<Self, OrbitError> {
        Self::with_launch_angle(initial_speed, initial_radius, 0.0)
    }

    /// Orbit launched at `launch_angle` from the tangential direction.
    ///
    /// Only the tangential component `v0 cos(angle)` carries angular
    /// momentum; the radial component `v0 sin(angle)` is the initial rate of
    /// change of the radius.
    pub fn with_launch_angle(
        initial_speed: f64,
        initial_radius: f64,
        launch_angle: f64,
    ) -> Result<Self, OrbitError> {
        if !initial_radius.is_finite() || initial_radius <= 0.0 {
            return Err(OrbitError::InvalidParameter {
                name: "initial radius",
                value: initial_radius,
                reason: "must be finite and positive",
            });
        }
        if !initial_speed.is_finite() || initial_speed < 0.0 {
            return Err(OrbitError::InvalidParameter {
                name: "initial speed",
                value: initial_speed,
                reason: "must be finite and non-negative",
            });
        }
        if !(0.0..TAU).contains(&launch_angle) {
            return Err(OrbitError::InvalidParameter {
                name: "launch angle",
                value: launch_angle,
                reason: "must lie in [0, 2pi)",
            });
        }

        let mu = SUN_MU;
        let specific_energy = 0.5 * initial_speed * initial_speed - mu / initial_radius;
        let specific_angular_momentum = initial_radius * initial_speed * launch_angle.cos();

        tracing::debug!(
            r0 = initial_radius,
            v0 = initial_speed,
            angle = launch_angle,
            energy = specific_energy,
            h = specific_angular_momentum,
            "orbit model built"
        );

        Ok(Self {
            mu,
            initial_radius,
            initial_speed,
            launch_angle,
            specific_energy,
            specific_angular_momentum,
        })
    }

    /// Mass of the central body [kg].
    pub fn central_mass(&self) -> f64 {
        SUN_MASS
    }

    /// Gravitational parameter μ [m³/s²].
    pub fn gravitational_parameter(&self) -> f64 {
        self.mu
    }

    /// Launch distance r0 [m].
    pub fn initial_radius(&self) -> f64 {
        self.initial_radius
    }

    /// Launch speed v0 [m/s].
    pub fn initial_speed(&self) -> f64 {
        self.initial_speed
    }

    /// Launch angle from the tangential direction [rad].
    pub fn launch_angle(&self) -> f64 {
        self.launch_angle
    }

    /// Conserved specific energy ε = v0²/2 − μ/r0 [J/kg].
    pub fn specific_energy(&self) -> f64 {
        self.specific_energy
    }

    /// Conserved specific angular momentum h = r0 v0 cos(angle) [m²/s].
    pub fn specific_angular_momentum(&self) -> f64 {
        self.specific_angular_momentum
    }

    /// Whether the trajectory is a closed ellipse (ε < 0).
    pub fn is_bound(&self) -> bool {
        self.specific_energy < 0.0
    }

    /// Semi-major axis a = −μ / (2ε) [m].
    pub fn semi_major_axis(&self) -> Result<f64, OrbitError> {
        if !self.is_bound() {
            return Err(OrbitError::Unbound {
                specific_energy: self.specific_energy,
            });
        }
        Ok(-self.mu / (2.0 * self.specific_energy))
    }

    /// e² from h² = μ a (1 − e²), with round-off around zero absorbed.
    fn eccentricity_squared(&self) -> Result<f64, OrbitError> {
        let a = self.semi_major_axis()?;
        let h = self.specific_angular_momentum;
        let e2 = 1.0 - h * h / (self.mu * a);

        if e2 < 0.0 && e2 >= -ECCENTRICITY_ROUNDOFF {
            return Ok(0.0);
        }
        if !e2.is_finite() || e2 < 0.0 {
            return Err(OrbitError::NumericalInstability {
                quantity: "eccentricity squared",
                value: e2,
            });
        }
        Ok(e2)
    }

    /// Semi-minor axis b = √(a (a − a e²)) [m].
    ///
    /// Equal to |h| √(a/μ). A radial trajectory (h = 0) has b = 0.
    pub fn semi_minor_axis(&self) -> Result<f64, OrbitError> {
        let a = self.semi_major_axis()?;
        let e2 = self.eccentricity_squared()?;
        Ok((a * (a - a * e2)).sqrt())
    }

    /// Eccentricity e = √(1 − (b/a)²), in `[0, 1)` for a bound ellipse.
    ///
    /// A radial trajectory has e = 1 and is reported as
    /// [`OrbitError::NumericalInstability`].
    pub fn eccentricity(&self) -> Result<f64, OrbitError> {
        let a = self.semi_major_axis()?;
        let b = self.semi_minor_axis()?;
        let ratio = b / a;
        let e = (1.0 - ratio * ratio).max(0.0).sqrt();

        if !(0.0..1.0).contains(&e) {
            return Err(OrbitError::NumericalInstability {
                quantity: "eccentricity",
                value: e,
            });
        }
        Ok(e)
    }

    /// Orbital period T = 2π √(a³/μ) [s].
    pub fn orbital_period(&self) -> Result<f64, OrbitError> {
        let a = self.semi_major_axis()?;
        Ok(2.0 * PI * (a.powi(3) / self.mu).sqrt())
    }

    /// Closest distance to the Sun, a (1 − e) [m].
    ///
    /// Evaluated as h² / (μ (1 + e)), which keeps its precision as e
    /// approaches 1.
    pub fn perihelion_distance(&self) -> Result<f64, OrbitError> {
        let e = self.eccentricity()?;
        let h = self.specific_angular_momentum;
        Ok(h * h / (self.mu * (1.0 + e)))
    }

    /// Farthest distance from the Sun, a (1 + e) [m].
    pub fn aphelion_distance(&self) -> Result<f64, OrbitError> {
        Ok(self.semi_major_axis()? * (1.0 + self.eccentricity()?))
    }

    /// Speed at perihelion [m/s].
    ///
    /// The smaller of the vis-viva speed and |h| / r_p; the two must agree.
    pub fn max_velocity(&self) -> Result<f64, OrbitError> {
        let a = self.semi_major_axis()?;
        let rp = self.perihelion_distance()?;
        let vis_viva = (self.mu * (2.0 / rp - 1.0 / a)).sqrt();
        let from_momentum = self.specific_angular_momentum.abs() / rp;

        let disagreement = (vis_viva - from_momentum).abs() / vis_viva.max(from_momentum);
        if disagreement.is_nan() || disagreement > APSIS_VELOCITY_AGREEMENT {
            return Err(OrbitError::NumericalInstability {
                quantity: "perihelion velocity",
                value: disagreement,
            });
        }
        Ok(vis_viva.min(from_momentum))
    }

    /// Characteristic slow speed √(μ / (a (1 + e))) [m/s].
    ///
    /// This is the circular speed at the aphelion distance, which is above
    /// the planet's actual aphelion speed for any e > 0; see
    /// [`aphelion_speed`](Self::aphelion_speed) for the latter.
    pub fn min_velocity(&self) -> Result<f64, OrbitError> {
        let a = self.semi_major_axis()?;
        let e = self.eccentricity()?;
        Ok((self.mu / (a * (1.0 + e))).sqrt())
    }

    /// Speed of the planet at aphelion, |h| / r_a [m/s].
    pub fn aphelion_speed(&self) -> Result<f64, OrbitError> {
        Ok(self.specific_angular_momentum.abs() / self.aphelion_distance()?)
    }

    /// Launch state, `t = 0`.
    pub fn initial_state(&self) -> OrbitState {
        self.state_from_vector(0.0, &self.initial_vector())
    }

    /// Planet state `t` seconds after launch.
    ///
    /// Propagates from the launch state with an adaptive RKF7(8) step,
    /// absolute and relative tolerance 1e-8 and steps no longer than a
    /// hundredth of the period or a twentieth of the local crossing time
    /// r/|v|. Fails with [`OrbitError::IntegrationDiverged`] when the solver
    /// gives up or the planet falls into the Sun, and with
    /// [`OrbitError::NumericalInstability`] when the specific energy of the
    /// result has drifted more than 1e-6 (relative) from its launch value.
    pub fn state_at_time(&self, t: f64) -> Result<OrbitState, OrbitError> {
        if !t.is_finite() || t < 0.0 {
            return Err(OrbitError::InvalidParameter {
                name: "elapsed time",
                value: t,
                reason: "must be finite and non-negative",
            });
        }

        let period = self.orbital_period()?;
        let mut solver = self.solver(period);
        let (_, y) = solver
            .integrate(
                &self.dynamics(),
                0.0,
                &self.initial_vector(),
                t,
                period * INITIAL_STEP_FRACTION,
            )
            .map_err(|source| diverged(t, source))?;

        self.checked_state(t, &y)
    }

    /// `samples` states evenly spaced over one period, both ends included.
    ///
    /// Propagates once through the period, stopping at each sample time.
    pub fn trajectory(&self, samples: usize) -> Result<Vec<OrbitState>, OrbitError> {
        if samples < 2 {
            return Err(OrbitError::InvalidParameter {
                name: "trajectory samples",
                value: samples as f64,
                reason: "need at least two samples",
            });
        }

        let period = self.orbital_period()?;
        let dynamics = self.dynamics();
        let mut solver = self.solver(period);
        let h0 = period * INITIAL_STEP_FRACTION;

        let mut y = self.initial_vector();
        let mut t_prev = 0.0;
        let mut states = Vec::with_capacity(samples);
        let last = (samples - 1) as f64;

        for i in 0..samples {
            let t = period * i as f64 / last;
            let (_, next) = solver
                .integrate(&dynamics, t_prev, &y, t, h0)
                .map_err(|source| diverged(t, source))?;
            y = next;
            t_prev = t;
            states.push(self.checked_state(t, &y)?);
        }

        Ok(states)
    }

    /// First passage through `kind` strictly after launch.
    ///
    /// Returns `None` for a (near-)circular orbit, whose apsides are not
    /// defined.
    pub fn next_apsis(&self, kind: ApsisKind) -> Result<Option<ApsisPassage>, OrbitError> {
        if self.eccentricity()? < CIRCULAR_ECCENTRICITY {
            return Ok(None);
        }

        let period = self.orbital_period()?;
        // slightly past one period so an apsis at the launch point recurs
        let horizon = period * (1.0 + MAX_STEP_FRACTION);
        let config = EventConfig {
            direction: kind.crossing(),
            root_tol: period * 1e-12,
            max_iter: 100,
        };

        let mut solver = self.solver(period);
        let result = solver
            .integrate_to_event(
                &self.dynamics(),
                &RadialVelocity,
                &config,
                0.0,
                &self.initial_vector(),
                horizon,
                period * INITIAL_STEP_FRACTION,
            )
            .map_err(|source| diverged(horizon, source))?;

        match result {
            // The interpolated event state is too coarse on near-radial
            // orbits; propagate to the located time instead
            IntegrationResult::Event(event) => Ok(Some(ApsisPassage {
                kind,
                time: event.t,
                state: self.state_at_time(event.t)?,
            })),
            IntegrationResult::Completed { t, .. } => Err(OrbitError::NumericalInstability {
                quantity: "apsis search horizon",
                value: t,
            }),
        }
    }

    fn dynamics(&self) -> PolarTwoBody {
        PolarTwoBody {
            mu: self.mu,
            h: self.specific_angular_momentum,
        }
    }

    fn initial_vector(&self) -> [f64; 3] {
        [
            self.initial_radius,
            0.0,
            self.initial_speed * self.launch_angle.sin(),
        ]
    }

    fn solver(&self, period: f64) -> Rkf78<3> {
        let mut solver = Rkf78::new(Tolerances::new(INTEGRATION_TOLERANCE, INTEGRATION_TOLERANCE));
        solver.set_step_limits(period * MIN_STEP_FRACTION, period * MAX_STEP_FRACTION);
        solver.max_steps = MAX_INTEGRATION_STEPS;
        solver
    }

    /// Propagated state, rejected when its energy has drifted from the
    /// launch value.
    fn checked_state(&self, t: f64, y: &[f64; 3]) -> Result<OrbitState, OrbitError> {
        let state = self.state_from_vector(t, y);
        let drift = (state.specific_energy(self.mu) - self.specific_energy).abs()
            / self.specific_energy.abs();
        if drift.is_nan() || drift > ENERGY_DRIFT_LIMIT {
            tracing::debug!(t, drift, "propagated state lost energy conservation");
            return Err(OrbitError::NumericalInstability {
                quantity: "specific energy drift",
                value: drift,
            });
        }
        Ok(state)
    }

    fn state_from_vector(&self, t: f64, y: &[f64; 3]) -> OrbitState {
        OrbitState {
            time: t,
            radius: y[0],
            angle: y[1],
            radial_velocity: y[2],
            tangential_velocity: self.specific_angular_momentum / y[0],
        }
    }
}

fn diverged(requested_time: f64, source: IntegrationError) -> OrbitError {
    tracing::debug!(requested_time, %source, "orbit propagation failed");
    OrbitError::IntegrationDiverged {
        requested_time,
        source,
    }
}
