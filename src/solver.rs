//! Adaptive Runge-Kutta-Fehlberg 7(8) integrator.
//!
//! Fixed-size state vectors (`[f64; N]`), an I-controller on the embedded
//! 7th-order error estimate, hard step-size limits and a step budget. The
//! orbit model drives it with a three-component polar state; the solver
//! itself knows nothing about orbits.
//!
//! Reference: NASA TR R-287, Erwin Fehlberg, 1968

use thiserror::Error;

use crate::coefficients::{A, B, B_ERR, C, STAGES};
use crate::events::{
    sign_change_detected, BrentError, BrentSolver, EventConfig, EventFunction, EventResult,
};

/// System of ordinary differential equations `dy/dt = f(t, y)`.
pub trait OdeSystem<const N: usize> {
    /// Evaluate the right-hand side into `dydt`.
    fn rhs(&self, t: f64, y: &[f64; N], dydt: &mut [f64; N]);

    /// Whether `y` is a state the model can continue from.
    ///
    /// Checked on every accepted step; returning `false` aborts the
    /// integration with [`IntegrationError::InadmissibleState`].
    fn is_admissible(&self, _y: &[f64; N]) -> bool {
        true
    }

    /// Largest step magnitude the system tolerates from state `y`.
    ///
    /// Applied before every trial step, on top of the solver's own limits.
    fn max_step(&self, _t: f64, _y: &[f64; N]) -> f64 {
        f64::INFINITY
    }
}

/// Outcome of a single trial step.
#[derive(Debug, Clone)]
pub struct StepResult<const N: usize> {
    /// 8th-order state at `t`
    pub y: [f64; N],
    /// Time reached by the step
    pub t: f64,
    /// Scaled error norm, accepted when `<= 1`
    pub error: f64,
    /// Suggested magnitude of the next step
    pub h_next: f64,
    /// Whether the step passed the tolerance test
    pub accepted: bool,
}

/// Work counters.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    /// Right-hand side evaluations
    pub fn_evals: u64,
    /// Accepted steps
    pub accepted_steps: u64,
    /// Rejected steps
    pub rejected_steps: u64,
}

/// I-controller: `h_new = safety * h * error^(-1/8)`, clamped per step.
#[derive(Debug, Clone)]
pub struct StepController {
    /// Safety factor
    pub safety: f64,
    /// Largest growth per step
    pub max_factor: f64,
    /// Largest shrink per step
    pub min_factor: f64,
    exponent: f64,
}

impl Default for StepController {
    fn default() -> Self {
        Self {
            safety: 0.9,
            max_factor: 5.0,
            min_factor: 0.2,
            exponent: 1.0 / 8.0,
        }
    }
}

impl StepController {
    /// Step size multiplier for a given scaled error norm.
    ///
    /// A non-finite norm (a stage evaluated on a singularity) shrinks the
    /// step as hard as allowed.
    pub fn compute_factor(&self, error: f64) -> f64 {
        if !error.is_finite() {
            return self.min_factor;
        }
        if error == 0.0 {
            return self.max_factor;
        }

        (self.safety * error.powf(-self.exponent)).clamp(self.min_factor, self.max_factor)
    }
}

/// Error tolerances; the scaled error of component `i` is
/// `|err_i| / (atol_i + rtol_i * |y_i|)`.
#[derive(Debug, Clone)]
pub struct Tolerances<const N: usize> {
    /// Absolute tolerance per component
    pub atol: [f64; N],
    /// Relative tolerance per component
    pub rtol: [f64; N],
}

impl<const N: usize> Tolerances<N> {
    /// Same tolerances for every component.
    pub fn new(atol: f64, rtol: f64) -> Self {
        Self {
            atol: [atol; N],
            rtol: [rtol; N],
        }
    }

    /// Per-component tolerances.
    pub fn with_components(atol: [f64; N], rtol: [f64; N]) -> Self {
        Self { atol, rtol }
    }
}

/// Runge-Kutta-Fehlberg 7(8) integrator for an `N`-dimensional state.
///
/// ```
/// use kepler_orbit::{OdeSystem, Rkf78, Tolerances};
///
/// struct Decay;
///
/// impl OdeSystem<1> for Decay {
///     fn rhs(&self, _t: f64, y: &[f64; 1], dydt: &mut [f64; 1]) {
///         dydt[0] = -y[0];
///     }
/// }
///
/// let mut solver = Rkf78::new(Tolerances::new(1e-12, 1e-12));
/// let (_, y) = solver.integrate(&Decay, 0.0, &[1.0], 1.0, 0.1).unwrap();
/// assert!((y[0] - (-1.0_f64).exp()).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct Rkf78<const N: usize> {
    tol: Tolerances<N>,
    controller: StepController,
    /// Smallest step magnitude
    pub h_min: f64,
    /// Largest step magnitude
    pub h_max: f64,
    /// Trial steps allowed per integration call
    pub max_steps: u64,
    k: [[f64; N]; STAGES],
    /// Work counters, accumulated across calls
    pub stats: Stats,
}

impl<const N: usize> Rkf78<N> {
    /// Create a solver with default step limits.
    pub fn new(tol: Tolerances<N>) -> Self {
        Self {
            tol,
            controller: StepController::default(),
            h_min: 1e-14,
            h_max: f64::INFINITY,
            max_steps: 10_000_000,
            k: [[0.0; N]; STAGES],
            stats: Stats::default(),
        }
    }

    /// Set the step magnitude limits.
    pub fn set_step_limits(&mut self, h_min: f64, h_max: f64) {
        self.h_min = h_min;
        self.h_max = h_max;
    }

    /// Take one trial step of size `h` (sign gives the direction).
    pub fn step<S: OdeSystem<N>>(
        &mut self,
        sys: &S,
        t: f64,
        y: &[f64; N],
        h: f64,
    ) -> StepResult<N> {
        let h = h.signum() * h.abs().clamp(self.h_min, self.h_max);

        self.compute_stages(sys, t, y, h);
        let y8 = self.compute_solution(y, h);
        let error = self.compute_error(&y8, h);
        let accepted = error <= 1.0;

        let h_next = (h.abs() * self.controller.compute_factor(error)).clamp(self.h_min, self.h_max);

        self.stats.fn_evals += STAGES as u64;
        if accepted {
            self.stats.accepted_steps += 1;
        } else {
            self.stats.rejected_steps += 1;
        }

        StepResult {
            y: y8,
            t: t + h,
            error,
            h_next,
            accepted,
        }
    }

    /// Integrate from `(t0, y0)` to `tf` with initial step guess `h0`.
    ///
    /// Returns the final `(t, y)`.
    pub fn integrate<S: OdeSystem<N>>(
        &mut self,
        sys: &S,
        t0: f64,
        y0: &[f64; N],
        tf: f64,
        h0: f64,
    ) -> Result<(f64, [f64; N]), IntegrationError> {
        if t0 == tf {
            return Ok((t0, *y0));
        }
        self.validate_inputs(t0, y0, tf, h0)?;

        let direction = (tf - t0).signum();
        let mut t = t0;
        let mut y = *y0;
        let mut h = h0;
        let mut step_count = 0u64;

        while (tf - t) * direction > self.h_min {
            h = direction * h.abs().min(sys.max_step(t, &y));
            if (t + h - tf) * direction > 0.0 {
                h = tf - t;
            }

            let result = self.step(sys, t, &y, h);
            if result.accepted {
                t = result.t;
                y = result.y;
                self.check_state(sys, t, &y)?;
            }
            h = result.h_next * direction;

            step_count += 1;
            if step_count > self.max_steps {
                tracing::debug!(t, steps = step_count, "step budget exhausted");
                return Err(IntegrationError::MaxStepsExceeded);
            }

            if !result.accepted && result.h_next <= self.h_min && (tf - t) * direction > self.h_min
            {
                tracing::debug!(t, h = result.h_next, "step size collapsed");
                return Err(IntegrationError::StepSizeTooSmall {
                    t,
                    h: result.h_next,
                });
            }
        }

        tracing::trace!(
            t,
            accepted = self.stats.accepted_steps,
            rejected = self.stats.rejected_steps,
            "integration complete"
        );
        Ok((t, y))
    }

    /// Integrate until `event` crosses zero in the configured direction or
    /// `tf` is reached, whichever comes first.
    ///
    /// The event state is reconstructed by cubic Hermite interpolation over
    /// the step that brackets the crossing.
    #[allow(clippy::too_many_arguments)]
    pub fn integrate_to_event<S, E>(
        &mut self,
        sys: &S,
        event: &E,
        config: &EventConfig,
        t0: f64,
        y0: &[f64; N],
        tf: f64,
        h0: f64,
    ) -> Result<IntegrationResult<N>, IntegrationError>
    where
        S: OdeSystem<N>,
        E: EventFunction<N>,
    {
        if t0 == tf {
            return Ok(IntegrationResult::Completed { t: t0, y: *y0 });
        }
        self.validate_inputs(t0, y0, tf, h0)?;

        let direction = (tf - t0).signum();
        let mut t = t0;
        let mut y = *y0;
        let mut h = h0;
        let mut g_prev = event.eval(t, &y);
        let mut step_count = 0u64;

        while (tf - t) * direction > self.h_min {
            h = direction * h.abs().min(sys.max_step(t, &y));
            if (t + h - tf) * direction > 0.0 {
                h = tf - t;
            }

            let result = self.step(sys, t, &y, h);
            if result.accepted {
                self.check_state(sys, result.t, &result.y)?;

                let g_new = event.eval(result.t, &result.y);
                if sign_change_detected(g_prev, g_new, config.direction) {
                    let found = self.find_event_root(
                        sys, event, config, (t, &y, g_prev), (result.t, &result.y, g_new),
                    )?;
                    return Ok(IntegrationResult::Event(found));
                }

                t = result.t;
                y = result.y;
                g_prev = g_new;
            }
            h = result.h_next * direction;

            step_count += 1;
            if step_count > self.max_steps {
                return Err(IntegrationError::MaxStepsExceeded);
            }

            if !result.accepted && result.h_next <= self.h_min && (tf - t) * direction > self.h_min
            {
                return Err(IntegrationError::StepSizeTooSmall {
                    t,
                    h: result.h_next,
                });
            }
        }

        Ok(IntegrationResult::Completed { t, y })
    }

    /// Reset the work counters.
    pub fn reset_stats(&mut self) {
        self.stats = Stats::default();
    }

    fn check_state<S: OdeSystem<N>>(
        &self,
        sys: &S,
        t: f64,
        y: &[f64; N],
    ) -> Result<(), IntegrationError> {
        if !y.iter().all(|v| v.is_finite()) {
            tracing::debug!(t, "non-finite state");
            return Err(IntegrationError::NonFiniteState { t });
        }
        if !sys.is_admissible(y) {
            tracing::debug!(t, "state left the admissible region");
            return Err(IntegrationError::InadmissibleState { t });
        }
        Ok(())
    }

    #[allow(clippy::needless_range_loop)]
    fn compute_stages<S: OdeSystem<N>>(&mut self, sys: &S, t: f64, y: &[f64; N], h: f64) {
        let mut y_stage = [0.0; N];

        sys.rhs(t, y, &mut self.k[0]);

        for i in 1..STAGES {
            for n in 0..N {
                let mut acc = 0.0;
                for j in 0..i {
                    acc += A[i][j] * self.k[j][n];
                }
                y_stage[n] = y[n] + h * acc;
            }
            sys.rhs(t + C[i] * h, &y_stage, &mut self.k[i]);
        }
    }

    #[allow(clippy::needless_range_loop)]
    fn compute_solution(&self, y: &[f64; N], h: f64) -> [f64; N] {
        let mut y_new = [0.0; N];
        for n in 0..N {
            let mut acc = 0.0;
            for i in 0..STAGES {
                acc += B[i] * self.k[i][n];
            }
            y_new[n] = y[n] + h * acc;
        }
        y_new
    }

    /// Infinity norm of the tolerance-scaled local error.
    #[allow(clippy::needless_range_loop)]
    fn compute_error(&self, y8: &[f64; N], h: f64) -> f64 {
        let mut worst: f64 = 0.0;
        for n in 0..N {
            let mut err = 0.0;
            for i in 0..STAGES {
                err += B_ERR[i] * self.k[i][n];
            }
            let scale = self.tol.atol[n] + self.tol.rtol[n] * y8[n].abs();
            let scaled = (h * err).abs() / scale;
            // NaN must not slip through f64::max
            if !scaled.is_finite() {
                return f64::INFINITY;
            }
            worst = worst.max(scaled);
        }
        worst
    }

    fn validate_inputs(
        &self,
        t0: f64,
        y0: &[f64; N],
        tf: f64,
        h0: f64,
    ) -> Result<(), IntegrationError> {
        if !t0.is_finite() || !tf.is_finite() || !h0.is_finite() {
            return Err(IntegrationError::InvalidInput {
                message: "t0, tf and h0 must be finite".to_string(),
            });
        }
        if h0 == 0.0 {
            return Err(IntegrationError::InvalidInput {
                message: "h0 must be non-zero".to_string(),
            });
        }
        if h0.signum() != (tf - t0).signum() {
            return Err(IntegrationError::InvalidInput {
                message: "h0 must point from t0 towards tf".to_string(),
            });
        }
        if let Some(i) = y0.iter().position(|v| !v.is_finite()) {
            return Err(IntegrationError::InvalidInput {
                message: format!("y0[{}] is not finite", i),
            });
        }
        for (i, (&a, &r)) in self.tol.atol.iter().zip(self.tol.rtol.iter()).enumerate() {
            if !a.is_finite() || a <= 0.0 {
                return Err(IntegrationError::InvalidInput {
                    message: format!("atol[{}] must be positive and finite", i),
                });
            }
            if !r.is_finite() || r < 0.0 {
                return Err(IntegrationError::InvalidInput {
                    message: format!("rtol[{}] must be non-negative and finite", i),
                });
            }
        }
        Ok(())
    }

    fn find_event_root<S, E>(
        &mut self,
        sys: &S,
        event: &E,
        config: &EventConfig,
        (t_a, y_a, g_a): (f64, &[f64; N], f64),
        (t_b, y_b, g_b): (f64, &[f64; N], f64),
    ) -> Result<EventResult<N>, IntegrationError>
    where
        S: OdeSystem<N>,
        E: EventFunction<N>,
    {
        let mut f_a = [0.0; N];
        let mut f_b = [0.0; N];
        sys.rhs(t_a, y_a, &mut f_a);
        sys.rhs(t_b, y_b, &mut f_b);
        self.stats.fn_evals += 2;

        let dt = t_b - t_a;
        let hermite = |t: f64| -> [f64; N] {
            let s = (t - t_a) / dt;
            let s2 = s * s;
            let s3 = s2 * s;
            let h00 = 1.0 - 3.0 * s2 + 2.0 * s3;
            let h10 = s - 2.0 * s2 + s3;
            let h01 = 3.0 * s2 - 2.0 * s3;
            let h11 = s3 - s2;

            let mut y = [0.0; N];
            for (i, yi) in y.iter_mut().enumerate() {
                *yi = h00 * y_a[i] + h10 * dt * f_a[i] + h01 * y_b[i] + h11 * dt * f_b[i];
            }
            y
        };

        let brent = BrentSolver::new(config.root_tol, config.max_iter);
        match brent.find_root(|t| event.eval(t, &hermite(t)), t_a, t_b, Some(g_a), Some(g_b)) {
            Ok((t, g_value, iterations))
            | Err(BrentError::MaxIterations {
                current_best: t,
                f_value: g_value,
                iterations,
            }) => Ok(EventResult {
                t,
                y: hermite(t),
                g_value,
                iterations,
            }),
            Err(err @ BrentError::NotBracketed { .. }) => Err(IntegrationError::EventFindingFailed {
                message: err.to_string(),
            }),
        }
    }
}

/// Result of [`Rkf78::integrate_to_event`].
#[derive(Debug, Clone)]
pub enum IntegrationResult<const N: usize> {
    /// Reached the final time without an event.
    Completed {
        /// Final time
        t: f64,
        /// Final state
        y: [f64; N],
    },
    /// Stopped on an event.
    Event(EventResult<N>),
}

/// Integration failures.
#[derive(Debug, Clone, Error)]
pub enum IntegrationError {
    /// A rejected step could not shrink any further.
    #[error("step size {h} too small at t = {t}")]
    StepSizeTooSmall {
        /// Time of the failure
        t: f64,
        /// Step size at the floor
        h: f64,
    },
    /// The step budget ran out.
    #[error("maximum number of integration steps exceeded")]
    MaxStepsExceeded,
    /// An event was detected but could not be located.
    #[error("event finding failed: {message}")]
    EventFindingFailed {
        /// Description
        message: String,
    },
    /// Bad arguments or tolerances.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description
        message: String,
    },
    /// An accepted step produced NaN or infinity.
    #[error("non-finite state at t = {t}")]
    NonFiniteState {
        /// Time of the failure
        t: f64,
    },
    /// An accepted step left the system's admissible region.
    #[error("inadmissible state at t = {t}")]
    InadmissibleState {
        /// Time of the failure
        t: f64,
    },
}
