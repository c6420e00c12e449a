//! Zero-crossing detection during propagation.
//!
//! A scalar function `g(t, y)` is watched across accepted steps. When it
//! changes sign in the requested direction the crossing is refined with
//! Brent's method. The orbit model uses this to find apsis passages, where
//! the radial velocity crosses zero.

use thiserror::Error;

/// Scalar function whose zero crossings mark an event.
pub trait EventFunction<const N: usize> {
    /// Value of the event function at `(t, y)`.
    fn eval(&self, t: f64, y: &[f64; N]) -> f64;
}

/// Which zero crossings count as an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventDirection {
    /// `g` goes from negative to positive.
    Rising,
    /// `g` goes from positive to negative.
    Falling,
    /// Either direction.
    #[default]
    Any,
}

/// Event detection settings.
#[derive(Debug, Clone)]
pub struct EventConfig {
    /// Crossing direction to detect
    pub direction: EventDirection,
    /// Bracket width at which root refinement stops
    pub root_tol: f64,
    /// Iteration cap for root refinement
    pub max_iter: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            direction: EventDirection::Any,
            root_tol: 1e-12,
            max_iter: 50,
        }
    }
}

/// A located event.
#[derive(Debug, Clone)]
pub struct EventResult<const N: usize> {
    /// Event time
    pub t: f64,
    /// Interpolated state at the event
    pub y: [f64; N],
    /// Residual of the event function (ideally ~0)
    pub g_value: f64,
    /// Brent iterations spent
    pub iterations: usize,
}

/// Brent's bracketing root finder.
///
/// Mixes bisection, secant and inverse quadratic interpolation; never leaves
/// the initial bracket.
///
/// Brent, R.P. (1973). "Algorithms for Minimization without Derivatives".
#[derive(Debug, Clone)]
pub struct BrentSolver {
    /// Bracket width at which the search stops
    pub tol: f64,
    /// Iteration cap
    pub max_iter: usize,
}

impl Default for BrentSolver {
    fn default() -> Self {
        Self {
            tol: 1e-12,
            max_iter: 50,
        }
    }
}

impl BrentSolver {
    /// Create a solver with the given tolerance and iteration cap.
    pub fn new(tol: f64, max_iter: usize) -> Self {
        Self { tol, max_iter }
    }

    /// Find a root of `f` inside `[a, b]`.
    ///
    /// `fa` / `fb` may be supplied when the caller already knows the
    /// endpoint values. Returns `(root, f(root), iterations)`.
    pub fn find_root<F>(
        &self,
        mut f: F,
        mut a: f64,
        mut b: f64,
        fa: Option<f64>,
        fb: Option<f64>,
    ) -> Result<(f64, f64, usize), BrentError>
    where
        F: FnMut(f64) -> f64,
    {
        let mut fa = fa.unwrap_or_else(|| f(a));
        let mut fb = fb.unwrap_or_else(|| f(b));

        if fa * fb > 0.0 {
            return Err(BrentError::NotBracketed { a, b, fa, fb });
        }

        let mut c = a;
        let mut fc = fa;
        let mut bisected = true;
        let mut d = b - a;

        for iter in 0..self.max_iter {
            // b is always the best estimate
            if fa.abs() < fb.abs() {
                std::mem::swap(&mut a, &mut b);
                std::mem::swap(&mut fa, &mut fb);
            }

            if fb == 0.0 || (b - a).abs() <= self.tol {
                return Ok((b, fb, iter + 1));
            }

            let candidate = if fa != fc && fb != fc && fa != fb {
                a * fb * fc / ((fa - fb) * (fa - fc))
                    + b * fa * fc / ((fb - fa) * (fb - fc))
                    + c * fa * fb / ((fc - fa) * (fc - fb))
            } else if fb != fa {
                b - fb * (b - a) / (fb - fa)
            } else {
                0.5 * (a + b)
            };

            let last_gap = if bisected { (b - c).abs() } else { (c - d).abs() };
            let reject = (candidate - (3.0 * a + b) / 4.0) * (candidate - b) > 0.0
                || (candidate - b).abs() >= 0.5 * last_gap
                || last_gap < self.tol;

            let s = if reject { 0.5 * (a + b) } else { candidate };
            bisected = reject;

            let fs = f(s);
            d = c;
            c = b;
            fc = fb;

            if fa * fs < 0.0 {
                b = s;
                fb = fs;
            } else {
                a = s;
                fa = fs;
            }
        }

        Err(BrentError::MaxIterations {
            current_best: b,
            f_value: fb,
            iterations: self.max_iter,
        })
    }
}

/// Root finding failures.
#[derive(Debug, Clone, Error)]
pub enum BrentError {
    /// `f(a)` and `f(b)` have the same sign.
    #[error("root not bracketed: f({a}) = {fa}, f({b}) = {fb}")]
    NotBracketed {
        /// Left endpoint
        a: f64,
        /// Right endpoint
        b: f64,
        /// `f(a)`
        fa: f64,
        /// `f(b)`
        fb: f64,
    },
    /// Iteration cap reached before the bracket closed.
    #[error("no convergence after {iterations} iterations, best estimate {current_best} (f = {f_value})")]
    MaxIterations {
        /// Best estimate so far
        current_best: f64,
        /// `f(current_best)`
        f_value: f64,
        /// Iterations performed
        iterations: usize,
    },
}

/// True when `g_old -> g_new` is a crossing in `direction`.
///
/// Landing exactly on zero counts; leaving an exact zero does not, so a
/// propagation that starts on an apsis does not report it again.
pub fn sign_change_detected(g_old: f64, g_new: f64, direction: EventDirection) -> bool {
    if g_old * g_new > 0.0 || g_old == 0.0 {
        return false;
    }
    if g_new == 0.0 {
        return true;
    }

    match direction {
        EventDirection::Rising => g_old < 0.0,
        EventDirection::Falling => g_old > 0.0,
        EventDirection::Any => true,
    }
}
