//! Interpolation along a shared time axis.
//!
//! Three methods, selected by [`TimeInterpMethod`]:
//!
//! - **Nearest** always answers with the closest time sample, including
//!   beyond the ends of the axis. Equidistant targets take the earlier
//!   sample.
//! - **Linear** interpolates between the bracketing samples; targets
//!   strictly outside the axis yield NaN (no extrapolation).
//! - **Cubic** evaluates a natural cubic spline through all samples; it is
//!   exact at the knots and for linear data, degrades to linear for two
//!   samples, and also yields NaN outside the axis.
//!
//! NaN samples propagate: nearest/linear go NaN only where a NaN sample is
//! reached, while the spline's global coupling turns every interpolated
//! segment NaN. Exact knot hits always return the stored sample, whichever
//! method is used.
//!
//! The batched form [`interp_cross_product`] interpolates every column at
//! every target time; [`diagonal`] then pairs column k with target k. That
//! pairing step is load-bearing for the observation operator: each
//! observation's spatial sample must be read at that observation's own
//! time, in input order.
//!
//! All routines require a strictly ascending time axis
//! ([`crate::grid::GriddedField`] validates this at construction).

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Time-axis interpolation method identifier.
///
/// The identifiers deliberately mirror the method strings of common array
/// tooling ("nearest", "linear", "cubic"); spatial sampling is always
/// nearest-cell regardless of this choice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeInterpMethod {
    /// Closest sample, clamped at the axis ends.
    #[default]
    Nearest,
    /// Piecewise-linear between bracketing samples.
    Linear,
    /// Natural cubic spline through all samples.
    Cubic,
}

impl TimeInterpMethod {
    /// The method identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInterpMethod::Nearest => "nearest",
            TimeInterpMethod::Linear => "linear",
            TimeInterpMethod::Cubic => "cubic",
        }
    }
}

impl fmt::Display for TimeInterpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[inline]
fn debug_assert_ascending(times: &[f64]) {
    debug_assert!(
        times.windows(2).all(|w| w[1] > w[0]),
        "time axis must be strictly ascending"
    );
}

/// Insertion index of `t` in an ascending axis, or the exact match.
#[inline]
fn locate(times: &[f64], t: f64) -> Result<usize, usize> {
    times.binary_search_by(|probe| probe.partial_cmp(&t).unwrap_or(Ordering::Less))
}

// =============================================================================
// Scalar interpolation
// =============================================================================

/// Interpolate one time series at a single target time.
///
/// `times` and `values` are co-indexed; see the module docs for the
/// per-method range and NaN semantics. A non-finite target yields NaN.
///
/// # Panics
///
/// Panics if `times` and `values` differ in length.
pub fn interp_column(times: &[f64], values: &[f64], t_out: f64, method: TimeInterpMethod) -> f64 {
    assert_eq!(
        times.len(),
        values.len(),
        "time axis and value column must be co-indexed"
    );
    match method {
        TimeInterpMethod::Nearest => interp_nearest(times, values, t_out),
        TimeInterpMethod::Linear => interp_linear(times, values, t_out),
        TimeInterpMethod::Cubic => CubicSpline::new(times, values).eval(t_out),
    }
}

fn interp_nearest(times: &[f64], values: &[f64], t: f64) -> f64 {
    let n = times.len();
    if n == 0 || !t.is_finite() {
        return f64::NAN;
    }
    debug_assert_ascending(times);
    match locate(times, t) {
        Ok(k) => values[k],
        Err(0) => values[0],
        Err(k) if k == n => values[n - 1],
        Err(k) => {
            // Earlier sample wins a tie.
            if t - times[k - 1] <= times[k] - t {
                values[k - 1]
            } else {
                values[k]
            }
        }
    }
}

fn interp_linear(times: &[f64], values: &[f64], t: f64) -> f64 {
    let n = times.len();
    if n == 0 || !t.is_finite() {
        return f64::NAN;
    }
    debug_assert_ascending(times);
    if t < times[0] || t > times[n - 1] {
        return f64::NAN;
    }
    match locate(times, t) {
        Ok(k) => values[k],
        Err(k) => {
            let t0 = times[k - 1];
            let t1 = times[k];
            let dt = t1 - t0;
            let alpha = if dt > 1e-14 { (t - t0) / dt } else { 0.0 };
            values[k - 1] + alpha * (values[k] - values[k - 1])
        }
    }
}

// =============================================================================
// Natural cubic spline
// =============================================================================

/// Natural cubic spline over one value column.
///
/// Second derivatives vanish at both ends; the tridiagonal system for the
/// interior derivatives is solved with the Thomas algorithm. Construction
/// is O(n); evaluation is O(log n).
pub struct CubicSpline {
    times: Vec<f64>,
    values: Vec<f64>,
    /// Second derivatives at the knots (zero at both ends).
    m: Vec<f64>,
}

impl CubicSpline {
    /// Fit a spline through (times, values).
    ///
    /// Two samples give a straight line; a single sample only answers at
    /// its own time.
    ///
    /// # Panics
    ///
    /// Panics if the arrays differ in length.
    pub fn new(times: &[f64], values: &[f64]) -> Self {
        assert_eq!(
            times.len(),
            values.len(),
            "time axis and value column must be co-indexed"
        );
        debug_assert_ascending(times);
        let n = times.len();
        let mut m = vec![0.0; n];
        if n > 2 {
            // Interior system: h[i-1] m[i-1] + 2(h[i-1]+h[i]) m[i] + h[i] m[i+1] = rhs[i]
            let n_inner = n - 2;
            let mut diag = vec![0.0; n_inner];
            let mut rhs = vec![0.0; n_inner];
            for i in 1..n - 1 {
                let h0 = times[i] - times[i - 1];
                let h1 = times[i + 1] - times[i];
                diag[i - 1] = 2.0 * (h0 + h1);
                rhs[i - 1] =
                    6.0 * ((values[i + 1] - values[i]) / h1 - (values[i] - values[i - 1]) / h0);
            }
            // Thomas forward sweep (sub/super diagonals are the interval
            // widths).
            for i in 1..n_inner {
                let h = times[i + 1] - times[i];
                let w = h / diag[i - 1];
                diag[i] -= w * h;
                rhs[i] -= w * rhs[i - 1];
            }
            // Back substitution.
            m[n - 2] = rhs[n_inner - 1] / diag[n_inner - 1];
            for i in (0..n_inner - 1).rev() {
                let h = times[i + 2] - times[i + 1];
                m[i + 1] = (rhs[i] - h * m[i + 2]) / diag[i];
            }
        }
        Self {
            times: times.to_vec(),
            values: values.to_vec(),
            m,
        }
    }

    /// Evaluate at `t`; NaN strictly outside the fitted range.
    pub fn eval(&self, t: f64) -> f64 {
        let n = self.times.len();
        if n == 0 || !t.is_finite() {
            return f64::NAN;
        }
        if n == 1 {
            return if t == self.times[0] {
                self.values[0]
            } else {
                f64::NAN
            };
        }
        if t < self.times[0] || t > self.times[n - 1] {
            return f64::NAN;
        }
        let k = match locate(&self.times, t) {
            Ok(k) => return self.values[k],
            Err(k) => k - 1,
        };
        let h = self.times[k + 1] - self.times[k];
        let s = self.times[k + 1] - t;
        let u = t - self.times[k];
        self.m[k] * s * s * s / (6.0 * h)
            + self.m[k + 1] * u * u * u / (6.0 * h)
            + (self.values[k] / h - self.m[k] * h / 6.0) * s
            + (self.values[k + 1] / h - self.m[k + 1] * h / 6.0) * u
    }
}

// =============================================================================
// Batched interpolation and diagonal extraction
// =============================================================================

/// Interpolate every column at every target time.
///
/// Returns the full cross-product matrix: `out[p][s]` is column `p`
/// evaluated at `t_outs[s]`. Spline construction happens once per column.
pub fn interp_cross_product(
    times: &[f64],
    columns: &[Vec<f64>],
    t_outs: &[f64],
    method: TimeInterpMethod,
) -> Vec<Vec<f64>> {
    columns
        .iter()
        .map(|column| match method {
            TimeInterpMethod::Cubic => {
                let spline = CubicSpline::new(times, column);
                t_outs.iter().map(|&t| spline.eval(t)).collect()
            }
            _ => t_outs
                .iter()
                .map(|&t| interp_column(times, column, t, method))
                .collect(),
        })
        .collect()
}

/// Extract the diagonal of a square cross-product matrix.
///
/// Pairs each column with its own interpolation slot, in input order:
/// `out[k] = matrix[k][k]`. This is the correctness-critical step after
/// [`interp_cross_product`] when columns and target times are co-indexed
/// observations.
///
/// # Panics
///
/// Panics if the matrix is not square.
pub fn diagonal(matrix: &[Vec<f64>]) -> Vec<f64> {
    let n = matrix.len();
    matrix
        .iter()
        .enumerate()
        .map(|(k, row)| {
            assert_eq!(row.len(), n, "cross-product matrix must be square");
            row[k]
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
