//! Continuous Ranked Probability Score between two CDFs.
//!
//! CRPS is the integral over x of the squared difference between the
//! forecast CDF and the observation CDF. Here both CDFs are evaluated on
//! one shared discretized support and the integral is taken numerically
//! (trapezoidal rule), which reproduces the scoring behavior of the
//! source verification tooling. The score is non-negative and zero
//! exactly when the two CDFs agree on the whole support.

use super::cdf::{shared_support, Cdf, DEFAULT_SUPPORT_POINTS};

/// CRPS between a model CDF and an observation CDF.
///
/// The support spans the union of the two distributions with
/// [`DEFAULT_SUPPORT_POINTS`] samples. A degenerate union (both
/// distributions on one point) scores exactly 0.
///
/// # Example
///
/// ```
/// use coastval::stats::{crps, Cdf, CdfKind};
///
/// let model = Cdf::new(&[4.0, 6.0], CdfKind::Empirical).unwrap();
/// let obs = Cdf::new(&[5.0], CdfKind::Empirical).unwrap();
/// let score = crps(&model, &obs);
/// // Analytic CRPS for the two-member ensemble {4, 6} against 5 is 0.5.
/// assert!((score - 0.5).abs() < 1e-2);
/// ```
pub fn crps(model: &Cdf, obs: &Cdf) -> f64 {
    let xs = shared_support(model, obs, DEFAULT_SUPPORT_POINTS);
    let f_model = model.evaluate_on(&xs);
    let f_obs = obs.evaluate_on(&xs);
    crps_on_support(&xs, &f_model, &f_obs)
}

/// CRPS from two CDF value arrays already evaluated on a shared support.
///
/// Trapezoidal integration of the squared difference; supports with fewer
/// than two points integrate to 0.
///
/// # Panics
///
/// Panics if the three arrays differ in length.
pub fn crps_on_support(xs: &[f64], f_model: &[f64], f_obs: &[f64]) -> f64 {
    assert_eq!(xs.len(), f_model.len(), "support and model CDF must align");
    assert_eq!(xs.len(), f_obs.len(), "support and observation CDF must align");
    if xs.len() < 2 {
        return 0.0;
    }
    let sq = |k: usize| {
        let d = f_model[k] - f_obs[k];
        d * d
    };
    let mut integral = 0.0;
    for k in 0..xs.len() - 1 {
        integral += 0.5 * (sq(k) + sq(k + 1)) * (xs[k + 1] - xs[k]);
    }
    integral
}

// =============================================================================
// Tests
// =============================================================================
