//! Summary statistics between observed and modelled series.
//!
//! Complements the probabilistic CRPS score with the classic deterministic
//! numbers reported in validation tables: bias, MAE, RMSE, correlation and
//! covariance. All statistics are computed over the pairs where both
//! series are finite; gaps (NaN) in either series drop the pair rather
//! than poisoning the result.

use std::fmt;

/// NaN-aware mean; NaN when no finite values exist.
pub fn nan_mean(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for &v in values {
        if v.is_finite() {
            sum += v;
            n += 1;
        }
    }
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// NaN-aware population standard deviation; NaN when no finite values.
pub fn nan_std(values: &[f64]) -> f64 {
    let mean = nan_mean(values);
    if mean.is_nan() {
        return f64::NAN;
    }
    let mut sum = 0.0;
    let mut n = 0usize;
    for &v in values {
        if v.is_finite() {
            sum += (v - mean) * (v - mean);
            n += 1;
        }
    }
    (sum / n as f64).sqrt()
}

/// Per-point error series: `model - observed`, NaN where either is NaN.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn error_series(model: &[f64], observed: &[f64]) -> Vec<f64> {
    assert_eq!(
        model.len(),
        observed.len(),
        "model and observed series must be co-indexed"
    );
    model
        .iter()
        .zip(observed)
        .map(|(&m, &o)| {
            if m.is_finite() && o.is_finite() {
                m - o
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Deterministic comparison statistics over paired series.
///
/// Sign convention: errors are `model - observed`, so positive bias means
/// the model overestimates.
#[derive(Clone, Copy, Debug)]
pub struct ComparisonStats {
    /// Number of finite pairs used.
    pub n_points: usize,
    /// Mean error.
    pub bias: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Root mean square error.
    pub rmse: f64,
    /// Pearson correlation coefficient.
    pub correlation: f64,
    /// Covariance (population) between the two series.
    pub covariance: f64,
}

impl ComparisonStats {
    /// Compute statistics between co-indexed model and observed series.
    ///
    /// Pairs with a NaN on either side are skipped. With no valid pairs,
    /// all statistics are NaN and `n_points` is 0; with zero variance on
    /// either side, the correlation is NaN.
    ///
    /// # Panics
    ///
    /// Panics if the slices differ in length.
    pub fn compute(model: &[f64], observed: &[f64]) -> Self {
        assert_eq!(
            model.len(),
            observed.len(),
            "model and observed series must be co-indexed"
        );

        let pairs: Vec<(f64, f64)> = model
            .iter()
            .zip(observed)
            .filter(|(m, o)| m.is_finite() && o.is_finite())
            .map(|(&m, &o)| (m, o))
            .collect();

        let n = pairs.len();
        if n == 0 {
            return Self {
                n_points: 0,
                bias: f64::NAN,
                mae: f64::NAN,
                rmse: f64::NAN,
                correlation: f64::NAN,
                covariance: f64::NAN,
            };
        }
        let nf = n as f64;

        let mut bias = 0.0;
        let mut mae = 0.0;
        let mut mse = 0.0;
        for &(m, o) in &pairs {
            let e = m - o;
            bias += e;
            mae += e.abs();
            mse += e * e;
        }
        bias /= nf;
        mae /= nf;
        let rmse = (mse / nf).sqrt();

        let mean_m = pairs.iter().map(|&(m, _)| m).sum::<f64>() / nf;
        let mean_o = pairs.iter().map(|&(_, o)| o).sum::<f64>() / nf;
        let mut covariance = 0.0;
        let mut var_m = 0.0;
        let mut var_o = 0.0;
        for &(m, o) in &pairs {
            covariance += (m - mean_m) * (o - mean_o);
            var_m += (m - mean_m) * (m - mean_m);
            var_o += (o - mean_o) * (o - mean_o);
        }
        covariance /= nf;
        var_m /= nf;
        var_o /= nf;

        let denom = (var_m * var_o).sqrt();
        let correlation = if denom > 1e-10 {
            covariance / denom
        } else {
            f64::NAN
        };

        Self {
            n_points: n,
            bias,
            mae,
            rmse,
            correlation,
            covariance,
        }
    }
}

impl fmt::Display for ComparisonStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={} bias={:.4} mae={:.4} rmse={:.4} corr={:.4} cov={:.4}",
            self.n_points, self.bias, self.mae, self.rmse, self.correlation, self.covariance
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
