//! Empirical and theoretical (Gaussian) cumulative distribution functions.
//!
//! Both kinds expose one interface: evaluation on a caller-chosen
//! discretized support, so a model CDF and an observation CDF can be
//! compared point-for-point on identical x values. [`shared_support`]
//! builds that discretization across the union of two distributions.
//!
//! Construction excludes non-finite samples up front (NaN is the mask
//! sentinel throughout the crate); a sample with nothing left is a typed
//! error rather than a silent degenerate distribution.

use std::cmp::Ordering;
use std::f64::consts::SQRT_2;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of support points used by the scoring layer.
pub const DEFAULT_SUPPORT_POINTS: usize = 1000;

/// Error type for CDF construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CdfError {
    /// Every sample value was NaN or infinite.
    #[error("sample contains no finite values")]
    EmptySample,
}

/// Which distribution family a [`Cdf`] represents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CdfKind {
    /// Rank-based step function through the sample itself.
    #[default]
    Empirical,
    /// Gaussian fitted to the sample mean and (population) variance.
    Theoretical,
}

/// A cumulative distribution function over a 1D sample.
///
/// Values are in [0, 1] and non-decreasing in x. The empirical form is the
/// classic order-statistic step: at the k-th sorted sample (0-indexed) the
/// CDF reads (k+1)/N. The theoretical form evaluates the closed-form
/// Gaussian CDF at the fitted mean/standard deviation.
#[derive(Clone, Debug)]
pub struct Cdf {
    kind: CdfKind,
    /// Finite samples, sorted ascending.
    sample: Vec<f64>,
    mean: f64,
    std_dev: f64,
}

impl Cdf {
    /// Build a CDF of the requested kind from a sample.
    ///
    /// Non-finite values are excluded first; an empty remainder is an
    /// error. Deterministic: equal inputs give equal CDFs.
    pub fn new(sample: &[f64], kind: CdfKind) -> Result<Self, CdfError> {
        let mut valid: Vec<f64> = sample.iter().copied().filter(|v| v.is_finite()).collect();
        if valid.is_empty() {
            return Err(CdfError::EmptySample);
        }
        valid.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let n = valid.len() as f64;
        let mean = valid.iter().sum::<f64>() / n;
        let variance = valid.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

        Ok(Self {
            kind,
            sample: valid,
            mean,
            std_dev: variance.sqrt(),
        })
    }

    /// Distribution family.
    pub fn kind(&self) -> CdfKind {
        self.kind
    }

    /// Number of finite samples behind the fit.
    pub fn sample_len(&self) -> usize {
        self.sample.len()
    }

    /// Sample mean.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation of the sample.
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Evaluate the CDF at one point.
    pub fn evaluate(&self, x: f64) -> f64 {
        match self.kind {
            CdfKind::Empirical => {
                // Count of samples <= x; at the k-th sorted sample this is
                // exactly (k+1)/N.
                let count = self.sample.partition_point(|&v| v <= x);
                count as f64 / self.sample.len() as f64
            }
            CdfKind::Theoretical => gaussian_cdf(x, self.mean, self.std_dev),
        }
    }

    /// Evaluate the CDF on a whole support.
    pub fn evaluate_on(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }

    /// The x-range this distribution effectively spans.
    ///
    /// Empirical: [min, max] of the sample. Theoretical: mean ± 5 sigma,
    /// beyond which the Gaussian CDF is saturated for scoring purposes.
    pub fn span(&self) -> (f64, f64) {
        match self.kind {
            CdfKind::Empirical => (self.sample[0], self.sample[self.sample.len() - 1]),
            CdfKind::Theoretical => (
                self.mean - 5.0 * self.std_dev,
                self.mean + 5.0 * self.std_dev,
            ),
        }
    }
}

/// Closed-form Gaussian CDF.
///
/// A vanishing standard deviation degenerates to the unit step at the
/// mean, consistent with the empirical step of a constant sample.
fn gaussian_cdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev <= f64::EPSILON {
        return if x >= mean { 1.0 } else { 0.0 };
    }
    0.5 * (1.0 + libm::erf((x - mean) / (std_dev * SQRT_2)))
}

/// Discretized support spanning the union of two distributions.
///
/// Evenly spaced, inclusive of both ends. A degenerate union (both
/// distributions collapse onto one point) gives a single-point support,
/// over which any squared-difference integral is zero.
pub fn shared_support(a: &Cdf, b: &Cdf, n_points: usize) -> Vec<f64> {
    let (a_lo, a_hi) = a.span();
    let (b_lo, b_hi) = b.span();
    let lo = a_lo.min(b_lo);
    let hi = a_hi.max(b_hi);
    if hi <= lo || n_points < 2 {
        return vec![lo];
    }
    let step = (hi - lo) / (n_points - 1) as f64;
    (0..n_points).map(|k| lo + step * k as f64).collect()
}

// =============================================================================
// Tests
// =============================================================================
