//! Probabilistic and deterministic comparison statistics.
//!
//! This module provides:
//! - **CDFs**: [`Cdf`] (empirical rank step or fitted Gaussian, selected by
//!   [`CdfKind`]) with [`shared_support`] for comparing two distributions
//!   on identical x values
//! - **CRPS**: [`crps`] and [`crps_on_support`], the Continuous Ranked
//!   Probability Score between two CDFs
//! - **Deterministic statistics**: [`ComparisonStats`] (bias, MAE, RMSE,
//!   correlation, covariance) and the NaN-aware helpers behind it
//!
//! # Example
//!
//! ```
//! use coastval::stats::{crps, Cdf, CdfKind};
//!
//! let model = Cdf::new(&[0.48, 0.52, 0.55], CdfKind::Empirical).unwrap();
//! let obs = Cdf::new(&[0.50], CdfKind::Empirical).unwrap();
//! assert!(crps(&model, &obs) >= 0.0);
//! ```

mod cdf;
mod crps;
mod metrics;

pub use cdf::{shared_support, Cdf, CdfError, CdfKind, DEFAULT_SUPPORT_POINTS};
pub use crps::{crps, crps_on_support};
pub use metrics::{error_series, nan_mean, nan_std, ComparisonStats};
