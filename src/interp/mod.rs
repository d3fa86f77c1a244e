//! Space/time interpolation and the observation operator.
//!
//! This module provides:
//! - **Time interpolation**: [`interp_column`], [`interp_cross_product`]
//!   and [`diagonal`] with {nearest, linear, cubic} kernels
//! - **Spatial sampling**: [`sample_at_points`] (nearest-cell only)
//! - **Observation operator**: [`interpolate_to_observations`], mapping a
//!   model field into observation space
//!
//! The observation operator runs in two steps, as the verification
//! workflow requires: first every observation's position is sampled
//! (one model time column per observation), then all columns are
//! interpolated onto all observation times and the diagonal of that
//! cross-product is extracted so observation k reads its own column at its
//! own time. Skipping the diagonal step silently pairs observations with
//! each other's times, which is why it is a named, tested operation here
//! rather than an implementation detail.
//!
//! # Example
//!
//! ```ignore
//! use coastval::interp::{interpolate_to_observations, TimeInterpMethod};
//!
//! let model_at_obs = interpolate_to_observations(&ssh, &track, TimeInterpMethod::Linear)?;
//! assert_eq!(model_at_obs.len(), track.len());
//! ```

mod space;
mod time;

pub use space::{sample_at_points, SampledSeries};
pub use time::{diagonal, interp_column, interp_cross_product, CubicSpline, TimeInterpMethod};

use crate::grid::{GridError, GriddedField};
use crate::obs::ObservationSeries;

/// Interpolate a model field onto an observation series.
///
/// Returns one model value per observation, co-indexed with the series:
/// the field sampled at the observation's nearest grid cell and
/// interpolated to the observation's own time with `method`. Out-of-range
/// times and masked cells surface as NaN (see [`TimeInterpMethod`] for the
/// per-method range semantics). Fields with an unreduced depth axis are
/// sampled at the surface.
pub fn interpolate_to_observations(
    field: &GriddedField,
    obs: &ObservationSeries,
    method: TimeInterpMethod,
) -> Result<Vec<f64>, GridError> {
    let sampled = sample_at_points(field, obs.longitudes(), obs.latitudes())?;
    let matrix = interp_cross_product(sampled.times(), sampled.columns(), obs.times(), method);
    Ok(diagonal(&matrix))
}

/// Run the observation operator and attach the result to the series.
///
/// The derived series is stored under `interp_<field name>`; the name is
/// returned for convenience.
pub fn attach_model_series(
    field: &GriddedField,
    obs: &mut ObservationSeries,
    method: TimeInterpMethod,
) -> Result<String, GridError> {
    let interpolated = interpolate_to_observations(field, obs, method)?;
    let name = format!("interp_{}", field.name());
    obs.insert_series(name.clone(), interpolated)
        .expect("operator output is co-indexed with the series");
    Ok(name)
}

// =============================================================================
// Tests
// =============================================================================
