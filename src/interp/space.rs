//! Spatial sampling of gridded fields at scattered points.
//!
//! Space is always nearest-cell: each target point reads the time series
//! of its nearest grid cell in degree space, with no smoothing or kernel
//! averaging. The "linear"/"cubic" method identifiers apply to the time
//! axis only.

use crate::grid::{nearest_indices, GridError, GridIndex, GriddedField};

/// A model field sampled at scattered points: one time column per point.
///
/// Columns are co-indexed with the sampling targets and share the field's
/// time axis.
#[derive(Clone, Debug)]
pub struct SampledSeries {
    indices: Vec<GridIndex>,
    times: Vec<f64>,
    columns: Vec<Vec<f64>>,
}

impl SampledSeries {
    /// Grid index chosen for each target point.
    pub fn indices(&self) -> &[GridIndex] {
        &self.indices
    }

    /// Shared time axis (seconds).
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// One time column per target point, in target order.
    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    /// Number of sampled points.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when no points were sampled.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Sample a field at the nearest grid cell of each (lon, lat) target.
///
/// Fields that still carry a depth axis are sampled at the surface level
/// (index 0); pre-slice with [`GriddedField::select_depth`] for anything
/// else. The only failure mode is an empty grid.
///
/// # Panics
///
/// Panics if `lons` and `lats` differ in length.
pub fn sample_at_points(
    field: &GriddedField,
    lons: &[f64],
    lats: &[f64],
) -> Result<SampledSeries, GridError> {
    let surface;
    let field = if field.is_depth_reduced() {
        field
    } else {
        log::debug!(
            "field '{}' has {} depth levels; sampling the surface",
            field.name(),
            field.nz()
        );
        surface = field.surface();
        &surface
    };

    let indices = nearest_indices(field.grid(), lons, lats)?;
    let columns = field.gather_columns(&indices);
    Ok(SampledSeries {
        indices,
        times: field.times().to_vec(),
        columns,
    })
}
