//! Gridded model variables on curvilinear lat/lon meshes.
//!
//! A [`CurvilinearGrid`] holds the 2D latitude/longitude arrays of a
//! structured (y, x) mesh whose coordinate lines need not follow the
//! geographic axes (NEMO-style nav_lat/nav_lon). A [`GriddedField`] binds a
//! named variable with a (time, depth, y, x) layout to such a grid, with
//! values fully materialized in memory. NaN is the mask sentinel: land or
//! otherwise invalid cells carry NaN and are excluded from statistics
//! downstream.
//!
//! # Example
//!
//! ```
//! use coastval::grid::{CurvilinearGrid, GriddedField};
//!
//! // A 2x3 regular mesh expressed as a (degenerate) curvilinear grid.
//! let grid = CurvilinearGrid::rectilinear(&[0.0, 1.0, 2.0], &[50.0, 51.0]).unwrap();
//! assert_eq!((grid.ny(), grid.nx()), (2, 3));
//!
//! let times = vec![0.0, 3600.0];
//! let values = vec![1.0; 2 * 2 * 3];
//! let field = GriddedField::new("ssh", grid, times, values).unwrap();
//! assert_eq!(field.value(1, 0, 2), 1.0);
//! ```

use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

/// Error type for grid and field construction/lookup.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    /// The grid has no points at all.
    #[error("grid contains no points")]
    EmptyGrid,

    /// A coordinate array does not match the declared (ny, nx) shape.
    #[error("coordinate array has {actual} entries, expected ny*nx = {ny}*{nx}")]
    CoordinateShape {
        /// Number of grid rows.
        ny: usize,
        /// Number of grid columns.
        nx: usize,
        /// Length of the offending array.
        actual: usize,
    },

    /// The value array does not match the field layout.
    #[error("value array has {actual} entries, expected nt*nz*ny*nx = {expected}")]
    ValueShape {
        /// Expected flat length.
        expected: usize,
        /// Length of the supplied array.
        actual: usize,
    },

    /// The time axis is empty.
    #[error("field has an empty time axis")]
    EmptyTimeAxis,

    /// The time axis is not strictly increasing (or holds a non-finite
    /// value).
    #[error("time axis not strictly increasing at step {index}")]
    NonMonotonicTime {
        /// First offending step.
        index: usize,
    },

    /// A depth level index is outside the vertical axis.
    #[error("depth level {index} out of range for {nz} levels")]
    DepthOutOfRange {
        /// Requested level.
        index: usize,
        /// Number of levels on the field.
        nz: usize,
    },
}

// =============================================================================
// Grid geometry
// =============================================================================

/// A (y, x) index pair into a 2D grid.
///
/// `j` is the row (y) index, `i` the column (x) index, following the NEMO
/// convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridIndex {
    /// Row (y) index.
    pub j: usize,
    /// Column (x) index.
    pub i: usize,
}

impl GridIndex {
    /// Create an index pair.
    #[inline]
    pub const fn new(j: usize, i: usize) -> Self {
        Self { j, i }
    }
}

impl std::fmt::Display for GridIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(j={}, i={})", self.j, self.i)
    }
}

/// 2D curvilinear grid geometry: per-cell latitude/longitude arrays.
///
/// Coordinates are stored flat in row-major (y, x) order. Longitudes are in
/// degrees east, latitudes in degrees north; no wrapping or normalization is
/// applied (the caller supplies coordinates in a consistent convention, as
/// the source model does).
#[derive(Clone, Debug)]
pub struct CurvilinearGrid {
    latitude: Vec<f64>,
    longitude: Vec<f64>,
    ny: usize,
    nx: usize,
}

impl CurvilinearGrid {
    /// Create a grid from flat row-major coordinate arrays.
    ///
    /// Both arrays must have exactly `ny * nx` entries.
    pub fn new(
        latitude: Vec<f64>,
        longitude: Vec<f64>,
        ny: usize,
        nx: usize,
    ) -> Result<Self, GridError> {
        let expected = ny * nx;
        if latitude.len() != expected {
            return Err(GridError::CoordinateShape {
                ny,
                nx,
                actual: latitude.len(),
            });
        }
        if longitude.len() != expected {
            return Err(GridError::CoordinateShape {
                ny,
                nx,
                actual: longitude.len(),
            });
        }
        Ok(Self {
            latitude,
            longitude,
            ny,
            nx,
        })
    }

    /// Build the 2D product mesh of 1D longitude/latitude axes.
    ///
    /// Convenience for regular grids, which the curvilinear representation
    /// subsumes: row j has latitude `lat_axis[j]` everywhere, column i has
    /// longitude `lon_axis[i]` everywhere.
    pub fn rectilinear(lon_axis: &[f64], lat_axis: &[f64]) -> Result<Self, GridError> {
        let ny = lat_axis.len();
        let nx = lon_axis.len();
        let mut latitude = Vec::with_capacity(ny * nx);
        let mut longitude = Vec::with_capacity(ny * nx);
        for &lat in lat_axis {
            for &lon in lon_axis {
                latitude.push(lat);
                longitude.push(lon);
            }
        }
        Self::new(latitude, longitude, ny, nx)
    }

    /// Number of rows (y).
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Number of columns (x).
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Total number of grid points.
    #[inline]
    pub fn len(&self) -> usize {
        self.ny * self.nx
    }

    /// True when the grid has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Latitude at (j, i).
    #[inline]
    pub fn lat(&self, j: usize, i: usize) -> f64 {
        self.latitude[j * self.nx + i]
    }

    /// Longitude at (j, i).
    #[inline]
    pub fn lon(&self, j: usize, i: usize) -> f64 {
        self.longitude[j * self.nx + i]
    }

    /// Flat row-major latitude array.
    pub fn latitudes(&self) -> &[f64] {
        &self.latitude
    }

    /// Flat row-major longitude array.
    pub fn longitudes(&self) -> &[f64] {
        &self.longitude
    }

    /// Iterate all (index, lon, lat) triples in row-major order.
    pub fn iter_points(&self) -> impl Iterator<Item = (GridIndex, f64, f64)> + '_ {
        (0..self.ny).flat_map(move |j| {
            (0..self.nx).map(move |i| (GridIndex::new(j, i), self.lon(j, i), self.lat(j, i)))
        })
    }
}

// =============================================================================
// Gridded field
// =============================================================================

/// A named model variable on a curvilinear grid, materialized in memory.
///
/// Layout is (time, depth, y, x) row-major; surface-only fields have a
/// single implicit depth level. The time axis is in seconds (any fixed
/// epoch; see [`crate::obs::epoch_seconds`] for chrono conversion) and must
/// be non-empty. Scoring and observation-operator routines require a
/// depth-reduced field; use [`GriddedField::surface`] or
/// [`GriddedField::select_depth`] first.
#[derive(Clone, Debug)]
pub struct GriddedField {
    name: String,
    grid: CurvilinearGrid,
    times: Vec<f64>,
    depths: Option<Vec<f64>>,
    values: Vec<f64>,
    nt: usize,
    nz: usize,
}

impl GriddedField {
    /// Create a depth-reduced (time, y, x) field.
    ///
    /// `values` is flat row-major with `times.len() * ny * nx` entries.
    pub fn new(
        name: impl Into<String>,
        grid: CurvilinearGrid,
        times: Vec<f64>,
        values: Vec<f64>,
    ) -> Result<Self, GridError> {
        Self::build(name.into(), grid, times, None, values)
    }

    /// Create a (time, depth, y, x) field with an explicit vertical axis.
    ///
    /// `values` is flat row-major with
    /// `times.len() * depths.len() * ny * nx` entries.
    pub fn new_4d(
        name: impl Into<String>,
        grid: CurvilinearGrid,
        times: Vec<f64>,
        depths: Vec<f64>,
        values: Vec<f64>,
    ) -> Result<Self, GridError> {
        Self::build(name.into(), grid, times, Some(depths), values)
    }

    fn build(
        name: String,
        grid: CurvilinearGrid,
        times: Vec<f64>,
        depths: Option<Vec<f64>>,
        values: Vec<f64>,
    ) -> Result<Self, GridError> {
        if grid.is_empty() {
            return Err(GridError::EmptyGrid);
        }
        if times.is_empty() {
            return Err(GridError::EmptyTimeAxis);
        }
        // Time interpolation binary-searches this axis; it must be clean.
        if !times[0].is_finite() {
            return Err(GridError::NonMonotonicTime { index: 0 });
        }
        if let Some(k) = times.windows(2).position(|w| !(w[1] > w[0] && w[1].is_finite())) {
            return Err(GridError::NonMonotonicTime { index: k + 1 });
        }
        let nt = times.len();
        let nz = depths.as_ref().map_or(1, Vec::len);
        let expected = nt * nz * grid.len();
        if values.len() != expected {
            return Err(GridError::ValueShape {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            name,
            grid,
            times,
            depths,
            values,
            nt,
            nz,
        })
    }

    /// Variable name (canonical, post-mapping).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grid geometry.
    pub fn grid(&self) -> &CurvilinearGrid {
        &self.grid
    }

    /// Time axis in seconds.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Depth axis, if the field carries one.
    pub fn depths(&self) -> Option<&[f64]> {
        self.depths.as_deref()
    }

    /// Number of time steps.
    #[inline]
    pub fn nt(&self) -> usize {
        self.nt
    }

    /// Number of depth levels (1 for depth-reduced fields).
    #[inline]
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// Number of grid rows.
    #[inline]
    pub fn ny(&self) -> usize {
        self.grid.ny()
    }

    /// Number of grid columns.
    #[inline]
    pub fn nx(&self) -> usize {
        self.grid.nx()
    }

    /// True when the field has a single (possibly implicit) depth level.
    ///
    /// Scoring requires this; callers with full 3D fields pre-slice via
    /// [`GriddedField::select_depth`].
    #[inline]
    pub fn is_depth_reduced(&self) -> bool {
        self.nz == 1
    }

    #[inline]
    fn flat_index(&self, t: usize, k: usize, j: usize, i: usize) -> usize {
        ((t * self.nz + k) * self.grid.ny() + j) * self.grid.nx() + i
    }

    /// Value at (t, j, i) on a depth-reduced field.
    ///
    /// # Panics
    ///
    /// Panics if the field still has multiple depth levels or any index is
    /// out of range.
    #[inline]
    pub fn value(&self, t: usize, j: usize, i: usize) -> f64 {
        assert!(
            self.is_depth_reduced(),
            "value() requires a depth-reduced field; call surface() or select_depth() first"
        );
        self.values[self.flat_index(t, 0, j, i)]
    }

    /// Value at (t, k, j, i) with an explicit depth level.
    #[inline]
    pub fn value_at_depth(&self, t: usize, k: usize, j: usize, i: usize) -> f64 {
        self.values[self.flat_index(t, k, j, i)]
    }

    /// Extract one depth level as a new depth-reduced field.
    pub fn select_depth(&self, level: usize) -> Result<GriddedField, GridError> {
        if level >= self.nz {
            return Err(GridError::DepthOutOfRange {
                index: level,
                nz: self.nz,
            });
        }
        let ny = self.grid.ny();
        let nx = self.grid.nx();
        let mut values = Vec::with_capacity(self.nt * ny * nx);
        for t in 0..self.nt {
            let start = self.flat_index(t, level, 0, 0);
            values.extend_from_slice(&self.values[start..start + ny * nx]);
        }
        Ok(GriddedField {
            name: self.name.clone(),
            grid: self.grid.clone(),
            times: self.times.clone(),
            depths: None,
            values,
            nt: self.nt,
            nz: 1,
        })
    }

    /// Extract the surface level (depth index 0).
    pub fn surface(&self) -> GriddedField {
        // Level 0 always exists: nz >= 1 by construction.
        self.select_depth(0).unwrap_or_else(|_| self.clone())
    }

    /// Time series of values at one grid point (depth-reduced fields).
    pub fn time_column(&self, index: GridIndex) -> Vec<f64> {
        (0..self.nt)
            .map(|t| self.value(t, index.j, index.i))
            .collect()
    }

    /// Gather the time series at each of a list of grid points.
    ///
    /// Supports the index-list selection required by neighbourhood scoring:
    /// the result has one column (length `nt`) per requested point, in
    /// request order.
    pub fn gather_columns(&self, indices: &[GridIndex]) -> Vec<Vec<f64>> {
        indices.iter().map(|&ix| self.time_column(ix)).collect()
    }

    /// True when the cell is masked (NaN at the first time step).
    ///
    /// This is the grid-masking signal: land and otherwise invalid cells
    /// carry NaN values.
    pub fn is_masked(&self, index: GridIndex) -> bool {
        self.value_at_depth(0, 0, index.j, index.i).is_nan()
    }

    /// Fraction of masked cells at the first time step and surface level.
    pub fn masked_fraction(&self) -> f64 {
        let total = self.grid.len();
        let masked = (0..self.grid.ny())
            .flat_map(|j| (0..self.grid.nx()).map(move |i| GridIndex::new(j, i)))
            .filter(|&ix| self.is_masked(ix))
            .count();
        masked as f64 / total as f64
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn small_field() -> GriddedField {
        let grid = CurvilinearGrid::rectilinear(&[0.0, 1.0, 2.0], &[50.0, 51.0]).unwrap();
        let times = vec![0.0, 100.0];
        // values[t][j][i] = 100*t + 10*j + i
        let mut values = Vec::new();
        for t in 0..2 {
            for j in 0..2 {
                for i in 0..3 {
                    values.push((100 * t + 10 * j + i) as f64);
                }
            }
        }
        GriddedField::new("ssh", grid, times, values).unwrap()
    }

    #[test]
    fn test_rectilinear_layout() {
        let grid = CurvilinearGrid::rectilinear(&[0.0, 1.0, 2.0], &[50.0, 51.0]).unwrap();
        assert_eq!(grid.ny(), 2);
        assert_eq!(grid.nx(), 3);
        assert_eq!(grid.lat(0, 2), 50.0);
        assert_eq!(grid.lat(1, 0), 51.0);
        assert_eq!(grid.lon(1, 2), 2.0);
    }

    #[test]
    fn test_coordinate_shape_rejected() {
        let err = CurvilinearGrid::new(vec![0.0; 5], vec![0.0; 6], 2, 3).unwrap_err();
        assert!(matches!(err, GridError::CoordinateShape { actual: 5, .. }));
    }

    #[test]
    fn test_value_layout() {
        let field = small_field();
        assert_eq!(field.value(0, 0, 0), 0.0);
        assert_eq!(field.value(0, 1, 2), 12.0);
        assert_eq!(field.value(1, 1, 1), 111.0);
    }

    #[test]
    fn test_value_shape_rejected() {
        let grid = CurvilinearGrid::rectilinear(&[0.0, 1.0], &[50.0]).unwrap();
        let err = GriddedField::new("ssh", grid, vec![0.0], vec![1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            GridError::ValueShape {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_empty_time_axis_rejected() {
        let grid = CurvilinearGrid::rectilinear(&[0.0], &[50.0]).unwrap();
        let err = GriddedField::new("ssh", grid, vec![], vec![]).unwrap_err();
        assert_eq!(err, GridError::EmptyTimeAxis);
    }

    #[test]
    fn test_non_monotonic_time_axis_rejected() {
        let grid = CurvilinearGrid::rectilinear(&[0.0], &[50.0]).unwrap();
        let err = GriddedField::new(
            "ssh",
            grid.clone(),
            vec![0.0, 10.0, 10.0],
            vec![1.0, 2.0, 3.0],
        )
        .unwrap_err();
        assert_eq!(err, GridError::NonMonotonicTime { index: 2 });

        let err =
            GriddedField::new("ssh", grid, vec![0.0, f64::NAN], vec![1.0, 2.0]).unwrap_err();
        assert_eq!(err, GridError::NonMonotonicTime { index: 1 });
    }

    #[test]
    fn test_time_column_and_gather() {
        let field = small_field();
        assert_eq!(field.time_column(GridIndex::new(1, 2)), vec![12.0, 112.0]);
        let cols = field.gather_columns(&[GridIndex::new(0, 0), GridIndex::new(1, 1)]);
        assert_eq!(cols, vec![vec![0.0, 100.0], vec![11.0, 111.0]]);
    }

    #[test]
    fn test_select_depth() {
        let grid = CurvilinearGrid::rectilinear(&[0.0, 1.0], &[50.0]).unwrap();
        let times = vec![0.0, 1.0];
        let depths = vec![0.0, 10.0, 20.0];
        // values[t][k][j][i] = 100*t + 10*k + i
        let mut values = Vec::new();
        for t in 0..2 {
            for k in 0..3 {
                for i in 0..2 {
                    values.push((100 * t + 10 * k + i) as f64);
                }
            }
        }
        let field = GriddedField::new_4d("temperature", grid, times, depths, values).unwrap();
        assert!(!field.is_depth_reduced());

        let mid = field.select_depth(1).unwrap();
        assert!(mid.is_depth_reduced());
        assert_eq!(mid.value(0, 0, 1), 11.0);
        assert_eq!(mid.value(1, 0, 0), 110.0);

        let surface = field.surface();
        assert_eq!(surface.value(1, 0, 1), 101.0);

        let err = field.select_depth(3).unwrap_err();
        assert_eq!(err, GridError::DepthOutOfRange { index: 3, nz: 3 });
    }

    #[test]
    fn test_mask_signal() {
        let grid = CurvilinearGrid::rectilinear(&[0.0, 1.0], &[50.0]).unwrap();
        let values = vec![1.0, f64::NAN];
        let field = GriddedField::new("ssh", grid, vec![0.0], values).unwrap();
        assert!(!field.is_masked(GridIndex::new(0, 0)));
        assert!(field.is_masked(GridIndex::new(0, 1)));
        assert!((field.masked_fraction() - 0.5).abs() < 1e-12);
    }
}
