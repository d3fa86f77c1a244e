//! Nearest-grid-point lookup on curvilinear meshes.
//!
//! Finds the (j, i) index minimizing squared Euclidean distance in
//! (lon, lat) degree space. This is deliberately not a great-circle
//! distance: for the regional domains the toolkit targets, the flat
//! approximation is accurate enough and considerably cheaper, and it
//! reproduces the selection behavior of the source model tooling exactly.
//! Callers needing metric distances use the neighbourhood subsetter
//! instead.
//!
//! The search always returns an index when the grid is non-empty, however
//! far away the target lies; sanity-checking the returned distance is the
//! caller's responsibility.

use super::field::{CurvilinearGrid, GridError, GridIndex};

/// Squared degree-space distance between two (lon, lat) points.
#[inline]
fn degree_dist2(lon_a: f64, lat_a: f64, lon_b: f64, lat_b: f64) -> f64 {
    let dlon = lon_a - lon_b;
    let dlat = lat_a - lat_b;
    dlon * dlon + dlat * dlat
}

/// Find the grid point nearest to (lon, lat) in degree space.
///
/// Ties resolve to the first index in row-major flattening order. The only
/// failure mode is an empty grid.
///
/// # Example
///
/// ```
/// use coastval::grid::{nearest_index, CurvilinearGrid, GridIndex};
///
/// let grid = CurvilinearGrid::rectilinear(&[0.0, 1.0, 2.0], &[50.0, 51.0]).unwrap();
/// let ix = nearest_index(&grid, 1.2, 50.9).unwrap();
/// assert_eq!(ix, GridIndex::new(1, 1));
/// ```
pub fn nearest_index(grid: &CurvilinearGrid, lon: f64, lat: f64) -> Result<GridIndex, GridError> {
    if grid.is_empty() {
        return Err(GridError::EmptyGrid);
    }
    let mut best = GridIndex::new(0, 0);
    let mut best_dist2 = f64::INFINITY;
    for (index, glon, glat) in grid.iter_points() {
        let d2 = degree_dist2(glon, glat, lon, lat);
        // Strict comparison keeps the first minimum in flattening order.
        if d2 < best_dist2 {
            best = index;
            best_dist2 = d2;
        }
    }
    Ok(best)
}

/// Find the nearest grid point for each of a set of targets.
///
/// Each target is looked up independently; the result is co-indexed with
/// the inputs.
///
/// # Panics
///
/// Panics if `lons` and `lats` differ in length.
pub fn nearest_indices(
    grid: &CurvilinearGrid,
    lons: &[f64],
    lats: &[f64],
) -> Result<Vec<GridIndex>, GridError> {
    assert_eq!(
        lons.len(),
        lats.len(),
        "target longitude/latitude arrays must be co-indexed"
    );
    lons.iter()
        .zip(lats)
        .map(|(&lon, &lat)| nearest_index(grid, lon, lat))
        .collect()
}
