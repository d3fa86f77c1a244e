//! Spatial neighbourhood subsetting around a centre point.
//!
//! Two interchangeable selection strategies:
//!
//! - **Radius mode**: great-circle (haversine) distance from the centre,
//!   keeping points strictly closer than a radius in kilometres.
//! - **Box mode**: a longitude/latitude box, keeping points strictly
//!   inside both bounds. Boundary points are excluded; this matters for
//!   which cells count as land-adjacent and is preserved exactly.
//!
//! The two modes keep their historical units: kilometres for the radius,
//! degrees for the box half-width. See [`NeighbourhoodSpec`]. Results are
//! index sets in row-major scan order, not masks; an empty set is a valid
//! state that the scoring layer turns into a per-observation failure.

use serde::{Deserialize, Serialize};

use super::field::{CurvilinearGrid, GridIndex};

/// Mean Earth radius in kilometres, as used by the haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// =============================================================================
// Distance
// =============================================================================

/// Great-circle distance between two (lon, lat) points in kilometres.
///
/// Haversine form: `d = 2R·asin(sqrt(sin²(Δφ/2) + cos φ₁ cos φ₂ sin²(Δλ/2)))`.
///
/// # Example
///
/// ```
/// use coastval::grid::haversine_km;
///
/// // One degree of latitude is ~111.19 km.
/// let d = haversine_km(0.0, 50.0, 0.0, 51.0);
/// assert!((d - 111.1949).abs() < 1e-3);
/// ```
pub fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    // Clamp against rounding noise before asin.
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

// =============================================================================
// Neighbourhood
// =============================================================================

/// A set of grid indices selected around a centre point.
///
/// Row-major scan order. May be empty (no grid point satisfied the spatial
/// relation); emptiness is detectable state, not an error, until the
/// scoring layer decides otherwise.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Neighbourhood {
    indices: Vec<GridIndex>,
}

impl Neighbourhood {
    /// Wrap an index list.
    pub fn from_indices(indices: Vec<GridIndex>) -> Self {
        Self { indices }
    }

    /// Cardinality of the index set.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True when no grid point was selected.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Selected indices in row-major scan order.
    pub fn indices(&self) -> &[GridIndex] {
        &self.indices
    }

    /// Consume into the index list.
    pub fn into_indices(self) -> Vec<GridIndex> {
        self.indices
    }
}

// =============================================================================
// Subsetting strategies
// =============================================================================

/// Neighbourhood selection strategy around an observation.
///
/// The size parameter keeps the dual units of the source tooling and is
/// deliberately not normalized, since unifying the units would silently
/// change which points are selected:
///
/// - [`NeighbourhoodSpec::Radius`] is a great-circle radius in
///   **kilometres**;
/// - [`NeighbourhoodSpec::BoundingBox`] is a half-width in **degrees**,
///   applied to both axes around the centre
///   (`lon ∈ (centre − w, centre + w)`, same for latitude, strict).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NeighbourhoodSpec {
    /// Haversine disc, radius in kilometres.
    Radius {
        /// Great-circle radius in kilometres.
        km: f64,
    },
    /// Axis-aligned lon/lat box, half-width in degrees.
    BoundingBox {
        /// Half-width in degrees on both axes.
        half_width_deg: f64,
    },
}

impl NeighbourhoodSpec {
    /// Select the neighbourhood of (centre_lon, centre_lat) on a grid.
    pub fn subset(
        &self,
        grid: &CurvilinearGrid,
        centre_lon: f64,
        centre_lat: f64,
    ) -> Neighbourhood {
        match *self {
            NeighbourhoodSpec::Radius { km } => {
                subset_by_radius(grid, centre_lon, centre_lat, km)
            }
            NeighbourhoodSpec::BoundingBox { half_width_deg } => subset_by_box(
                grid,
                (centre_lon - half_width_deg, centre_lon + half_width_deg),
                (centre_lat - half_width_deg, centre_lat + half_width_deg),
            ),
        }
    }
}

/// Select grid points strictly within `radius_km` of the centre.
pub fn subset_by_radius(
    grid: &CurvilinearGrid,
    centre_lon: f64,
    centre_lat: f64,
    radius_km: f64,
) -> Neighbourhood {
    let indices = grid
        .iter_points()
        .filter(|&(_, lon, lat)| haversine_km(centre_lon, centre_lat, lon, lat) < radius_km)
        .map(|(index, _, _)| index)
        .collect();
    Neighbourhood::from_indices(indices)
}

/// Select grid points strictly inside a lon/lat box.
///
/// Both bounds of both axes are strict: a point lying exactly on a bound
/// is excluded, so a zero-width box is always empty.
pub fn subset_by_box(
    grid: &CurvilinearGrid,
    lon_bounds: (f64, f64),
    lat_bounds: (f64, f64),
) -> Neighbourhood {
    let indices = grid
        .iter_points()
        .filter(|&(_, lon, lat)| {
            lon > lon_bounds.0 && lon < lon_bounds.1 && lat > lat_bounds.0 && lat < lat_bounds.1
        })
        .map(|(index, _, _)| index)
        .collect();
    Neighbourhood::from_indices(indices)
}

// =============================================================================
// Tests
// =============================================================================
