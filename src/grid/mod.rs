//! Curvilinear grid geometry, gridded fields and spatial selection.
//!
//! This module provides:
//! - **Grid geometry**: [`CurvilinearGrid`] with per-cell 2D lat/lon arrays
//! - **Gridded fields**: [`GriddedField`] with (time, depth, y, x) layout,
//!   depth reduction and index-list gathering
//! - **Nearest-point lookup**: [`nearest_index`] in degree space
//! - **Neighbourhood subsetting**: [`subset_by_radius`] (haversine, km) and
//!   [`subset_by_box`] (strict lon/lat bounds), dispatched by
//!   [`NeighbourhoodSpec`]
//!
//! # Example
//!
//! ```ignore
//! use coastval::grid::{CurvilinearGrid, GriddedField, NeighbourhoodSpec};
//!
//! let grid = CurvilinearGrid::new(nav_lat, nav_lon, ny, nx)?;
//! let ssh = GriddedField::new("ssh", grid, times, values)?;
//!
//! let nh = NeighbourhoodSpec::Radius { km: 30.0 }.subset(ssh.grid(), 5.3, 60.4);
//! let columns = ssh.gather_columns(nh.indices());
//! ```

mod field;
mod index;
mod neighbourhood;

pub use field::{CurvilinearGrid, GridError, GridIndex, GriddedField};
pub use index::{nearest_index, nearest_indices};
pub use neighbourhood::{
    haversine_km, subset_by_box, subset_by_radius, Neighbourhood, NeighbourhoodSpec,
    EARTH_RADIUS_KM,
};
