//! # coastval
//!
//! Observation-space verification for coastal ocean model output.
//!
//! This crate compares NEMO-style gridded model fields against scattered,
//! asynchronous observations (altimetry tracks, tide gauge records) and
//! provides the core building blocks of that comparison:
//!
//! - Curvilinear grid geometry, gridded fields and nearest-point lookup
//! - Neighbourhood subsetting (haversine radius or strict lon/lat box)
//! - Space/time interpolation and the observation operator
//!   (nearest-cell sampling, {nearest, linear, cubic} time kernels,
//!   diagonal extraction)
//! - Empirical and Gaussian CDFs with CRPS scoring
//! - The single-observation neighbourhood forecast (SONF) driver
//! - Deterministic comparison statistics (bias, MAE, RMSE, correlation)
//! - Variable-name mapping tables with structured load diagnostics
//!
//! File parsing (NetCDF, GESLA, EN4), plotting and CLI surfaces are
//! deliberately out of scope: data enters through typed constructors and
//! leaves as typed results.
//!
//! # Example
//!
//! ```
//! use coastval::grid::{CurvilinearGrid, GriddedField, NeighbourhoodSpec};
//! use coastval::obs::ObservationSeries;
//! use coastval::verify::{SonfScorer, SonfSummary};
//!
//! // A small constant sea-surface-height field.
//! let grid = CurvilinearGrid::rectilinear(&[5.0, 5.1, 5.2], &[60.0, 60.1]).unwrap();
//! let ssh = GriddedField::new("ssh", grid, vec![0.0, 3600.0], vec![0.5; 12]).unwrap();
//!
//! // One altimetry observation inside the domain.
//! let track = ObservationSeries::new(
//!     "ssh",
//!     vec![5.1],      // longitude
//!     vec![60.05],    // latitude
//!     vec![1800.0],   // time (s)
//!     vec![0.5],      // observed value
//! )
//! .unwrap();
//!
//! let scorer = SonfScorer::new(NeighbourhoodSpec::Radius { km: 50.0 });
//! let results = scorer.score_series(&ssh, &track);
//! assert_eq!(results.len(), track.len());
//! assert!(results[0].score.abs() < 1e-12);
//!
//! let summary = SonfSummary::from_results(&results);
//! assert_eq!(summary.n_scored, 1);
//! ```

pub mod grid;
pub mod interp;
pub mod obs;
pub mod stats;
pub mod verify;

// Re-export main types for convenience
pub use grid::{
    haversine_km, nearest_index, nearest_indices, subset_by_box, subset_by_radius,
    CurvilinearGrid, GridError, GridIndex, GriddedField, Neighbourhood, NeighbourhoodSpec,
    EARTH_RADIUS_KM,
};
pub use interp::{
    attach_model_series, diagonal, interp_column, interp_cross_product,
    interpolate_to_observations, sample_at_points, CubicSpline, SampledSeries, TimeInterpMethod,
};
pub use obs::{
    epoch_seconds, seconds_from_datetimes, MappingError, MappingReport, MappingTable,
    ObservationError, ObservationPoint, ObservationSeries, VariableMapping,
};
pub use stats::{
    crps, crps_on_support, error_series, nan_mean, nan_std, shared_support, Cdf, CdfError,
    CdfKind, ComparisonStats, DEFAULT_SUPPORT_POINTS,
};
pub use verify::{ComparisonResult, ScoreFailure, SonfConfig, SonfScorer, SonfSummary};
