//! Observation series: scattered, asynchronous point measurements.
//!
//! This module provides:
//! - **[`ObservationPoint`]**: one scalar measurement at (lon, lat, time)
//! - **[`ObservationSeries`]**: co-indexed arrays of positions, times and
//!   values, with named derived series (e.g. interpolated model values)
//! - **[`MappingTable`]**: configuration-driven canonicalization of source
//!   variable names with structured diagnostics
//!
//! Series are conventionally ordered by time (altimetry tracks and gauge
//! records arrive that way) but scoring treats every observation
//! independently, so ordering is a convention, not a requirement;
//! [`ObservationSeries::sort_by_time`] restores it when needed.
//!
//! Times are f64 seconds since a fixed epoch shared with the model field's
//! time axis; [`epoch_seconds`] converts chrono UTC timestamps.
//!
//! # Example
//!
//! ```
//! use coastval::obs::ObservationSeries;
//!
//! let obs = ObservationSeries::new(
//!     "ssh",
//!     vec![5.31, 5.35],       // longitude
//!     vec![60.40, 60.42],     // latitude
//!     vec![0.0, 3600.0],      // time (s)
//!     vec![0.52, 0.48],       // observed values
//! )
//! .unwrap();
//! assert_eq!(obs.len(), 2);
//! assert_eq!(obs.point(1).value, 0.48);
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::stats::{nan_mean, nan_std};

mod mapping;

pub use mapping::{MappingError, MappingReport, MappingTable, VariableMapping};

// =============================================================================
// Errors
// =============================================================================

/// Error type for observation-series construction and access.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObservationError {
    /// A co-indexed array has the wrong length.
    #[error("array '{what}' has {actual} entries, expected {expected}")]
    LengthMismatch {
        /// Which array is inconsistent.
        what: &'static str,
        /// Expected number of observations.
        expected: usize,
        /// Actual array length.
        actual: usize,
    },

    /// A derived series name is not present.
    #[error("series '{0}' not found")]
    UnknownSeries(String),
}

// =============================================================================
// Observation types
// =============================================================================

/// A single scalar measurement at a geographic position and time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObservationPoint {
    /// Longitude in degrees east.
    pub longitude: f64,
    /// Latitude in degrees north.
    pub latitude: f64,
    /// Time in seconds since the epoch shared with the model field.
    pub time: f64,
    /// Observed value (NaN marks a gap).
    pub value: f64,
}

/// Co-indexed observation arrays with named derived series.
///
/// The primary variable (named at construction) holds the observed values;
/// derived series of the same length can be attached under other names,
/// most commonly the observation-operator output under
/// `interp_<variable>`.
#[derive(Clone, Debug)]
pub struct ObservationSeries {
    name: String,
    longitudes: Vec<f64>,
    latitudes: Vec<f64>,
    times: Vec<f64>,
    values: Vec<f64>,
    derived: HashMap<String, Vec<f64>>,
}

impl ObservationSeries {
    /// Create a series from co-indexed arrays.
    ///
    /// All four arrays must have equal length (which may be zero).
    pub fn new(
        name: impl Into<String>,
        longitudes: Vec<f64>,
        latitudes: Vec<f64>,
        times: Vec<f64>,
        values: Vec<f64>,
    ) -> Result<Self, ObservationError> {
        let expected = longitudes.len();
        let check = |what: &'static str, actual: usize| -> Result<(), ObservationError> {
            if actual != expected {
                Err(ObservationError::LengthMismatch {
                    what,
                    expected,
                    actual,
                })
            } else {
                Ok(())
            }
        };
        check("latitude", latitudes.len())?;
        check("time", times.len())?;
        check("value", values.len())?;
        Ok(Self {
            name: name.into(),
            longitudes,
            latitudes,
            times,
            values,
            derived: HashMap::new(),
        })
    }

    /// Create a series from a list of points.
    pub fn from_points(name: impl Into<String>, points: &[ObservationPoint]) -> Self {
        Self {
            name: name.into(),
            longitudes: points.iter().map(|p| p.longitude).collect(),
            latitudes: points.iter().map(|p| p.latitude).collect(),
            times: points.iter().map(|p| p.time).collect(),
            values: points.iter().map(|p| p.value).collect(),
            derived: HashMap::new(),
        }
    }

    /// Name of the primary observed variable.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of observations.
    #[inline]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// True when the series holds no observations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Longitudes, co-indexed.
    pub fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    /// Latitudes, co-indexed.
    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    /// Times in seconds, co-indexed.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Primary observed values, co-indexed.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The k-th observation as a point.
    ///
    /// # Panics
    ///
    /// Panics if `k` is out of range.
    pub fn point(&self, k: usize) -> ObservationPoint {
        ObservationPoint {
            longitude: self.longitudes[k],
            latitude: self.latitudes[k],
            time: self.times[k],
            value: self.values[k],
        }
    }

    /// Iterate observations in stored order.
    pub fn iter_points(&self) -> impl Iterator<Item = ObservationPoint> + '_ {
        (0..self.len()).map(|k| self.point(k))
    }

    /// Attach a derived series (same length as the observations).
    ///
    /// Replaces any previous series of the same name.
    pub fn insert_series(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), ObservationError> {
        if values.len() != self.len() {
            return Err(ObservationError::LengthMismatch {
                what: "derived series",
                expected: self.len(),
                actual: values.len(),
            });
        }
        self.derived.insert(name.into(), values);
        Ok(())
    }

    /// Look up a derived series by name.
    pub fn series(&self, name: &str) -> Result<&[f64], ObservationError> {
        self.derived
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| ObservationError::UnknownSeries(name.to_string()))
    }

    /// Names of attached derived series, in arbitrary order.
    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.derived.keys().map(String::as_str)
    }

    /// NaN-aware mean of the primary values.
    pub fn mean(&self) -> f64 {
        nan_mean(&self.values)
    }

    /// NaN-aware standard deviation (population) of the primary values.
    pub fn std_dev(&self) -> f64 {
        nan_std(&self.values)
    }

    /// Re-order all arrays (and derived series) by ascending time.
    ///
    /// Stable: equal times keep their relative order.
    pub fn sort_by_time(&mut self) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| {
            self.times[a]
                .partial_cmp(&self.times[b])
                .unwrap_or(Ordering::Equal)
        });

        let permute = |xs: &[f64]| -> Vec<f64> { order.iter().map(|&k| xs[k]).collect() };
        self.longitudes = permute(&self.longitudes);
        self.latitudes = permute(&self.latitudes);
        self.times = permute(&self.times);
        self.values = permute(&self.values);
        for series in self.derived.values_mut() {
            *series = permute(series);
        }
    }
}

// =============================================================================
// Time conversion
// =============================================================================

/// Convert a UTC timestamp to f64 seconds since the Unix epoch.
///
/// Model time axes and observation times must share an epoch; this is the
/// conversion used throughout the crate when data arrives with real
/// timestamps.
pub fn epoch_seconds(t: DateTime<Utc>) -> f64 {
    t.timestamp_millis() as f64 / 1000.0
}

/// Convert a slice of UTC timestamps to f64 epoch seconds.
pub fn seconds_from_datetimes(times: &[DateTime<Utc>]) -> Vec<f64> {
    times.iter().map(|&t| epoch_seconds(t)).collect()
}

// =============================================================================
// Tests
// =============================================================================
