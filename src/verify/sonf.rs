//! Single-observation neighbourhood forecast (SONF) scoring.
//!
//! Each observation is compared against the *distribution* of model values
//! in its spatial neighbourhood rather than against a single interpolated
//! value: locate the neighbourhood around the observation, gather the model
//! time columns at its indices, interpolate them to the observation's own
//! timestamp, build a model CDF from the resulting sample and an
//! observation CDF from the single observed value, and integrate the
//! squared difference (CRPS).
//!
//! Failure is per-observation. An empty neighbourhood, an unreduced depth
//! axis or a sample with no finite values marks that entry as failed (NaN
//! score, zero neighbourhood size, cause attached) and scoring moves on to
//! the next observation; the batch always returns exactly one
//! [`ComparisonResult`] per observation, in input order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{GriddedField, NeighbourhoodSpec};
use crate::interp::{interp_column, TimeInterpMethod};
use crate::obs::{ObservationPoint, ObservationSeries};
use crate::stats::{crps, Cdf, CdfKind};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// =============================================================================
// Results
// =============================================================================

/// Why a single observation could not be scored.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ScoreFailure {
    /// Spatial subsetting selected zero grid points.
    #[error("neighbourhood contains no points")]
    EmptyNeighbourhood,

    /// The model field still carries a depth axis; the caller must
    /// pre-slice with [`GriddedField::select_depth`].
    #[error("model field has {nz} depth levels; reduce depth before scoring")]
    DepthNotReduced {
        /// Number of levels on the offending field.
        nz: usize,
    },

    /// Every model value in the neighbourhood was NaN after time
    /// interpolation, or the observed value itself was NaN.
    #[error("no finite values available for CDF construction")]
    NoValidData,
}

/// Per-observation scoring record.
///
/// Created fresh per observation and never mutated afterwards. Failed
/// entries carry a NaN score and zero neighbourhood size so the result
/// collection stays positionally aligned with the input series.
#[derive(Clone, Copy, Debug)]
pub struct ComparisonResult {
    /// CRPS of the neighbourhood forecast against the observation (NaN on
    /// failure).
    pub score: f64,
    /// Cardinality of the spatial neighbourhood (0 on failure).
    pub neighbourhood_size: usize,
    /// True when any neighbourhood value was NaN/masked.
    pub contains_land: bool,
    /// Failure cause; `None` for scored entries.
    pub failure: Option<ScoreFailure>,
}

impl ComparisonResult {
    /// True when the observation was scored successfully.
    #[inline]
    pub fn is_scored(&self) -> bool {
        self.failure.is_none()
    }

    fn failed(cause: ScoreFailure, contains_land: bool) -> Self {
        Self {
            score: f64::NAN,
            neighbourhood_size: 0,
            contains_land,
            failure: Some(cause),
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Scorer configuration: neighbourhood, CDF family and time kernel.
///
/// Serializable so scoring runs can be configured from TOML:
///
/// ```toml
/// cdf_kind = "empirical"
/// time_interp = "nearest"
///
/// [neighbourhood]
/// mode = "radius"
/// km = 30.0
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SonfConfig {
    /// Model CDF family. The observation CDF is always empirical.
    #[serde(default)]
    pub cdf_kind: CdfKind,
    /// Time-axis interpolation method for aligning the model subset with
    /// the observation timestamp.
    #[serde(default)]
    pub time_interp: TimeInterpMethod,
    /// Spatial selection strategy (kilometres for radius mode, degrees of
    /// half-width for box mode; the dual units are deliberate).
    pub neighbourhood: NeighbourhoodSpec,
}

// =============================================================================
// Scorer
// =============================================================================

/// Neighbourhood-forecast scorer.
///
/// Holds the configuration; the model field and observation series remain
/// owned by the caller and are only borrowed per call. The field is
/// read-only during scoring, so a batch may be parallelized across
/// observations (see the `parallel` feature) without changing any result.
///
/// # Example
///
/// ```
/// use coastval::grid::{CurvilinearGrid, GriddedField, NeighbourhoodSpec};
/// use coastval::obs::ObservationSeries;
/// use coastval::verify::SonfScorer;
///
/// let grid = CurvilinearGrid::rectilinear(&[5.0, 5.1, 5.2], &[60.0, 60.1]).unwrap();
/// let field = GriddedField::new("ssh", grid, vec![0.0, 3600.0], vec![0.5; 12]).unwrap();
/// let obs = ObservationSeries::new(
///     "ssh",
///     vec![5.1],
///     vec![60.05],
///     vec![1800.0],
///     vec![0.5],
/// )
/// .unwrap();
///
/// let scorer = SonfScorer::new(NeighbourhoodSpec::Radius { km: 50.0 });
/// let results = scorer.score_series(&field, &obs);
/// assert_eq!(results.len(), 1);
/// assert!(results[0].score.abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SonfScorer {
    config: SonfConfig,
}

impl SonfScorer {
    /// Create a scorer with the default empirical CDF and nearest-time
    /// interpolation.
    pub fn new(neighbourhood: NeighbourhoodSpec) -> Self {
        Self {
            config: SonfConfig {
                neighbourhood,
                cdf_kind: CdfKind::default(),
                time_interp: TimeInterpMethod::default(),
            },
        }
    }

    /// Create a scorer from a full configuration.
    pub fn from_config(config: SonfConfig) -> Self {
        Self { config }
    }

    /// Select the model CDF family.
    pub fn with_cdf_kind(mut self, kind: CdfKind) -> Self {
        self.config.cdf_kind = kind;
        self
    }

    /// Select the time interpolation method.
    pub fn with_time_interp(mut self, method: TimeInterpMethod) -> Self {
        self.config.time_interp = method;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &SonfConfig {
        &self.config
    }

    /// Score one observation against its model neighbourhood.
    pub fn score_observation(
        &self,
        field: &GriddedField,
        point: ObservationPoint,
    ) -> ComparisonResult {
        if !field.is_depth_reduced() {
            return ComparisonResult::failed(
                ScoreFailure::DepthNotReduced { nz: field.nz() },
                false,
            );
        }
        self.score_reduced(field, point)
    }

    /// Score every observation in a series, in input order.
    ///
    /// Infallible with respect to the batch: the result always has exactly
    /// `obs.len()` entries, with failed observations recorded in place.
    pub fn score_series(
        &self,
        field: &GriddedField,
        obs: &ObservationSeries,
    ) -> Vec<ComparisonResult> {
        // The depth precondition cannot vary per observation; check once
        // and record the cause on every entry.
        if !field.is_depth_reduced() {
            let cause = ScoreFailure::DepthNotReduced { nz: field.nz() };
            log::warn!("{cause}; all {} observations recorded as failed", obs.len());
            return vec![ComparisonResult::failed(cause, false); obs.len()];
        }
        obs.iter_points()
            .map(|point| self.score_reduced(field, point))
            .collect()
    }

    /// Parallel variant of [`SonfScorer::score_series`].
    ///
    /// Observations are independent and the field is read-only, so the
    /// per-entry results are identical to the serial run; only the
    /// evaluation order differs.
    #[cfg(feature = "parallel")]
    pub fn score_series_parallel(
        &self,
        field: &GriddedField,
        obs: &ObservationSeries,
    ) -> Vec<ComparisonResult> {
        if !field.is_depth_reduced() {
            let cause = ScoreFailure::DepthNotReduced { nz: field.nz() };
            log::warn!("{cause}; all {} observations recorded as failed", obs.len());
            return vec![ComparisonResult::failed(cause, false); obs.len()];
        }
        let points: Vec<ObservationPoint> = obs.iter_points().collect();
        points
            .into_par_iter()
            .map(|point| self.score_reduced(field, point))
            .collect()
    }

    /// The per-observation state machine, on a depth-reduced field.
    fn score_reduced(&self, field: &GriddedField, point: ObservationPoint) -> ComparisonResult {
        // Init -> NeighbourhoodLocated
        let nh = self
            .config
            .neighbourhood
            .subset(field.grid(), point.longitude, point.latitude);
        if nh.is_empty() {
            log::warn!(
                "neighbourhood contains no points at (lon={}, lat={})",
                point.longitude,
                point.latitude
            );
            return ComparisonResult::failed(ScoreFailure::EmptyNeighbourhood, false);
        }

        // -> ModelSubsetExtracted -> TimeInterpolated: one value per
        // neighbourhood cell, aligned to the observation's own timestamp.
        let times = field.times();
        let sample: Vec<f64> = nh
            .indices()
            .iter()
            .map(|&ix| {
                let column = field.time_column(ix);
                interp_column(times, &column, point.time, self.config.time_interp)
            })
            .collect();

        // The land signal is read post-interpolation, so a NaN introduced
        // by an out-of-range linear/cubic target also sets the flag.
        let contains_land = sample.iter().any(|v| v.is_nan());
        if contains_land {
            log::debug!(
                "neighbourhood at (lon={}, lat={}) intersects masked cells; \
                 NaNs excluded from the model CDF",
                point.longitude,
                point.latitude
            );
        }

        // -> CDFsBuilt: model CDF is configurable, observation CDF is the
        // degenerate one-point empirical step.
        let model_cdf = match Cdf::new(&sample, self.config.cdf_kind) {
            Ok(cdf) => cdf,
            Err(_) => return ComparisonResult::failed(ScoreFailure::NoValidData, contains_land),
        };
        let obs_cdf = match Cdf::new(&[point.value], CdfKind::Empirical) {
            Ok(cdf) => cdf,
            Err(_) => return ComparisonResult::failed(ScoreFailure::NoValidData, contains_land),
        };

        // -> Scored
        ComparisonResult {
            score: crps(&model_cdf, &obs_cdf),
            neighbourhood_size: nh.len(),
            contains_land,
            failure: None,
        }
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Aggregate view over a batch of scoring results.
#[derive(Clone, Debug)]
pub struct SonfSummary {
    /// Total number of observations in the batch.
    pub n_observations: usize,
    /// Number of successfully scored entries.
    pub n_scored: usize,
    /// Number of failed entries.
    pub n_failed: usize,
    /// Number of entries whose neighbourhood touched masked cells.
    pub n_land_contaminated: usize,
    /// Mean CRPS over scored entries (NaN when none scored).
    pub mean_score: f64,
    /// Lowest (best) CRPS over scored entries (NaN when none scored).
    pub best_score: f64,
    /// Highest (worst) CRPS over scored entries (NaN when none scored).
    pub worst_score: f64,
}

impl SonfSummary {
    /// Compute a summary from a batch of results.
    pub fn from_results(results: &[ComparisonResult]) -> Self {
        let scored: Vec<f64> = results
            .iter()
            .filter(|r| r.is_scored())
            .map(|r| r.score)
            .collect();
        let n_land_contaminated = results.iter().filter(|r| r.contains_land).count();

        let (mean_score, best_score, worst_score) = if scored.is_empty() {
            (f64::NAN, f64::NAN, f64::NAN)
        } else {
            let mean = scored.iter().sum::<f64>() / scored.len() as f64;
            let best = scored.iter().copied().fold(f64::INFINITY, f64::min);
            let worst = scored.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (mean, best, worst)
        };

        Self {
            n_observations: results.len(),
            n_scored: scored.len(),
            n_failed: results.len() - scored.len(),
            n_land_contaminated,
            mean_score,
            best_score,
            worst_score,
        }
    }
}

impl std::fmt::Display for SonfSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} observations: {} scored, {} failed, {} land-contaminated; \
             CRPS mean={:.4} best={:.4} worst={:.4}",
            self.n_observations,
            self.n_scored,
            self.n_failed,
            self.n_land_contaminated,
            self.mean_score,
            self.best_score,
            self.worst_score
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CurvilinearGrid;

    const TOL: f64 = 1e-10;

    /// 4x4 grid of constant value 5.0 over two time steps.
    fn constant_field() -> GriddedField {
        let axis = [0.0, 0.5, 1.0, 1.5];
        let grid = CurvilinearGrid::rectilinear(&axis, &[50.0, 50.5, 51.0, 51.5]).unwrap();
        GriddedField::new("ssh", grid, vec![0.0, 3600.0], vec![5.0; 32]).unwrap()
    }

    fn single_obs(lon: f64, lat: f64, time: f64, value: f64) -> ObservationSeries {
        ObservationSeries::new("ssh", vec![lon], vec![lat], vec![time], vec![value]).unwrap()
    }

    #[test]
    fn test_perfect_model_scores_zero() {
        let field = constant_field();
        let obs = single_obs(0.75, 50.75, 1800.0, 5.0);
        let scorer = SonfScorer::new(NeighbourhoodSpec::Radius { km: 100.0 });
        let results = scorer.score_series(&field, &obs);
        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert!(r.is_scored());
        assert!(r.score.abs() < TOL);
        assert!(r.neighbourhood_size > 0);
        assert!(!r.contains_land);
    }

    #[test]
    fn test_empty_neighbourhood_fails_that_entry_only() {
        let field = constant_field();
        // First observation is far outside any 50 km disc; the second sits
        // at a cell centre of the 0.5-degree mesh, ~33 km from its nearest
        // grid point, so 50 km keeps it scoreable.
        let obs = ObservationSeries::new(
            "ssh",
            vec![30.0, 0.75],
            vec![20.0, 50.75],
            vec![0.0, 0.0],
            vec![5.0, 5.0],
        )
        .unwrap();
        let scorer = SonfScorer::new(NeighbourhoodSpec::Radius { km: 50.0 });
        let results = scorer.score_series(&field, &obs);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].failure, Some(ScoreFailure::EmptyNeighbourhood));
        assert!(results[0].score.is_nan());
        assert_eq!(results[0].neighbourhood_size, 0);
        assert!(results[1].is_scored());
    }

    #[test]
    fn test_land_cell_sets_flag_and_is_excluded() {
        // Two cells: one NaN (land), one 5.0. Observation of 5.0 must
        // score 0 from the single valid value.
        let grid = CurvilinearGrid::rectilinear(&[0.0, 0.2], &[50.0]).unwrap();
        let field = GriddedField::new(
            "ssh",
            grid,
            vec![0.0],
            vec![f64::NAN, 5.0],
        )
        .unwrap();
        let obs = single_obs(0.1, 50.0, 0.0, 5.0);
        let scorer = SonfScorer::new(NeighbourhoodSpec::BoundingBox { half_width_deg: 1.0 });
        let r = scorer.score_series(&field, &obs)[0];
        assert!(r.is_scored());
        assert!(r.contains_land);
        assert!(r.score.abs() < TOL);
        assert_eq!(r.neighbourhood_size, 2);
    }

    #[test]
    fn test_all_nan_neighbourhood_is_no_valid_data() {
        let grid = CurvilinearGrid::rectilinear(&[0.0, 0.2], &[50.0]).unwrap();
        let field =
            GriddedField::new("ssh", grid, vec![0.0], vec![f64::NAN, f64::NAN]).unwrap();
        let obs = single_obs(0.1, 50.0, 0.0, 5.0);
        let scorer = SonfScorer::new(NeighbourhoodSpec::BoundingBox { half_width_deg: 1.0 });
        let r = scorer.score_series(&field, &obs)[0];
        assert_eq!(r.failure, Some(ScoreFailure::NoValidData));
        assert!(r.contains_land);
        assert!(r.score.is_nan());
        assert_eq!(r.neighbourhood_size, 0);
    }

    #[test]
    fn test_infinite_values_fail_without_land_flag() {
        // Non-finite but non-NaN model values cannot form a CDF, yet the
        // land flag tracks the NaN mask sentinel only.
        let grid = CurvilinearGrid::rectilinear(&[0.0, 0.2], &[50.0]).unwrap();
        let field = GriddedField::new(
            "ssh",
            grid,
            vec![0.0],
            vec![f64::INFINITY, f64::INFINITY],
        )
        .unwrap();
        let obs = single_obs(0.1, 50.0, 0.0, 5.0);
        let scorer = SonfScorer::new(NeighbourhoodSpec::BoundingBox { half_width_deg: 1.0 });
        let r = scorer.score_series(&field, &obs)[0];
        assert_eq!(r.failure, Some(ScoreFailure::NoValidData));
        assert!(!r.contains_land);
        assert!(r.score.is_nan());
    }

    #[test]
    fn test_nan_observation_is_no_valid_data() {
        let field = constant_field();
        let obs = single_obs(0.75, 50.75, 0.0, f64::NAN);
        let scorer = SonfScorer::new(NeighbourhoodSpec::Radius { km: 100.0 });
        let r = scorer.score_series(&field, &obs)[0];
        assert_eq!(r.failure, Some(ScoreFailure::NoValidData));
        assert!(!r.contains_land);
    }

    #[test]
    fn test_unreduced_depth_fails_every_entry() {
        let grid = CurvilinearGrid::rectilinear(&[0.0], &[50.0]).unwrap();
        let field = GriddedField::new_4d(
            "temperature",
            grid,
            vec![0.0],
            vec![0.0, 10.0],
            vec![5.0, 4.0],
        )
        .unwrap();
        let obs = ObservationSeries::new(
            "temperature",
            vec![0.0, 0.0],
            vec![50.0, 50.0],
            vec![0.0, 0.0],
            vec![5.0, 5.0],
        )
        .unwrap();
        let scorer = SonfScorer::new(NeighbourhoodSpec::Radius { km: 100.0 });
        let results = scorer.score_series(&field, &obs);
        assert_eq!(results.len(), 2);
        for r in &results {
            assert_eq!(r.failure, Some(ScoreFailure::DepthNotReduced { nz: 2 }));
            assert!(r.score.is_nan());
        }
        // After reduction the same series scores.
        let results = scorer.score_series(&field.surface(), &obs);
        assert!(results.iter().all(ComparisonResult::is_scored));
    }

    #[test]
    fn test_theoretical_cdf_mode_scores_non_negative() {
        let grid = CurvilinearGrid::rectilinear(&[0.0, 0.2, 0.4], &[50.0]).unwrap();
        let field = GriddedField::new(
            "ssh",
            grid,
            vec![0.0],
            vec![4.0, 5.0, 6.0],
        )
        .unwrap();
        let obs = single_obs(0.2, 50.0, 0.0, 5.0);
        let scorer = SonfScorer::new(NeighbourhoodSpec::BoundingBox { half_width_deg: 1.0 })
            .with_cdf_kind(CdfKind::Theoretical);
        let r = scorer.score_series(&field, &obs)[0];
        assert!(r.is_scored());
        assert!(r.score >= 0.0);
        // The Gaussian spread keeps the score away from zero.
        assert!(r.score > 0.1);
    }

    #[test]
    fn test_summary_counts() {
        let results = vec![
            ComparisonResult {
                score: 0.2,
                neighbourhood_size: 4,
                contains_land: true,
                failure: None,
            },
            ComparisonResult {
                score: 0.6,
                neighbourhood_size: 9,
                contains_land: false,
                failure: None,
            },
            ComparisonResult::failed(ScoreFailure::EmptyNeighbourhood, false),
        ];
        let summary = SonfSummary::from_results(&results);
        assert_eq!(summary.n_observations, 3);
        assert_eq!(summary.n_scored, 2);
        assert_eq!(summary.n_failed, 1);
        assert_eq!(summary.n_land_contaminated, 1);
        assert!((summary.mean_score - 0.4).abs() < TOL);
        assert!((summary.best_score - 0.2).abs() < TOL);
        assert!((summary.worst_score - 0.6).abs() < TOL);
    }

    #[test]
    fn test_summary_of_empty_batch() {
        let summary = SonfSummary::from_results(&[]);
        assert_eq!(summary.n_observations, 0);
        assert!(summary.mean_score.is_nan());
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = SonfConfig {
            neighbourhood: NeighbourhoodSpec::Radius { km: 30.0 },
            cdf_kind: CdfKind::Theoretical,
            time_interp: TimeInterpMethod::Linear,
        };
        let text = toml::to_string(&config).unwrap();
        let back: SonfConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);

        // Defaults apply when the optional keys are omitted.
        let back: SonfConfig = toml::from_str(
            "[neighbourhood]\nmode = \"bounding_box\"\nhalf_width_deg = 0.5\n",
        )
        .unwrap();
        assert_eq!(back.cdf_kind, CdfKind::Empirical);
        assert_eq!(back.time_interp, TimeInterpMethod::Nearest);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_batch_matches_serial() {
        let field = constant_field();
        let obs = ObservationSeries::new(
            "ssh",
            vec![0.2, 0.8, 1.3, 30.0],
            vec![50.2, 50.8, 51.3, 20.0],
            vec![0.0, 1200.0, 2400.0, 3600.0],
            vec![5.0, 5.1, 4.9, 5.0],
        )
        .unwrap();
        let scorer = SonfScorer::new(NeighbourhoodSpec::Radius { km: 60.0 });
        let serial = scorer.score_series(&field, &obs);
        let parallel = scorer.score_series_parallel(&field, &obs);
        assert_eq!(serial.len(), parallel.len());
        for (s, p) in serial.iter().zip(&parallel) {
            assert_eq!(s.neighbourhood_size, p.neighbourhood_size);
            assert_eq!(s.failure, p.failure);
            assert!(s.score == p.score || (s.score.is_nan() && p.score.is_nan()));
        }
    }
}
