//! Neighbourhood-forecast verification driver.
//!
//! This module provides:
//! - **[`SonfScorer`]**: the single-observation neighbourhood forecast
//!   driver, scoring each observation of a series against the CRPS of its
//!   model neighbourhood
//! - **[`ComparisonResult`]** / **[`ScoreFailure`]**: per-observation
//!   outcome records, positionally aligned with the input series
//! - **[`SonfConfig`]**: serializable scorer configuration
//! - **[`SonfSummary`]**: aggregate counts and score statistics over a
//!   batch
//!
//! # Example
//!
//! ```ignore
//! use coastval::grid::NeighbourhoodSpec;
//! use coastval::stats::CdfKind;
//! use coastval::verify::{SonfScorer, SonfSummary};
//!
//! let scorer = SonfScorer::new(NeighbourhoodSpec::Radius { km: 30.0 })
//!     .with_cdf_kind(CdfKind::Empirical);
//! let results = scorer.score_series(&ssh, &track);
//! let summary = SonfSummary::from_results(&results);
//! println!("{summary}");
//! ```

mod sonf;

pub use sonf::{ComparisonResult, ScoreFailure, SonfConfig, SonfScorer, SonfSummary};
