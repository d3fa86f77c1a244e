//! Integration tests for the observation operator and comparison
//! statistics.
//!
//! Covers the sample/interpolate/diagonal pipeline end to end, the derived
//! series workflow, and the variable-mapping table from TOML.

use std::collections::HashMap;
use std::io::Write;

use coastval::grid::{CurvilinearGrid, GriddedField};
use coastval::interp::{attach_model_series, interpolate_to_observations, TimeInterpMethod};
use coastval::obs::{MappingError, MappingTable, ObservationSeries};
use coastval::stats::{error_series, ComparisonStats};

const TOL: f64 = 1e-10;

/// Field whose value equals its own time index everywhere, for the
/// diagonal round-trip property.
fn time_index_field(nt: usize) -> GriddedField {
    let grid = CurvilinearGrid::rectilinear(&[0.0, 1.0], &[50.0, 51.0]).unwrap();
    let times: Vec<f64> = (0..nt).map(|t| t as f64).collect();
    let mut values = Vec::with_capacity(nt * 4);
    for t in 0..nt {
        values.extend(std::iter::repeat(t as f64).take(4));
    }
    GriddedField::new("ssh", grid, times, values).unwrap()
}

#[test]
fn test_diagonal_round_trip() {
    // N observations, one per model time step: the extracted value must
    // equal the observation's own time index, in input order.
    let nt = 7;
    let field = time_index_field(nt);
    let obs = ObservationSeries::new(
        "ssh",
        vec![0.5; nt],
        vec![50.5; nt],
        (0..nt).map(|t| t as f64).collect(),
        vec![0.0; nt],
    )
    .unwrap();

    for method in [
        TimeInterpMethod::Nearest,
        TimeInterpMethod::Linear,
        TimeInterpMethod::Cubic,
    ] {
        let out = interpolate_to_observations(&field, &obs, method).unwrap();
        assert_eq!(out.len(), nt);
        for (k, &v) in out.iter().enumerate() {
            assert!((v - k as f64).abs() < TOL, "{method}: slot {k} read {v}");
        }
    }
}

#[test]
fn test_operator_feeds_comparison_stats() {
    // Model is a linear ramp in time; observations sit on the ramp with a
    // constant offset of +0.1, so the statistics are known exactly.
    let grid = CurvilinearGrid::rectilinear(&[5.0, 5.1], &[60.0, 60.1]).unwrap();
    let times: Vec<f64> = (0..10).map(|t| 3600.0 * t as f64).collect();
    let mut values = Vec::new();
    for &t in &times {
        values.extend(std::iter::repeat(t / 36000.0).take(4));
    }
    let field = GriddedField::new("ssh", grid, times.clone(), values).unwrap();

    let obs_times: Vec<f64> = (0..9).map(|k| 1800.0 + 3600.0 * k as f64).collect();
    let obs_values: Vec<f64> = obs_times.iter().map(|&t| t / 36000.0 + 0.1).collect();
    let mut obs = ObservationSeries::new(
        "ssh",
        vec![5.05; 9],
        vec![60.05; 9],
        obs_times,
        obs_values,
    )
    .unwrap();

    let name = attach_model_series(&field, &mut obs, TimeInterpMethod::Linear).unwrap();
    assert_eq!(name, "interp_ssh");

    let model = obs.series("interp_ssh").unwrap();
    let stats = ComparisonStats::compute(model, obs.values());
    assert_eq!(stats.n_points, 9);
    assert!((stats.bias + 0.1).abs() < TOL);
    assert!((stats.mae - 0.1).abs() < TOL);
    assert!((stats.rmse - 0.1).abs() < TOL);
    assert!((stats.correlation - 1.0).abs() < TOL);

    let errors = error_series(model, obs.values());
    assert!(errors.iter().all(|e| (e + 0.1).abs() < TOL));
}

#[test]
fn test_unreduced_field_is_sampled_at_surface() {
    let grid = CurvilinearGrid::rectilinear(&[5.0], &[60.0]).unwrap();
    let field = GriddedField::new_4d(
        "temperature",
        grid,
        vec![0.0, 3600.0],
        vec![0.0, 50.0],
        // (t, k): surface 12.0/13.0, deep 4.0/4.5
        vec![12.0, 4.0, 13.0, 4.5],
    )
    .unwrap();
    let obs = ObservationSeries::new(
        "temperature",
        vec![5.0],
        vec![60.0],
        vec![1800.0],
        vec![12.4],
    )
    .unwrap();
    let out = interpolate_to_observations(&field, &obs, TimeInterpMethod::Linear).unwrap();
    assert!((out[0] - 12.5).abs() < TOL);
}

#[test]
fn test_nemo_mapping_table_applies_and_reports() {
    let table = MappingTable::nemo_t_grid();
    let mut arrays: HashMap<String, Vec<f64>> = HashMap::new();
    arrays.insert("nav_lat".into(), vec![60.0]);
    arrays.insert("nav_lon".into(), vec![5.0]);
    arrays.insert("time_counter".into(), vec![0.0]);
    arrays.insert("sossheig".into(), vec![0.4]);
    arrays.insert("extra_diag".into(), vec![1.0]);

    let (mapped, report) = table.apply(arrays).unwrap();
    assert!(mapped.contains_key("latitude"));
    assert!(mapped.contains_key("longitude"));
    assert!(mapped.contains_key("ssh"));
    assert!(mapped.contains_key("extra_diag"));
    assert!(!mapped.contains_key("sossheig"));
    assert!(report
        .applied
        .contains(&("sossheig".to_string(), "ssh".to_string())));
    assert!(report.missing_optional.contains(&"votemper".to_string()));
}

#[test]
fn test_mapping_table_missing_required_is_typed_error() {
    let table = MappingTable::nemo_t_grid();
    let mut arrays: HashMap<String, Vec<f64>> = HashMap::new();
    arrays.insert("sossheig".into(), vec![0.4]);

    let err = table.apply(arrays).unwrap_err();
    match err {
        MappingError::MissingRequired { names } => {
            assert!(names.contains(&"nav_lat".to_string()));
            assert!(names.contains(&"nav_lon".to_string()));
            assert!(names.contains(&"time_counter".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_mapping_table_toml_file_round_trip() {
    let table = MappingTable::new()
        .with_entry("sossheig", "ssh", false)
        .with_entry("nav_lat", "latitude", true);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(table.to_toml_string().unwrap().as_bytes())
        .unwrap();
    file.flush().unwrap();

    let loaded = MappingTable::from_toml_path(file.path()).unwrap();
    assert_eq!(loaded, table);
}
