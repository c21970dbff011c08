//! Tests for the fit and export steps behind the CLI.

use std::path::Path;

use rul_cli::pipeline::{
    FitRequest, TargetClip, export_lives, fit, load_options, segment_lengths,
};
use rul_ingest::read_life_csv;
use rul_transform::{PipelineOptions, ScalerKind};
use tempfile::TempDir;

fn write_life(dir: &Path, name: &str, rows: usize) {
    let mut content = String::from("time,sensor,flat,RUL\n");
    for row in 0..rows {
        let rul = rows - row - 1;
        content.push_str(&format!("{row},{}.25,1.0,{rul}\n", row * 3));
    }
    std::fs::write(dir.join(name), content).unwrap();
}

fn dataset_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_life(dir.path(), "life_a.csv", 8);
    write_life(dir.path(), "life_b.csv", 6);
    dir
}

fn request(dir: &Path, options: PipelineOptions) -> FitRequest {
    FitRequest {
        dataset_dir: dir.to_path_buf(),
        target: "RUL".to_string(),
        time_feature: None,
        options,
        proportion: 1.0,
        clip: TargetClip::None,
    }
}

#[test]
fn fit_reports_surviving_features() {
    let dir = dataset_dir();
    let options = PipelineOptions::new()
        .with_features(["sensor", "flat"])
        .with_scaler(ScalerKind::MinMax);
    let (_, _, report) = fit(&request(dir.path(), options)).unwrap();

    assert_eq!(report.lives, 2);
    assert_eq!(report.fitted_lives, 2);
    assert_eq!(report.rows, 14);
    assert_eq!(report.features, vec!["sensor".to_string()]);
    assert_eq!(report.n_features, 1);
}

#[test]
fn export_writes_one_file_per_life() {
    let dir = dataset_dir();
    let out = TempDir::new().unwrap();
    let options = PipelineOptions::new().with_discard(["RUL", "life", "time"]);
    let mut req = request(dir.path(), options);
    req.clip = TargetClip::MaxLife(4.0);
    let (dataset, transformer, _) = fit(&req).unwrap();

    let mut seen = Vec::new();
    let written = export_lives(&dataset, &transformer, out.path(), |idx| seen.push(idx)).unwrap();
    assert_eq!(seen, vec![0, 1]);
    assert_eq!(written.len(), 2);

    let first = read_life_csv(&written[0]).unwrap();
    assert_eq!(first.height(), 8);
    let names: Vec<String> = first
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(names, vec!["sensor".to_string(), "RUL".to_string()]);
    let max = first
        .column("RUL")
        .unwrap()
        .cast(&polars::prelude::DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .flatten()
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(max, 4.0);
}

#[test]
fn resampling_keeps_features_and_target_aligned() {
    let dir = dataset_dir();
    let out = TempDir::new().unwrap();
    let options = PipelineOptions::new()
        .with_features(["sensor"])
        .with_resample_every(2);
    let (dataset, transformer, _) = fit(&request(dir.path(), options)).unwrap();
    let written = export_lives(&dataset, &transformer, out.path(), |_| {}).unwrap();

    let first = read_life_csv(&written[0]).unwrap();
    assert_eq!(first.height(), 4);
    assert_eq!(first.width(), 2);
}

#[test]
fn options_file_is_optional() {
    let defaults = load_options(None).unwrap();
    assert_eq!(defaults, PipelineOptions::default());

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("options.json");
    std::fs::write(&path, r#"{"discard": ["time"], "impute": false}"#).unwrap();
    let options = load_options(Some(&path)).unwrap();
    assert_eq!(options.discard, Some(vec!["time".to_string()]));
    assert!(!options.impute);
}

#[test]
fn both_filters_fail_to_build() {
    let dir = dataset_dir();
    let options = PipelineOptions::new()
        .with_features(["sensor"])
        .with_discard(["flat"]);
    let err = fit(&request(dir.path(), options)).unwrap_err();
    assert!(format!("{err:#}").contains("cannot both be set"));
}

#[test]
fn segments_recover_life_lengths() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("y.csv");
    let mut content = String::from("RUL\n");
    for len in [5usize, 3, 4] {
        for v in (0..len).rev() {
            content.push_str(&format!("{v}\n"));
        }
    }
    std::fs::write(&path, content).unwrap();
    assert_eq!(segment_lengths(&path, "RUL").unwrap(), vec![5, 3, 4]);
}

#[test]
fn default_options_drop_target_and_tolerate_mixed_columns() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.csv"), "sensor,RUL\n0,3\n1,2\n2,1\n3,0\n").unwrap();
    let mut content = String::from("sensor,extra,RUL\n");
    for row in 0..6 {
        content.push_str(&format!("{}.5,{},{}\n", row, row * 2, 5 - row));
    }
    std::fs::write(dir.path().join("b.csv"), content).unwrap();
    let out = TempDir::new().unwrap();

    let (dataset, transformer, report) =
        fit(&request(dir.path(), PipelineOptions::default())).unwrap();
    assert_eq!(report.features, vec!["sensor".to_string(), "extra".to_string()]);
    assert_eq!(report.n_features, 2);

    let written = export_lives(&dataset, &transformer, out.path(), |_| {}).unwrap();
    let first = read_life_csv(&written[0]).unwrap();
    assert_eq!(first.height(), 4);
    let names: Vec<String> = first
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(names, vec!["sensor", "extra", "RUL"]);
}
