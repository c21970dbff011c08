//! Tests for CSV-backed datasets of lives.

use std::path::Path;

use rul_ingest::{CsvLivesDataset, IngestError};
use rul_model::{LIFE_ID_COLUMN, LivesDataset, RulError};
use tempfile::TempDir;

fn write_life(dir: &Path, name: &str, rows: usize, extra: bool) {
    let mut content = String::from(if extra {
        "time,feature1,feature3,RUL\n"
    } else {
        "time,feature1,RUL\n"
    });
    for row in 0..rows {
        let rul = rows - row - 1;
        if extra {
            content.push_str(&format!("{row},{}.5,{row},{rul}\n", row * 2));
        } else {
            content.push_str(&format!("{row},{}.5,{rul}\n", row * 2));
        }
    }
    std::fs::write(dir.join(name), content).unwrap();
}

fn dataset_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_life(dir.path(), "life_01.csv", 5, false);
    write_life(dir.path(), "life_02.csv", 4, false);
    write_life(dir.path(), "life_03.csv", 3, true);
    dir
}

#[test]
fn lives_follow_file_order() {
    let dir = dataset_dir();
    let dataset = CsvLivesDataset::open(dir.path(), "RUL").unwrap();
    assert_eq!(dataset.n_lives(), 3);
    assert_eq!(dataset.rul_column(), "RUL");
    let heights: Vec<usize> = dataset.iter().map(|life| life.unwrap().height()).collect();
    assert_eq!(heights, vec![5, 4, 3]);
}

#[test]
fn materializes_union_of_columns() {
    let dir = dataset_dir();
    let dataset = CsvLivesDataset::open(dir.path(), "RUL").unwrap();
    let df = dataset.to_frame(1.0).unwrap();
    assert_eq!(df.height(), 12);
    assert_eq!(df.column("feature3").unwrap().null_count(), 9);
    assert!(df.column(LIFE_ID_COLUMN).is_ok());
    assert_eq!(
        dataset.common_features().unwrap(),
        vec!["RUL", "feature1", "life", "time"]
    );
}

#[test]
fn empty_directory_has_no_lives() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        CsvLivesDataset::open(dir.path(), "RUL"),
        Err(IngestError::NoLives { .. })
    ));
}

#[test]
fn missing_target_surfaces_as_missing_column() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("life.csv"), "feature1\n1.0\n").unwrap();
    let dataset = CsvLivesDataset::open(dir.path(), "RUL").unwrap();
    assert!(matches!(
        dataset.get_life(0),
        Err(RulError::MissingColumn(column)) if column == "RUL"
    ));
}

#[test]
fn out_of_range_life_is_rejected() {
    let dir = dataset_dir();
    let dataset = CsvLivesDataset::open(dir.path(), "RUL").unwrap();
    assert!(matches!(
        dataset.get_life(7),
        Err(RulError::InvalidParameter(_))
    ));
}
