//! Tests for the dataset-of-lives contract.

use polars::prelude::{Column, DataFrame, DataType, IntoColumn, NamedFrom, Series};
use rul_model::{InMemoryLives, LIFE_ID_COLUMN, LivesDataset};

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

fn mock_dataset(n_lives: usize) -> InMemoryLives {
    let mut lives: Vec<DataFrame> = (0..n_lives - 1)
        .map(|i| {
            let scale = (i + 1) as f64;
            DataFrame::new(vec![
                Series::new("feature1".into(), linspace(0.0, scale * 100.0, 50)).into_column(),
                Series::new("feature2".into(), linspace(-25.0, scale * 500.0, 50)).into_column(),
                Series::new("RUL".into(), linspace(100.0, 0.0, 50)).into_column(),
            ])
            .unwrap()
        })
        .collect();
    let columns: Vec<Column> = vec![
        Series::new("feature1".into(), linspace(0.0, 500.0, 50)).into_column(),
        Series::new("feature2".into(), linspace(-25.0, 2500.0, 50)).into_column(),
        Series::new("feature3".into(), linspace(-25.0, 2500.0, 50)).into_column(),
        Series::new("RUL".into(), linspace(100.0, 0.0, 50)).into_column(),
    ];
    lives.push(DataFrame::new(columns).unwrap());
    InMemoryLives::new(lives, "RUL")
}

#[test]
fn lives_expose_their_columns_and_life_id() {
    let ds = mock_dataset(5);
    assert_eq!(ds.n_lives(), 5);
    for (idx, life) in ds.iter().enumerate() {
        let life = life.unwrap();
        let mut names: Vec<String> = life
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        names.sort();
        if idx < 4 {
            assert_eq!(names, vec!["RUL", "feature1", "feature2", "life"]);
        } else {
            assert_eq!(names, vec!["RUL", "feature1", "feature2", "feature3", "life"]);
        }
    }
}

#[test]
fn to_frame_concatenates_every_life() {
    let ds = mock_dataset(5);
    let frame = ds.to_frame(1.0).unwrap();
    assert_eq!(frame.height(), 50 * 5);
    assert_eq!(frame.column("feature3").unwrap().null_count(), 50 * 4);

    let ids = frame.column(LIFE_ID_COLUMN).unwrap().u32().unwrap();
    let ids: Vec<u32> = ids.into_iter().flatten().collect();
    assert!(ids.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(ids[0], 0);
    assert_eq!(ids[ids.len() - 1], 4);
}

#[test]
fn to_frame_honours_proportion() {
    let ds = mock_dataset(5);
    let frame = ds.to_frame(0.4).unwrap();
    assert_eq!(frame.height(), 50 * 2);
}

#[test]
fn common_features_are_the_schema_intersection() {
    let ds = mock_dataset(5);
    assert_eq!(
        ds.common_features().unwrap(),
        vec!["RUL", "feature1", "feature2", "life"]
    );
}

#[test]
fn to_frame_widens_integer_lives_stacked_with_float_lives() {
    let ints = DataFrame::new(vec![
        Series::new("sensor".into(), vec![1i64, 2, 3]).into_column(),
        Series::new("RUL".into(), vec![2i64, 1, 0]).into_column(),
    ])
    .unwrap();
    let floats = DataFrame::new(vec![
        Series::new("sensor".into(), vec![0.25, 0.75, 1.9]).into_column(),
        Series::new("RUL".into(), vec![2.0, 1.0, 0.0]).into_column(),
    ])
    .unwrap();
    let ds = InMemoryLives::new(vec![ints, floats], "RUL");

    let frame = ds.to_frame(1.0).unwrap();
    let sensor = frame.column("sensor").unwrap();
    assert_eq!(sensor.dtype(), &DataType::Float64);
    let values: Vec<Option<f64>> = sensor.f64().unwrap().into_iter().collect();
    assert_eq!(
        values,
        vec![Some(1.0), Some(2.0), Some(3.0), Some(0.25), Some(0.75), Some(1.9)]
    );
}
