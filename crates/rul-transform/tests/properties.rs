//! Property tests for selection and target transforms.

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use proptest::prelude::*;
use rul_transform::{
    ByNameFeatureSelector, DiscardByNameFeatureSelector, NullProportionSelector, PiecewiseRul,
    PiecewiseRulQuantile, Stage, TargetToClasses,
};

const POOL: [&str; 8] = ["a", "b", "c", "d", "e", "f", "g", "h"];

fn table(present: &[bool]) -> DataFrame {
    let columns: Vec<Column> = POOL
        .iter()
        .zip(present)
        .filter(|(_, keep)| **keep)
        .map(|(name, _)| Series::new((*name).into(), vec![1.0, 2.0, 3.0]).into_column())
        .collect();
    DataFrame::new(columns).unwrap()
}

fn names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

fn requested(mask: &[bool]) -> Vec<String> {
    POOL.iter()
        .zip(mask)
        .filter(|(_, keep)| **keep)
        .map(|(name, _)| (*name).to_string())
        .collect()
}

fn single(name: &str, values: Vec<f64>) -> DataFrame {
    DataFrame::new(vec![Series::new(name.into(), values).into_column()]).unwrap()
}

fn values(df: &DataFrame) -> Vec<f64> {
    df.get_columns()[0]
        .f64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect()
}

proptest! {
    #[test]
    fn inclusion_keeps_intersection_in_table_order(
        present in prop::collection::vec(any::<bool>(), POOL.len()),
        wanted in prop::collection::vec(any::<bool>(), POOL.len()),
    ) {
        prop_assume!(wanted.iter().any(|w| *w));
        let df = table(&present);
        let request = requested(&wanted);
        let mut selector = ByNameFeatureSelector::new(request.clone());
        let out = selector.fit_transform(&df).unwrap();

        let expected: Vec<String> = names(&df)
            .into_iter()
            .filter(|name| request.contains(name))
            .collect();
        prop_assert_eq!(names(&out), expected);
        prop_assert_eq!(selector.n_features(), request.len());
    }

    #[test]
    fn exclusion_keeps_difference(
        present in prop::collection::vec(any::<bool>(), POOL.len()),
        dropped in prop::collection::vec(any::<bool>(), POOL.len()),
    ) {
        let df = table(&present);
        let discard = requested(&dropped);
        let mut selector = DiscardByNameFeatureSelector::new(discard.clone());
        let out = selector.fit_transform(&df).unwrap();

        let expected: Vec<String> = names(&df)
            .into_iter()
            .filter(|name| !discard.contains(name))
            .collect();
        prop_assert_eq!(names(&out), expected);
    }

    #[test]
    fn piecewise_clip_is_idempotent(
        xs in prop::collection::vec(-1e6f64..1e6, 1..50),
        max_life in 0.0f64..1e6,
    ) {
        let clip = PiecewiseRul::new(max_life);
        let once = clip.transform(&single("RUL", xs)).unwrap();
        let twice = clip.transform(&once).unwrap();
        prop_assert_eq!(values(&once), values(&twice));
        prop_assert!(values(&once).iter().all(|v| *v >= 0.0 && *v <= max_life));
    }

    #[test]
    fn quantile_clip_max_matches_quantile(
        xs in prop::collection::vec(0.0f64..1e4, 1..100),
        q in 0.0f64..=1.0,
    ) {
        let mut xs = xs;
        xs.sort_by(f64::total_cmp);
        #[allow(clippy::cast_precision_loss)]
        let position = q * (xs.len() - 1) as f64;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let lower = position.floor() as usize;
        let upper = (lower + 1).min(xs.len() - 1);
        let expected = xs[lower] + (xs[upper] - xs[lower]) * (position - position.floor());

        let df = single("RUL", xs);
        let mut clip = PiecewiseRulQuantile::new(q).unwrap();
        let out = clip.fit_transform(&df).unwrap();
        let max = values(&out).into_iter().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!((max - expected).abs() <= 1e-9 * expected.abs().max(1.0));
    }

    #[test]
    fn value_on_edge_opens_next_bin(
        edges in prop::collection::btree_set(-1000i32..1000, 1..10),
    ) {
        let edges: Vec<f64> = edges.into_iter().map(f64::from).collect();
        let classes = TargetToClasses::new(edges.clone());
        for (idx, edge) in edges.iter().enumerate() {
            prop_assert_eq!(classes.class_of(*edge), i64::try_from(idx + 1).unwrap());
            prop_assert_eq!(classes.class_of(*edge - 0.5), i64::try_from(idx).unwrap());
        }
    }
}

#[test]
fn null_proportion_at_threshold_is_dropped() {
    // 2 of 4 finite in "half", 3 of 4 in "most".
    let df = DataFrame::new(vec![
        Series::new("half".into(), vec![Some(1.0), None, Some(f64::NAN), Some(2.0)]).into_column(),
        Series::new("most".into(), vec![Some(1.0), None, Some(3.0), Some(2.0)]).into_column(),
    ])
    .unwrap();
    let mut selector = NullProportionSelector::new(0.5);
    let out = selector.fit_transform(&df).unwrap();
    assert_eq!(names(&out), vec!["most".to_string()]);
    assert_eq!(selector.mask(), Some(&[false, true][..]));
}

#[test]
fn binning_is_right_exclusive() {
    let classes = TargetToClasses::new(vec![0.0, 10.0, 20.0]);
    assert_eq!(classes.class_of(10.0), classes.class_of(15.0));
    assert_ne!(classes.class_of(10.0), classes.class_of(5.0));
}
