//! Transformations of the target signal.
//!
//! Every stage here receives the target slice of a life: the target
//! column(s), preceded by the time column when one is configured. Values are
//! transformed in every column of the slice.

use polars::prelude::{DataFrame, Int64Chunked, IntoColumn};
use rul_model::frame::{float_values, frame_from_columns, map_float_columns};
use rul_model::{Result, RulError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::stage::{Stage, describe_stage};
use crate::stats::quantile;

/// Name of the column produced by [`TargetToClasses`].
pub const CLASS_COLUMN: &str = "RUL_class";

/// Clip into `[0, max]`, leaving `NaN` untouched.
fn clip(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        value
    } else {
        value.max(0.0).min(max)
    }
}

/// Clips the target into `[0, max_life]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiecewiseRul {
    max_life: f64,
}

impl Default for PiecewiseRul {
    fn default() -> Self {
        Self::new(f64::INFINITY)
    }
}

impl PiecewiseRul {
    pub fn new(max_life: f64) -> Self {
        Self { max_life }
    }

    pub fn max_life(&self) -> f64 {
        self.max_life
    }
}

impl Stage for PiecewiseRul {
    fn kind(&self) -> &'static str {
        "PiecewiseRul"
    }

    fn fit(&mut self, _df: &DataFrame) -> Result<()> {
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        map_float_columns(df, |_, v| v.map(|v| clip(v, self.max_life)))
    }

    fn describe(&self) -> Value {
        describe_stage(self.kind(), self)
    }

    fn clone_box(&self) -> Box<dyn Stage> {
        Box::new(self.clone())
    }
}

/// Clips the target at a quantile of the training target values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiecewiseRulQuantile {
    quantile: f64,
    max_life: Option<f64>,
}

impl PiecewiseRulQuantile {
    /// `quantile` must lie in `[0, 1]`.
    pub fn new(quantile: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&quantile) {
            return Err(RulError::InvalidParameter(format!(
                "quantile must be in [0, 1], got {quantile}"
            )));
        }
        Ok(Self {
            quantile,
            max_life: None,
        })
    }

    /// Learned clipping threshold; `None` before fit.
    pub fn max_life(&self) -> Option<f64> {
        self.max_life
    }
}

impl Stage for PiecewiseRulQuantile {
    fn kind(&self) -> &'static str {
        "PiecewiseRulQuantile"
    }

    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        let mut values = Vec::with_capacity(df.height() * df.width());
        for column in df.get_columns() {
            values.extend(float_values(column)?.into_iter().flatten());
        }
        let max_life = quantile(&values, self.quantile)
            .ok_or_else(|| RulError::EmptyData("no target values to fit quantile".to_string()))?;
        debug!(quantile = self.quantile, max_life, "fitted target clipping threshold");
        self.max_life = Some(max_life);
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let max_life = self
            .max_life
            .ok_or_else(|| RulError::not_fitted(self.kind()))?;
        map_float_columns(df, |_, v| v.map(|v| clip(v, max_life)))
    }

    fn describe(&self) -> Value {
        describe_stage(self.kind(), self)
    }

    fn clone_box(&self) -> Box<dyn Stage> {
        Box::new(self.clone())
    }
}

/// Maps the first column of the target into class indices.
///
/// With ascending edges `bins`, a value `v` maps to the number of edges
/// `<= v`: a value equal to an edge belongs to the bin that edge opens.
/// `NaN` maps past the last edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetToClasses {
    bins: Vec<f64>,
}

impl TargetToClasses {
    pub fn new(bins: Vec<f64>) -> Self {
        Self { bins }
    }

    /// Class index of a single value.
    pub fn class_of(&self, value: f64) -> i64 {
        let idx = if value.is_nan() {
            self.bins.len()
        } else {
            self.bins.partition_point(|edge| *edge <= value)
        };
        i64::try_from(idx).unwrap_or(i64::MAX)
    }
}

impl Stage for TargetToClasses {
    fn kind(&self) -> &'static str {
        "TargetToClasses"
    }

    fn fit(&mut self, _df: &DataFrame) -> Result<()> {
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let first = df
            .get_columns()
            .first()
            .ok_or_else(|| RulError::EmptyData("target slice has no columns".to_string()))?;
        let classes: Int64Chunked = float_values(first)?
            .into_iter()
            .map(|v| v.map(|v| self.class_of(v)))
            .collect();
        frame_from_columns(vec![classes.with_name(CLASS_COLUMN.into()).into_column()])
    }

    fn describe(&self) -> Value {
        describe_stage(self.kind(), self)
    }

    fn clone_box(&self) -> Box<dyn Stage> {
        Box::new(self.clone())
    }
}

/// Rescales the target to a percentage of its value at the first row.
///
/// The reference is the first row of whatever slice is transformed, so a
/// partial window is normalized by its own first row.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HealthPercentage;

impl Stage for HealthPercentage {
    fn kind(&self) -> &'static str {
        "HealthPercentage"
    }

    fn fit(&mut self, _df: &DataFrame) -> Result<()> {
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let first = df
            .get_columns()
            .first()
            .ok_or_else(|| RulError::EmptyData("target slice has no columns".to_string()))?;
        if df.height() == 0 {
            return Err(RulError::EmptyData("target slice has no rows".to_string()));
        }
        let initial = float_values(first)?.get(0).unwrap_or(f64::NAN);
        map_float_columns(df, |_, v| v.map(|v| v / initial * 100.0))
    }

    fn describe(&self) -> Value {
        describe_stage(self.kind(), self)
    }

    fn clone_box(&self) -> Box<dyn Stage> {
        Box::new(*self)
    }
}

/// Maps the target to `1` when strictly below `t`, else `0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulBinarizer {
    t: f64,
}

impl RulBinarizer {
    pub fn new(t: f64) -> Self {
        Self { t }
    }
}

impl Stage for RulBinarizer {
    fn kind(&self) -> &'static str {
        "RulBinarizer"
    }

    fn fit(&mut self, _df: &DataFrame) -> Result<()> {
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let flags: Int64Chunked = float_values(column)?
                .into_iter()
                .map(|v| Some(i64::from(v.is_some_and(|v| v < self.t))))
                .collect();
            columns.push(flags.with_name(column.name().clone()).into_column());
        }
        frame_from_columns(columns)
    }

    fn describe(&self) -> Value {
        describe_stage(self.kind(), self)
    }

    fn clone_box(&self) -> Box<dyn Stage> {
        Box::new(self.clone())
    }
}
