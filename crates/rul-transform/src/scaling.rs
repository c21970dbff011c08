//! Per-column scalers learned at fit time and applied by column position.

use polars::prelude::DataFrame;
use rul_model::frame::{ensure_numeric, finite_values, map_float_columns};
use rul_model::{Result, RulError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::stage::{Stage, describe_stage};
use crate::stats::{min_max, quantile};

fn check_width(expected: usize, df: &DataFrame) -> Result<()> {
    if df.width() == expected {
        Ok(())
    } else {
        Err(RulError::ShapeMismatch {
            expected,
            got: df.width(),
        })
    }
}

/// Scales each column into `feature_range` using the fitted min and max.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinMaxScaler {
    feature_range: (f64, f64),
    data_min: Option<Vec<f64>>,
    data_max: Option<Vec<f64>>,
}

impl Default for MinMaxScaler {
    fn default() -> Self {
        Self::new((0.0, 1.0))
    }
}

impl MinMaxScaler {
    pub fn new(feature_range: (f64, f64)) -> Self {
        Self {
            feature_range,
            data_min: None,
            data_max: None,
        }
    }
}

impl Stage for MinMaxScaler {
    fn kind(&self) -> &'static str {
        "MinMaxScaler"
    }

    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        ensure_numeric(df)?;
        let mut mins = Vec::with_capacity(df.width());
        let mut maxs = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let (lo, hi) = min_max(&finite_values(column)?).unwrap_or((f64::NAN, f64::NAN));
            mins.push(lo);
            maxs.push(hi);
        }
        self.data_min = Some(mins);
        self.data_max = Some(maxs);
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let (Some(mins), Some(maxs)) = (&self.data_min, &self.data_max) else {
            return Err(RulError::not_fitted(self.kind()));
        };
        check_width(mins.len(), df)?;
        let (lo, hi) = self.feature_range;
        map_float_columns(df, |idx, v| {
            let range = maxs[idx] - mins[idx];
            let range = if range == 0.0 { 1.0 } else { range };
            v.map(|v| (v - mins[idx]) / range * (hi - lo) + lo)
        })
    }

    fn describe(&self) -> Value {
        describe_stage(self.kind(), self)
    }

    fn clone_box(&self) -> Box<dyn Stage> {
        Box::new(self.clone())
    }
}

/// Centers each column on its median and scales by its interquartile range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RobustScaler {
    center: Option<Vec<f64>>,
    scale: Option<Vec<f64>>,
}

impl RobustScaler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stage for RobustScaler {
    fn kind(&self) -> &'static str {
        "RobustScaler"
    }

    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        ensure_numeric(df)?;
        let mut center = Vec::with_capacity(df.width());
        let mut scale = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let values = finite_values(column)?;
            let median = quantile(&values, 0.5).unwrap_or(f64::NAN);
            let iqr = match (quantile(&values, 0.25), quantile(&values, 0.75)) {
                (Some(q1), Some(q3)) if q3 > q1 => q3 - q1,
                _ => 1.0,
            };
            center.push(median);
            scale.push(iqr);
        }
        self.center = Some(center);
        self.scale = Some(scale);
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let (Some(center), Some(scale)) = (&self.center, &self.scale) else {
            return Err(RulError::not_fitted(self.kind()));
        };
        check_width(center.len(), df)?;
        map_float_columns(df, |idx, v| v.map(|v| (v - center[idx]) / scale[idx]))
    }

    fn describe(&self) -> Value {
        describe_stage(self.kind(), self)
    }

    fn clone_box(&self) -> Box<dyn Stage> {
        Box::new(self.clone())
    }
}
