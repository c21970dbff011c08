//! Interquartile-range outlier removal.

use polars::prelude::DataFrame;
use rul_model::frame::{ensure_numeric, finite_values, map_float_columns};
use rul_model::{Result, RulError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::stage::{Stage, describe_stage};
use crate::stats::quantile;

/// Replaces values outside `[q1 - k * iqr, q3 + k * iqr]` with null.
///
/// Bounds are learned per column at fit time. Columns without finite values
/// get unbounded limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IqrOutlierClipper {
    k: f64,
    bounds: Option<Vec<(f64, f64)>>,
}

impl Default for IqrOutlierClipper {
    fn default() -> Self {
        Self::new(1.5)
    }
}

impl IqrOutlierClipper {
    pub fn new(k: f64) -> Self {
        Self { k, bounds: None }
    }

    pub fn bounds(&self) -> Option<&[(f64, f64)]> {
        self.bounds.as_deref()
    }
}

impl Stage for IqrOutlierClipper {
    fn kind(&self) -> &'static str {
        "IqrOutlierClipper"
    }

    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        if !(self.k >= 0.0) {
            return Err(RulError::InvalidParameter(format!(
                "outlier factor must be non-negative, got {}",
                self.k
            )));
        }
        ensure_numeric(df)?;
        let mut bounds = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let values = finite_values(column)?;
            let limits = match (quantile(&values, 0.25), quantile(&values, 0.75)) {
                (Some(q1), Some(q3)) => {
                    let iqr = q3 - q1;
                    (q1 - self.k * iqr, q3 + self.k * iqr)
                }
                _ => (f64::NEG_INFINITY, f64::INFINITY),
            };
            bounds.push(limits);
        }
        self.bounds = Some(bounds);
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let Some(bounds) = &self.bounds else {
            return Err(RulError::not_fitted(self.kind()));
        };
        if bounds.len() != df.width() {
            return Err(RulError::ShapeMismatch {
                expected: bounds.len(),
                got: df.width(),
            });
        }
        map_float_columns(df, |idx, v| {
            let (lo, hi) = bounds[idx];
            v.filter(|v| v.is_nan() || (*v >= lo && *v <= hi))
        })
    }

    fn describe(&self) -> Value {
        describe_stage(self.kind(), self)
    }

    fn clone_box(&self) -> Box<dyn Stage> {
        Box::new(self.clone())
    }
}
