//! Missing value imputation.

use polars::prelude::{DataFrame, Float64Chunked, IntoColumn};
use rul_model::Result;
use rul_model::frame::{ensure_numeric, float_values, frame_from_columns};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::stage::{Stage, describe_stage};

/// Fills missing and non-finite values with the previous finite value of the
/// same column, then fills a leading gap with the first finite value.
/// Columns without finite values become all null.
///
/// Imputation runs per table, so a fitted pipeline never carries values from
/// one life into another.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ForwardFillImputer;

fn fill(values: &Float64Chunked) -> Float64Chunked {
    let finite = |v: Option<f64>| v.filter(|v| v.is_finite());
    let mut last = values.into_iter().find_map(finite);
    values
        .into_iter()
        .map(|v| match finite(v) {
            Some(v) => {
                last = Some(v);
                Some(v)
            }
            None => last,
        })
        .collect()
}

impl Stage for ForwardFillImputer {
    fn kind(&self) -> &'static str {
        "ForwardFillImputer"
    }

    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        ensure_numeric(df)
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let columns = df
            .get_columns()
            .iter()
            .map(|column| {
                let filled = fill(&float_values(column)?);
                Ok(filled.with_name(column.name().clone()).into_column())
            })
            .collect::<Result<Vec<_>>>()?;
        frame_from_columns(columns)
    }

    fn describe(&self) -> Value {
        describe_stage(self.kind(), self)
    }

    fn clone_box(&self) -> Box<dyn Stage> {
        Box::new(*self)
    }
}
