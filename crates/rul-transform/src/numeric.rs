//! Conversion of whole-life tables into numeric matrices.

use polars::prelude::{DataFrame, DataType};
use rul_model::Result;
use rul_model::frame::frame_from_columns;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::stage::{Stage, describe_stage};

/// Casts every column to `Float64`; values that cannot be parsed become null.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ToNumeric;

impl Stage for ToNumeric {
    fn kind(&self) -> &'static str {
        "ToNumeric"
    }

    fn fit(&mut self, _df: &DataFrame) -> Result<()> {
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let columns = df
            .get_columns()
            .iter()
            .map(|column| column.cast(&DataType::Float64))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        frame_from_columns(columns)
    }

    fn describe(&self) -> Value {
        describe_stage(self.kind(), self)
    }

    fn clone_box(&self) -> Box<dyn Stage> {
        Box::new(*self)
    }
}
