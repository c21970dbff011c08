//! Row decimation of whole-life tables.

use polars::prelude::{DataFrame, IdxCa, IdxSize, NewChunkedArray};
use rul_model::{Result, RulError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::stage::{Stage, describe_stage};

/// Keeps every `every`-th row, starting with the first.
///
/// Usually disabled while fitting so that statistics are learned on the full
/// resolution tables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Resampler {
    every: usize,
}

impl Resampler {
    pub fn new(every: usize) -> Result<Self> {
        if every == 0 {
            return Err(RulError::InvalidParameter(
                "resampling step must be at least 1".to_string(),
            ));
        }
        Ok(Self { every })
    }

    pub fn every(&self) -> usize {
        self.every
    }
}

impl Stage for Resampler {
    fn kind(&self) -> &'static str {
        "Resampler"
    }

    fn fit(&mut self, _df: &DataFrame) -> Result<()> {
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if self.every == 1 {
            return Ok(df.clone());
        }
        let rows = (0..df.height())
            .step_by(self.every)
            .map(|row| {
                IdxSize::try_from(row)
                    .map_err(|_| RulError::InvalidParameter(format!("row {row} out of index range")))
            })
            .collect::<Result<Vec<_>>>()?;
        let idx = IdxCa::from_vec("rows".into(), rows);
        Ok(df.take(&idx)?)
    }

    fn describe(&self) -> Value {
        describe_stage(self.kind(), self)
    }

    fn clone_box(&self) -> Box<dyn Stage> {
        Box::new(*self)
    }
}
