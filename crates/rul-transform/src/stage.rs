//! The contract every pipeline stage satisfies.
//!
//! A stage learns state from a whole table in [`Stage::fit`] and applies it
//! to one table at a time in [`Stage::transform`]. Transform never mutates
//! learned state, so a fitted stage can be shared across threads.

use std::fmt;

use polars::prelude::DataFrame;
use rul_model::Result;
use serde::Serialize;
use serde_json::{Value, json};

use crate::pipeline::Pipeline;

pub trait Stage: fmt::Debug + Send + Sync {
    /// Short type name used in descriptions and logs.
    fn kind(&self) -> &'static str;

    /// Learn state from `df`.
    fn fit(&mut self, df: &DataFrame) -> Result<()>;

    /// Apply the learned state to `df`.
    fn transform(&self, df: &DataFrame) -> Result<DataFrame>;

    fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Bookkeeping run instead of `fit` when the stage is reached while
    /// disabled. The input is passed on unchanged either way.
    fn fit_disabled(&mut self, _df: &DataFrame) -> Result<()> {
        Ok(())
    }

    /// Positions of the input columns retained by a fitted selection stage.
    fn support(&self) -> Option<Vec<usize>> {
        None
    }

    /// Names of the output columns given the names of the input columns.
    ///
    /// Selection stages narrow `input` by their support; everything else
    /// keeps it as is.
    fn feature_names_out(&self, input: Vec<String>) -> Vec<String> {
        match self.support() {
            Some(support) => support
                .into_iter()
                .filter_map(|idx| input.get(idx).cloned())
                .collect(),
            None => input,
        }
    }

    /// Serializable dump of the stage configuration and learned state.
    fn describe(&self) -> Value;

    fn as_pipeline(&self) -> Option<&Pipeline> {
        None
    }

    fn as_pipeline_mut(&mut self) -> Option<&mut Pipeline> {
        None
    }

    fn clone_box(&self) -> Box<dyn Stage>;
}

impl Clone for Box<dyn Stage> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Describe a stage as `{"kind": ..., "params": ...}`.
pub fn describe_stage<S: Serialize>(kind: &str, stage: &S) -> Value {
    let params = serde_json::to_value(stage).unwrap_or(Value::Null);
    json!({ "kind": kind, "params": params })
}

/// Pass-through stage; the default target pipeline.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Identity;

impl Stage for Identity {
    fn kind(&self) -> &'static str {
        "Identity"
    }

    fn fit(&mut self, _df: &DataFrame) -> Result<()> {
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        Ok(df.clone())
    }

    fn describe(&self) -> Value {
        describe_stage(self.kind(), self)
    }

    fn clone_box(&self) -> Box<dyn Stage> {
        Box::new(*self)
    }
}
