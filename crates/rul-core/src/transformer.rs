//! The transformer: one feature pipeline and one target pipeline, fitted on a
//! whole dataset of lives and applied to one life at a time.
//!
//! Fitting materializes a proportion of the dataset into a single table,
//! fits the feature pipeline on it and the target pipeline on its target
//! slice. The resampling step of either pipeline can be switched off while
//! fitting so statistics are learned at full resolution.
//!
//! A fitted transformer never mutates during transform, so it can be shared
//! between threads. Independent experiments should [`Clone`] it: every clone
//! owns a deep copy of the fitted stage state.

use ndarray::{Array1, Array2};
use polars::prelude::{Column, DataFrame, Float64Type, IndexOrder, IntoColumn, Series};
use rul_model::frame::{column_names, float_values, select_strict};
use rul_model::{LivesDataset, Result, RulError, TargetColumn};
use rul_transform::{Identity, RESAMPLER_STEP_NAME, Stage, simple_pipeline, step_set_enable};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Output of the target pipeline for one life.
///
/// A single-column output is squeezed into a vector.
#[derive(Debug, Clone)]
pub enum TargetValues {
    Vector(Series),
    Table(DataFrame),
}

impl TargetValues {
    fn squeeze(df: DataFrame) -> Self {
        match df.get_columns() {
            [column] => Self::Vector(column.as_materialized_series().clone()),
            _ => Self::Table(df),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            Self::Vector(series) => series.len(),
            Self::Table(df) => df.height(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_vector(&self) -> Option<&Series> {
        match self {
            Self::Vector(series) => Some(series),
            Self::Table(_) => None,
        }
    }

    /// Values of a squeezed target as floats; nulls become `NaN`.
    pub fn to_vector(&self) -> Result<Array1<f64>> {
        match self {
            Self::Vector(series) => {
                let values = float_values(&series.clone().into_column())?;
                Ok(values
                    .into_iter()
                    .map(|v| v.unwrap_or(f64::NAN))
                    .collect())
            }
            Self::Table(df) => Err(RulError::ShapeMismatch {
                expected: 1,
                got: df.width(),
            }),
        }
    }

    /// Values as a `rows x columns` matrix; a vector becomes one column.
    pub fn to_matrix(&self) -> Result<Array2<f64>> {
        match self {
            Self::Vector(series) => {
                let df = DataFrame::new(vec![Column::from(series.clone())])?;
                Ok(df.to_ndarray::<Float64Type>(IndexOrder::C)?)
            }
            Self::Table(df) => Ok(df.to_ndarray::<Float64Type>(IndexOrder::C)?),
        }
    }

    /// The values as a table, a vector becoming its single column.
    pub fn to_frame(&self) -> Result<DataFrame> {
        match self {
            Self::Vector(series) => Ok(DataFrame::new(vec![Column::from(series.clone())])?),
            Self::Table(df) => Ok(df.clone()),
        }
    }
}

/// Serializable summary of a transformer, for logs and reproducibility.
#[derive(Debug, Clone, Serialize)]
pub struct TransformerDescription {
    /// Input columns surviving the feature pipeline; `None` before fit.
    pub features: Option<Vec<String>>,
    pub n_features: Option<usize>,
    pub target_column: TargetColumn,
    pub transformer_x: Value,
    pub transformer_y: Value,
}

#[derive(Debug, Clone)]
struct FittedFeatures {
    names: Vec<String>,
    n_features: usize,
}

#[derive(Debug, Clone)]
pub struct Transformer {
    target: TargetColumn,
    transformer_x: Box<dyn Stage>,
    transformer_y: Box<dyn Stage>,
    disable_resampling_when_fitting: bool,
    features: Option<FittedFeatures>,
    target_fitted: bool,
}

impl Transformer {
    /// Create an unfitted transformer with an identity target pipeline.
    pub fn new(target: impl Into<TargetColumn>, transformer_x: impl Stage + 'static) -> Self {
        Self {
            target: target.into(),
            transformer_x: Box::new(transformer_x),
            transformer_y: Box::new(Identity),
            disable_resampling_when_fitting: true,
            features: None,
            target_fitted: false,
        }
    }

    /// Every column through numeric conversion, identity target.
    pub fn simple(target: impl Into<TargetColumn>) -> Self {
        Self::new(target, simple_pipeline(std::iter::empty::<String>()))
    }

    /// Pair the target with a timestamp column; the target pipeline then
    /// receives `(time, target...)`.
    #[must_use]
    pub fn with_time_feature(mut self, time: impl Into<String>) -> Self {
        self.target = self.target.with_time_feature(time);
        self
    }

    #[must_use]
    pub fn with_target_pipeline(mut self, transformer_y: impl Stage + 'static) -> Self {
        self.transformer_y = Box::new(transformer_y);
        self.target_fitted = false;
        self
    }

    /// Whether the `resampler` step is switched off while fitting.
    /// Default: true.
    #[must_use]
    pub fn with_resampling_disabled_on_fit(mut self, disabled: bool) -> Self {
        self.disable_resampling_when_fitting = disabled;
        self
    }

    pub fn target(&self) -> &TargetColumn {
        &self.target
    }

    pub fn transformer_x(&self) -> &dyn Stage {
        self.transformer_x.as_ref()
    }

    pub fn transformer_y(&self) -> &dyn Stage {
        self.transformer_y.as_ref()
    }

    /// Mutable access to the feature pipeline, e.g. to toggle a step.
    pub fn transformer_x_mut(&mut self) -> &mut dyn Stage {
        self.transformer_x.as_mut()
    }

    pub fn is_fitted(&self) -> bool {
        self.features.is_some() && self.target_fitted
    }

    /// Fit both pipelines on the first `proportion` of the lives of `dataset`.
    ///
    /// While fitting, the `resampler` step of each pipeline is switched off
    /// (unless [`Self::with_resampling_disabled_on_fit`] turned that off).
    /// Afterwards the step returns to the state it had before the call, so a
    /// resampler disabled by the caller stays disabled rather than being
    /// re-enabled.
    pub fn fit<D>(&mut self, dataset: &D, proportion: f64) -> Result<()>
    where
        D: LivesDataset + ?Sized,
    {
        info!(lives = dataset.n_lives(), proportion, "fitting transformer");
        let df = dataset.to_frame(proportion)?;
        self.fit_frame(&df)
    }

    /// Fit both pipelines on an already materialized table.
    ///
    /// Resampling is handled as in [`Self::fit`].
    pub fn fit_frame(&mut self, df: &DataFrame) -> Result<()> {
        self.fit_x(df)?;
        self.fit_y(df)?;
        info!(
            rows = df.height(),
            n_features = self.features.as_ref().map_or(0, |f| f.n_features),
            "transformer fitted"
        );
        Ok(())
    }

    /// Fit the feature pipeline and record the surviving feature names.
    ///
    /// The output width is probed by transforming the first two rows.
    pub fn fit_x(&mut self, df: &DataFrame) -> Result<()> {
        self.features = None;
        fit_without_resampling(
            self.transformer_x.as_mut(),
            df,
            self.disable_resampling_when_fitting,
        )?;
        let probe = self.transformer_x.transform(&df.head(Some(2)))?;
        let names = self.transformer_x.feature_names_out(column_names(df));
        if names.len() != probe.width() {
            warn!(
                tracked = names.len(),
                produced = probe.width(),
                "feature names do not match the pipeline output width"
            );
        }
        debug!(features = ?names, "feature pipeline fitted");
        self.features = Some(FittedFeatures {
            names,
            n_features: probe.width(),
        });
        Ok(())
    }

    /// Fit the target pipeline on the target slice of `df`.
    pub fn fit_y(&mut self, df: &DataFrame) -> Result<()> {
        self.target_fitted = false;
        let slice = self.target_slice(df)?;
        fit_without_resampling(
            self.transformer_y.as_mut(),
            &slice,
            self.disable_resampling_when_fitting,
        )?;
        self.target_fitted = true;
        Ok(())
    }

    /// Feature matrix and target of one life.
    pub fn transform(&self, life: &DataFrame) -> Result<(Array2<f64>, TargetValues)> {
        if !self.is_fitted() {
            return Err(RulError::not_fitted("Transformer"));
        }
        Ok((self.transform_x(life)?, self.transform_y(life)?))
    }

    /// Feature matrix of one life.
    pub fn transform_x(&self, life: &DataFrame) -> Result<Array2<f64>> {
        let df = self.transform_x_frame(life)?;
        Ok(df.to_ndarray::<Float64Type>(IndexOrder::C)?)
    }

    /// Feature table of one life, columns named after the feature pipeline output.
    pub fn transform_x_frame(&self, life: &DataFrame) -> Result<DataFrame> {
        if self.features.is_none() {
            return Err(RulError::not_fitted("Transformer feature pipeline"));
        }
        self.transformer_x.transform(life)
    }

    /// Target of one life.
    pub fn transform_y(&self, life: &DataFrame) -> Result<TargetValues> {
        if !self.target_fitted {
            return Err(RulError::not_fitted("Transformer target pipeline"));
        }
        let slice = self.target_slice(life)?;
        Ok(TargetValues::squeeze(self.transformer_y.transform(&slice)?))
    }

    /// Number of columns produced by the feature pipeline.
    pub fn n_features(&self) -> Result<usize> {
        self.features
            .as_ref()
            .map(|f| f.n_features)
            .ok_or_else(|| RulError::not_fitted("Transformer"))
    }

    /// Input columns surviving every selection stage of the feature pipeline.
    pub fn features(&self) -> Result<&[String]> {
        self.features
            .as_ref()
            .map(|f| f.names.as_slice())
            .ok_or_else(|| RulError::not_fitted("Transformer"))
    }

    pub fn description(&self) -> TransformerDescription {
        TransformerDescription {
            features: self.features.as_ref().map(|f| f.names.clone()),
            n_features: self.features.as_ref().map(|f| f.n_features),
            target_column: self.target.clone(),
            transformer_x: self.transformer_x.describe(),
            transformer_y: self.transformer_y.describe(),
        }
    }

    fn target_slice(&self, df: &DataFrame) -> Result<DataFrame> {
        select_strict(df, &self.target.columns())
    }
}

/// Fit `stage`, with its resampling step switched off when `disable` is set.
///
/// The step is put back in the state it had before, whether or not the fit
/// succeeded.
fn fit_without_resampling(stage: &mut dyn Stage, df: &DataFrame, disable: bool) -> Result<()> {
    let previous = stage
        .as_pipeline()
        .and_then(|pipeline| pipeline.is_enabled(RESAMPLER_STEP_NAME));
    if disable {
        step_set_enable(stage, RESAMPLER_STEP_NAME, false);
    }
    let fitted = stage.fit(df);
    if let Some(enabled) = previous {
        step_set_enable(stage, RESAMPLER_STEP_NAME, enabled);
    }
    fitted
}
