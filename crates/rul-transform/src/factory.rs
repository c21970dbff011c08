//! Ready-made feature pipelines.

use rul_model::{Result, RulError};
use tracing::debug;

use crate::imputation::ForwardFillImputer;
use crate::numeric::ToNumeric;
use crate::options::{PipelineOptions, ScalerKind};
use crate::outliers::IqrOutlierClipper;
use crate::pipeline::{Pipeline, PipelineStep, RESAMPLER_STEP_NAME, SELECTOR_STEP_NAME};
use crate::resample::Resampler;
use crate::scaling::{MinMaxScaler, RobustScaler};
use crate::selection::{
    ByNameFeatureSelector, DiscardByNameFeatureSelector, NullProportionSelector, VarianceThreshold,
};
use crate::stage::Stage;

pub const INITIAL_SELECTION_STEP_NAME: &str = "initial_selection";
pub const TO_NUMERIC_STEP_NAME: &str = "to_numeric";
pub const OUTLIER_STEP_NAME: &str = "outlier_removal";
pub const NULL_PROPORTION_STEP_NAME: &str = "null_proportion";
pub const SCALER_STEP_NAME: &str = "scaler";
pub const IMPUTER_STEP_NAME: &str = "imputer";

/// Column selection followed by numeric conversion.
///
/// An empty `features` list keeps every column.
pub fn simple_pipeline<I, S>(features: I) -> Pipeline
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Pipeline::new()
        .add_step(INITIAL_SELECTION_STEP_NAME, ByNameFeatureSelector::new(features))
        .add_step(TO_NUMERIC_STEP_NAME, ToNumeric)
}

/// Build the canonical feature pipeline.
///
/// Steps, in order: `initial_selection`, `resampler`, `to_numeric`,
/// `outlier_removal`, `null_proportion`, `selector`, `scaler`, `imputer`.
/// Steps switched off by `options` stay in place as passthrough markers.
pub fn transformation_pipeline(options: &PipelineOptions) -> Result<Pipeline> {
    let initial: Option<Box<dyn Stage>> = match (&options.features, &options.discard) {
        (Some(_), Some(_)) => {
            return Err(RulError::Config(
                "features and discard cannot both be set".to_string(),
            ));
        }
        (Some(features), None) => Some(Box::new(ByNameFeatureSelector::new(features.clone()))),
        (None, Some(discard)) => Some(Box::new(DiscardByNameFeatureSelector::new(discard.clone()))),
        (None, None) => None,
    };
    let resampler: Option<Box<dyn Stage>> = match options.resample_every {
        Some(every) => Some(Box::new(Resampler::new(every)?)),
        None => None,
    };
    let outliers: Option<Box<dyn Stage>> = options
        .outlier_iqr_factor
        .map(|k| Box::new(IqrOutlierClipper::new(k)) as Box<dyn Stage>);
    let scaler: Option<Box<dyn Stage>> = match options.scaler {
        ScalerKind::None => None,
        ScalerKind::MinMax => Some(Box::new(MinMaxScaler::default())),
        ScalerKind::Robust => Some(Box::new(RobustScaler::new())),
    };
    let imputer: Option<Box<dyn Stage>> = options
        .impute
        .then(|| Box::new(ForwardFillImputer) as Box<dyn Stage>);

    let pipeline = Pipeline::from_steps(vec![
        PipelineStep::optional(INITIAL_SELECTION_STEP_NAME, initial),
        PipelineStep::optional(RESAMPLER_STEP_NAME, resampler),
        PipelineStep::new(TO_NUMERIC_STEP_NAME, ToNumeric),
        PipelineStep::optional(OUTLIER_STEP_NAME, outliers),
        PipelineStep::new(
            NULL_PROPORTION_STEP_NAME,
            NullProportionSelector::new(options.min_null_proportion),
        ),
        PipelineStep::new(SELECTOR_STEP_NAME, VarianceThreshold::new(options.variance_threshold)),
        PipelineStep::optional(SCALER_STEP_NAME, scaler),
        PipelineStep::optional(IMPUTER_STEP_NAME, imputer),
    ]);
    debug!(steps = ?pipeline.step_names(), "built transformation pipeline");
    Ok(pipeline)
}
