//! Fit/transform stages for remaining-useful-life feature and target processing.
//!
//! A [`Stage`] learns from a whole table and is then applied to one life at a
//! time. Stages are composed into a named [`Pipeline`] whose steps can be
//! switched off without changing its structure.
//!
//! - **stage**: the stage contract
//! - **pipeline**: the named step registry and the enable switch
//! - **selection**: name, null-proportion and variance based column selection
//! - **target**: transforms of the target signal
//! - **numeric**, **scaling**, **outliers**, **imputation**, **resample**:
//!   numeric stages used by the ready-made pipelines
//! - **factory** / **options**: the ready-made pipelines and their configuration

pub mod factory;
pub mod imputation;
pub mod numeric;
pub mod options;
pub mod outliers;
pub mod pipeline;
pub mod resample;
pub mod scaling;
pub mod selection;
pub mod stage;
pub mod stats;
pub mod target;

pub use factory::{simple_pipeline, transformation_pipeline};
pub use imputation::ForwardFillImputer;
pub use numeric::ToNumeric;
pub use options::{PipelineOptions, ScalerKind};
pub use outliers::IqrOutlierClipper;
pub use pipeline::{
    Pipeline, PipelineStep, RESAMPLER_STEP_NAME, SELECTOR_STEP_NAME, StepSlot, step_set_enable,
};
pub use resample::Resampler;
pub use scaling::{MinMaxScaler, RobustScaler};
pub use selection::{
    ByNameFeatureSelector, DiscardByNameFeatureSelector, NullProportionSelector, VarianceThreshold,
};
pub use stage::{Identity, Stage};
pub use target::{
    CLASS_COLUMN, HealthPercentage, PiecewiseRul, PiecewiseRulQuantile, RulBinarizer,
    TargetToClasses,
};
