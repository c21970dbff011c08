//! Ordered registry of named stages with an enable switch.
//!
//! Each step of a [`Pipeline`] carries an explicit [`StepSlot`]: an active
//! stage, a disabled stage (kept so it can be re-enabled) or an inert
//! passthrough marker. The order of steps is fixed once the pipeline is
//! built; only the active/disabled tag of a named step can change.
//!
//! # Example
//!
//! ```ignore
//! use rul_transform::pipeline::{Pipeline, step_set_enable};
//!
//! let mut pipeline = Pipeline::new()
//!     .add_step("initial_selection", ByNameFeatureSelector::new(["f1", "f2"]))
//!     .add_passthrough("resampler")
//!     .add_step("to_numeric", ToNumeric);
//!
//! step_set_enable(&mut pipeline, "resampler", false);
//! pipeline.fit(&frame)?;
//! ```

use std::borrow::Cow;

use polars::prelude::DataFrame;
use rul_model::Result;
use serde_json::{Value, json};
use tracing::debug;

use crate::stage::Stage;

/// Name of the step toggled off while fitting.
pub const RESAMPLER_STEP_NAME: &str = "resampler";

/// Name of the variance selection step in [`crate::transformation_pipeline`].
pub const SELECTOR_STEP_NAME: &str = "selector";

/// State of one pipeline step.
#[derive(Debug, Clone)]
pub enum StepSlot {
    /// The stage runs on fit and transform.
    Active(Box<dyn Stage>),
    /// The stage is skipped and its input passed through unchanged.
    Disabled(Box<dyn Stage>),
    /// Inert marker; cannot be enabled.
    Passthrough,
}

impl StepSlot {
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Active(_) => "active",
            Self::Disabled(_) => "disabled",
            Self::Passthrough => "passthrough",
        }
    }

    pub fn stage(&self) -> Option<&dyn Stage> {
        match self {
            Self::Active(stage) | Self::Disabled(stage) => Some(stage.as_ref()),
            Self::Passthrough => None,
        }
    }
}

/// A named step of a pipeline.
#[derive(Debug, Clone)]
pub struct PipelineStep {
    name: String,
    slot: StepSlot,
}

impl PipelineStep {
    pub fn new(name: impl Into<String>, stage: impl Stage + 'static) -> Self {
        Self::boxed(name, Box::new(stage))
    }

    pub fn boxed(name: impl Into<String>, stage: Box<dyn Stage>) -> Self {
        Self {
            name: name.into(),
            slot: StepSlot::Active(stage),
        }
    }

    pub fn passthrough(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot: StepSlot::Passthrough,
        }
    }

    /// An active step when `stage` is set, a passthrough otherwise.
    pub fn optional(name: impl Into<String>, stage: Option<Box<dyn Stage>>) -> Self {
        match stage {
            Some(stage) => Self::boxed(name, stage),
            None => Self::passthrough(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slot(&self) -> &StepSlot {
        &self.slot
    }

    fn set_enabled(&mut self, enabled: bool) {
        let slot = std::mem::replace(&mut self.slot, StepSlot::Passthrough);
        self.slot = match (slot, enabled) {
            (StepSlot::Active(stage) | StepSlot::Disabled(stage), true) => StepSlot::Active(stage),
            (StepSlot::Active(stage) | StepSlot::Disabled(stage), false) => {
                StepSlot::Disabled(stage)
            }
            (StepSlot::Passthrough, _) => StepSlot::Passthrough,
        };
    }
}

/// An ordered pipeline of named stages.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    steps: Vec<PipelineStep>,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: Vec<PipelineStep>) -> Self {
        Self { steps }
    }

    /// Add a stage to the end of the pipeline.
    #[must_use]
    pub fn add_step(mut self, name: impl Into<String>, stage: impl Stage + 'static) -> Self {
        self.steps.push(PipelineStep::new(name, stage));
        self
    }

    /// Add an inert marker to the end of the pipeline.
    #[must_use]
    pub fn add_passthrough(mut self, name: impl Into<String>) -> Self {
        self.steps.push(PipelineStep::passthrough(name));
        self
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    /// List step names in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(PipelineStep::name).collect()
    }

    /// The stage behind `name`, if the step exists and is not a passthrough.
    pub fn step(&self, name: &str) -> Option<&dyn Stage> {
        self.steps
            .iter()
            .find(|step| step.name == name)
            .and_then(|step| step.slot.stage())
    }

    /// Whether the step `name` is active; `None` if absent or a passthrough.
    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        let step = self.steps.iter().find(|step| step.name == name)?;
        match step.slot {
            StepSlot::Active(_) => Some(true),
            StepSlot::Disabled(_) => Some(false),
            StepSlot::Passthrough => None,
        }
    }

    /// Enable or disable every step named `name`. Passthrough steps are left alone.
    pub fn set_step_enabled(&mut self, name: &str, enabled: bool) {
        for step in self.steps.iter_mut().filter(|step| step.name == name) {
            step.set_enabled(enabled);
        }
    }
}

impl Stage for Pipeline {
    fn kind(&self) -> &'static str {
        "Pipeline"
    }

    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        let mut current = Cow::Borrowed(df);
        let last = self.steps.len().saturating_sub(1);
        for (idx, step) in self.steps.iter_mut().enumerate() {
            match &mut step.slot {
                StepSlot::Active(stage) => {
                    debug!(step = %step.name, kind = stage.kind(), "fitting step");
                    if idx == last {
                        stage.fit(&current)?;
                    } else {
                        current = Cow::Owned(stage.fit_transform(&current)?);
                    }
                }
                StepSlot::Disabled(stage) => {
                    debug!(step = %step.name, "step disabled, passing input through");
                    stage.fit_disabled(&current)?;
                }
                StepSlot::Passthrough => {}
            }
        }
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut current = Cow::Borrowed(df);
        for step in &self.steps {
            if let StepSlot::Active(stage) = &step.slot {
                current = Cow::Owned(stage.transform(&current)?);
            }
        }
        Ok(current.into_owned())
    }

    fn feature_names_out(&self, input: Vec<String>) -> Vec<String> {
        self.steps.iter().fold(input, |names, step| match &step.slot {
            StepSlot::Active(stage) => stage.feature_names_out(names),
            StepSlot::Disabled(_) | StepSlot::Passthrough => names,
        })
    }

    fn describe(&self) -> Value {
        let steps: Vec<Value> = self
            .steps
            .iter()
            .map(|step| {
                json!({
                    "name": step.name,
                    "state": step.slot.state_name(),
                    "stage": step.slot.stage().map_or(Value::Null, |stage| stage.describe()),
                })
            })
            .collect();
        json!({ "kind": self.kind(), "steps": steps })
    }

    fn as_pipeline(&self) -> Option<&Pipeline> {
        Some(self)
    }

    fn as_pipeline_mut(&mut self) -> Option<&mut Pipeline> {
        Some(self)
    }

    fn clone_box(&self) -> Box<dyn Stage> {
        Box::new(self.clone())
    }
}

/// Enable or disable the step `step_name` of `stage`.
///
/// No-op when `stage` is not a [`Pipeline`], when no step has that name, or
/// when the step is a passthrough marker. Only top-level steps are visited.
pub fn step_set_enable(stage: &mut dyn Stage, step_name: &str, enabled: bool) {
    if let Some(pipeline) = stage.as_pipeline_mut() {
        pipeline.set_step_enabled(step_name, enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Identity;
    use polars::prelude::{Column, IntoColumn, NamedFrom, Series};
    use rul_model::RulError;

    /// Counts fit calls and doubles every value on transform.
    #[derive(Debug, Clone, Default)]
    struct Doubler {
        fits: usize,
        disabled_fits: usize,
    }

    impl Stage for Doubler {
        fn kind(&self) -> &'static str {
            "Doubler"
        }
        fn fit(&mut self, _df: &DataFrame) -> Result<()> {
            self.fits += 1;
            Ok(())
        }
        fn fit_disabled(&mut self, _df: &DataFrame) -> Result<()> {
            self.disabled_fits += 1;
            Ok(())
        }
        fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
            rul_model::frame::map_float_columns(df, |_, v| v.map(|v| v * 2.0))
        }
        fn describe(&self) -> Value {
            json!({ "kind": "Doubler", "fits": self.fits })
        }
        fn clone_box(&self) -> Box<dyn Stage> {
            Box::new(self.clone())
        }
    }

    fn frame() -> DataFrame {
        let cols: Vec<Column> = vec![Series::new("x".into(), vec![1.0, 2.0]).into_column()];
        DataFrame::new(cols).unwrap()
    }

    fn values(df: &DataFrame) -> Vec<f64> {
        df.column("x")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect()
    }

    fn doubler_fits(pipeline: &Pipeline, name: &str) -> usize {
        let described = pipeline.step(name).unwrap().describe();
        usize::try_from(described["fits"].as_u64().unwrap()).unwrap()
    }

    #[test]
    fn disabled_step_is_identity() {
        let mut pipeline = Pipeline::new()
            .add_step("resampler", Doubler::default())
            .add_step("tail", Identity);

        step_set_enable(&mut pipeline, RESAMPLER_STEP_NAME, false);
        assert_eq!(pipeline.is_enabled("resampler"), Some(false));
        pipeline.fit(&frame()).unwrap();
        assert_eq!(doubler_fits(&pipeline, "resampler"), 0);
        assert_eq!(values(&pipeline.transform(&frame()).unwrap()), vec![1.0, 2.0]);

        step_set_enable(&mut pipeline, RESAMPLER_STEP_NAME, true);
        assert_eq!(pipeline.is_enabled("resampler"), Some(true));
        assert_eq!(values(&pipeline.transform(&frame()).unwrap()), vec![2.0, 4.0]);
    }

    #[test]
    fn passthrough_cannot_be_enabled() {
        let mut pipeline = Pipeline::new()
            .add_passthrough("resampler")
            .add_step("tail", Doubler::default());
        step_set_enable(&mut pipeline, "resampler", true);
        assert_eq!(pipeline.is_enabled("resampler"), None);
        assert!(pipeline.step("resampler").is_none());
        assert_eq!(pipeline.step_names(), vec!["resampler", "tail"]);
    }

    #[test]
    fn unknown_step_and_non_pipeline_are_noops() {
        let mut pipeline = Pipeline::new().add_step("tail", Doubler::default());
        step_set_enable(&mut pipeline, "missing", false);
        assert_eq!(pipeline.is_enabled("tail"), Some(true));

        let mut identity = Identity;
        step_set_enable(&mut identity, "tail", false);
        assert_eq!(identity.transform(&frame()).unwrap().height(), 2);
    }

    #[test]
    fn fit_chains_intermediate_outputs() {
        let mut pipeline = Pipeline::new()
            .add_step("first", Doubler::default())
            .add_step("second", Doubler::default());
        pipeline.fit(&frame()).unwrap();
        assert_eq!(doubler_fits(&pipeline, "first"), 1);
        assert_eq!(doubler_fits(&pipeline, "second"), 1);
        assert_eq!(values(&pipeline.transform(&frame()).unwrap()), vec![4.0, 8.0]);
    }

    #[test]
    fn describe_lists_steps_in_order() {
        let pipeline = Pipeline::new()
            .add_passthrough("initial_selection")
            .add_step("scale", Doubler::default());
        let described = pipeline.describe();
        assert_eq!(described["kind"], "Pipeline");
        assert_eq!(described["steps"][0]["state"], "passthrough");
        assert_eq!(described["steps"][1]["name"], "scale");
        assert_eq!(described["steps"][1]["stage"]["kind"], "Doubler");
    }

    #[test]
    fn errors_propagate_from_steps() {
        #[derive(Debug, Clone)]
        struct Failing;
        impl Stage for Failing {
            fn kind(&self) -> &'static str {
                "Failing"
            }
            fn fit(&mut self, _df: &DataFrame) -> Result<()> {
                Err(RulError::EmptyData("nothing to learn".to_string()))
            }
            fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
                Ok(df.clone())
            }
            fn describe(&self) -> Value {
                Value::Null
            }
            fn clone_box(&self) -> Box<dyn Stage> {
                Box::new(self.clone())
            }
        }

        let mut pipeline = Pipeline::new().add_step("failing", Failing);
        assert!(matches!(
            pipeline.fit(&frame()),
            Err(RulError::EmptyData(_))
        ));
    }
}
