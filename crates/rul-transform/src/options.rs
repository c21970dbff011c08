//! Configuration options for building a feature pipeline.

use serde::{Deserialize, Serialize};

/// Scaling applied near the end of the feature pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalerKind {
    /// Leave values unscaled.
    None,
    /// Scale each column into `[0, 1]`.
    MinMax,
    /// Center on the median, scale by the interquartile range.
    #[default]
    Robust,
}

/// Options consumed by [`crate::transformation_pipeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Columns to keep. Mutually exclusive with `discard`.
    pub features: Option<Vec<String>>,

    /// Columns to drop. Mutually exclusive with `features`.
    pub discard: Option<Vec<String>>,

    /// Keep every n-th row at transform time.
    pub resample_every: Option<usize>,

    /// IQR factor for outlier removal; `None` disables the step.
    pub outlier_iqr_factor: Option<f64>,

    /// Columns whose finite proportion does not exceed this are dropped.
    /// Default: 0.5.
    pub min_null_proportion: f64,

    /// Columns whose variance does not exceed this are dropped.
    /// Default: 0.0 (drops constant columns).
    pub variance_threshold: f64,

    pub scaler: ScalerKind,

    /// Forward fill missing values after scaling.
    /// Default: true.
    pub impute: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            features: None,
            discard: None,
            resample_every: None,
            outlier_iqr_factor: None,
            min_null_proportion: 0.5,
            variance_threshold: 0.0,
            scaler: ScalerKind::default(),
            impute: true,
        }
    }
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = Some(features.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_discard<I, S>(mut self, discard: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.discard = Some(discard.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_resample_every(mut self, every: usize) -> Self {
        self.resample_every = Some(every);
        self
    }

    pub fn with_outlier_removal(mut self, k: f64) -> Self {
        self.outlier_iqr_factor = Some(k);
        self
    }

    pub fn with_min_null_proportion(mut self, proportion: f64) -> Self {
        self.min_null_proportion = proportion;
        self
    }

    pub fn with_variance_threshold(mut self, threshold: f64) -> Self {
        self.variance_threshold = threshold;
        self
    }

    pub fn with_scaler(mut self, scaler: ScalerKind) -> Self {
        self.scaler = scaler;
        self
    }

    pub fn with_imputation(mut self, impute: bool) -> Self {
        self.impute = impute;
        self
    }
}
