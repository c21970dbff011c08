//! Error type shared by the model, transform and orchestration crates.

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RulError {
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    /// Configuration rejected at construction time.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A stage or transformer was used before `fit`.
    #[error("{what} is not fitted; call fit before transform")]
    NotFitted { what: String },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("empty data: {0}")]
    EmptyData(String),

    /// A stage that only accepts numeric matrices received another dtype.
    #[error("column '{column}' is not numeric (dtype {dtype})")]
    NonNumeric { column: String, dtype: String },

    /// A fitted stage received a table of a different width.
    #[error("expected {expected} columns, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RulError {
    pub fn not_fitted(what: impl Into<String>) -> Self {
        Self::NotFitted { what: what.into() }
    }
}

pub type Result<T> = std::result::Result<T, RulError>;
