//! Error types for loading lives from disk.

use std::path::PathBuf;

use rul_model::RulError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to write file {path}: {message}")]
    FileWrite { path: PathBuf, message: String },

    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV file has no rows.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// No life files in the dataset directory.
    #[error("no CSV lives found in {path}")]
    NoLives { path: PathBuf },

    /// The target column is missing from a life.
    #[error("target column '{column}' not found in {path}")]
    MissingTarget { column: String, path: PathBuf },

    #[error("life index {index} out of range ({n_lives} lives)")]
    LifeOutOfRange { index: usize, n_lives: usize },
}

impl From<IngestError> for RulError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::MissingTarget { column, .. } => Self::MissingColumn(column),
            IngestError::LifeOutOfRange { .. } => Self::InvalidParameter(err.to_string()),
            IngestError::EmptyCsv { .. } | IngestError::NoLives { .. } => {
                Self::EmptyData(err.to_string())
            }
            other => Self::Io(std::io::Error::other(other)),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
