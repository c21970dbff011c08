//! Data model for remaining-useful-life (RUL) prognostics.
//!
//! - **dataset**: the dataset-of-lives contract and in-memory implementations
//! - **target**: identity of the target column(s)
//! - **frame**: name-based DataFrame helpers tolerant of heterogeneous schemas
//! - **error**: the shared error type

pub mod dataset;
pub mod error;
pub mod frame;
pub mod target;

pub use dataset::{FoldedDataset, InMemoryLives, LIFE_ID_COLUMN, LivesDataset, life_id_column};
pub use error::{Result, RulError};
pub use target::TargetColumn;
