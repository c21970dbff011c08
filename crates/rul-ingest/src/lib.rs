//! Loading of remaining-useful-life datasets from disk.
//!
//! A dataset directory holds one CSV file per life, each with a header row
//! and one row per time step. Lives are ordered by file name.
//!
//! ```ignore
//! use rul_ingest::CsvLivesDataset;
//! use rul_model::LivesDataset;
//!
//! let dataset = CsvLivesDataset::open("data/turbofan", "RUL")?;
//! let table = dataset.to_frame(0.5)?;
//! ```

mod dataset;
mod discovery;
mod error;
mod reader;

pub use dataset::CsvLivesDataset;
pub use discovery::list_csv_files;
pub use error::{IngestError, Result};
pub use reader::{INFER_SCHEMA_ROWS, read_life_csv, write_csv};
