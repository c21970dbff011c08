//! A dataset of lives stored as one CSV file per life.

use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use rul_model::LivesDataset;
use tracing::{debug, info};

use crate::discovery::list_csv_files;
use crate::error::{IngestError, Result};
use crate::reader::read_life_csv;

/// Lives read lazily from the CSV files of a directory.
///
/// Lives are ordered by file name; a life is read from disk every time it is
/// requested.
#[derive(Debug, Clone)]
pub struct CsvLivesDataset {
    root: PathBuf,
    files: Vec<PathBuf>,
    rul_column: String,
}

impl CsvLivesDataset {
    /// Discover the lives under `root`. Fails when the directory holds no CSV file.
    pub fn open(root: impl AsRef<Path>, rul_column: impl Into<String>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let files = list_csv_files(&root)?;
        if files.is_empty() {
            return Err(IngestError::NoLives { path: root });
        }
        info!(path = %root.display(), lives = files.len(), "opened CSV dataset");
        Ok(Self {
            root,
            files,
            rul_column: rul_column.into(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Source file of every life, in life order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Read the life at `index`, checking that it carries the target column.
    pub fn read_life(&self, index: usize) -> Result<DataFrame> {
        let path = self
            .files
            .get(index)
            .ok_or(IngestError::LifeOutOfRange {
                index,
                n_lives: self.files.len(),
            })?;
        debug!(index, path = %path.display(), "reading life");
        let df = read_life_csv(path)?;
        if df.column(&self.rul_column).is_err() {
            return Err(IngestError::MissingTarget {
                column: self.rul_column.clone(),
                path: path.clone(),
            });
        }
        Ok(df)
    }
}

impl LivesDataset for CsvLivesDataset {
    fn n_lives(&self) -> usize {
        self.files.len()
    }

    fn get_life(&self, index: usize) -> rul_model::Result<DataFrame> {
        Ok(self.read_life(index)?)
    }

    fn rul_column(&self) -> &str {
        &self.rul_column
    }
}
