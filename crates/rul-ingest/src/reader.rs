//! CSV reading and writing of single lives.

use std::fs::File;
use std::path::Path;

use polars::prelude::{CsvReadOptions, CsvWriter, DataFrame, SerReader, SerWriter};

use crate::error::{IngestError, Result};

/// Rows used to infer column types.
pub const INFER_SCHEMA_ROWS: usize = 100;

/// Reads one life from a CSV file with a single header row.
pub fn read_life_csv(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if df.height() == 0 {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    Ok(df)
}

/// Writes a table to `path` as CSV with a header row.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path).map_err(|e| IngestError::FileWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| IngestError::FileWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{IntoColumn, NamedFrom, Series};
    use tempfile::TempDir;

    #[test]
    fn reads_header_and_types() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("life.csv");
        std::fs::write(&path, "feature1,RUL\n0.5,3\n1.5,2\n2.5,1\n").unwrap();

        let df = read_life_csv(&path).unwrap();
        assert_eq!(df.shape(), (3, 2));
        assert!(df.column("RUL").unwrap().dtype().is_integer());
    }

    #[test]
    fn header_only_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("life.csv");
        std::fs::write(&path, "feature1,RUL\n").unwrap();
        assert!(matches!(
            read_life_csv(&path),
            Err(IngestError::EmptyCsv { .. })
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            read_life_csv(&dir.path().join("absent.csv")),
            Err(IngestError::FileNotFound { .. })
        ));
    }

    #[test]
    fn written_tables_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let mut df = DataFrame::new(vec![
            Series::new("x".into(), vec![1.0, 2.0]).into_column(),
        ])
        .unwrap();
        write_csv(&mut df, &path).unwrap();
        let back = read_life_csv(&path).unwrap();
        assert_eq!(back.shape(), (2, 1));
    }
}
