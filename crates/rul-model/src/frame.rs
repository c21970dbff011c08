//! DataFrame helpers shared by the pipeline stages.
//!
//! Lives do not share one schema: a column can be present in some lives and
//! absent from others. Everything here resolves columns by name and widens
//! a missing column with nulls instead of relying on positions.

use polars::prelude::{
    Column, DataFrame, DataType, Float64Chunked, IntoColumn, IntoLazy, LazyFrame, PlSmallStr,
    UnionArgs, concat,
};
use tracing::warn;

use crate::error::{Result, RulError};

/// Column names of a frame, in frame order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Build a frame from columns; an empty column list yields an empty frame.
pub fn frame_from_columns(columns: Vec<Column>) -> Result<DataFrame> {
    if columns.is_empty() {
        return Ok(DataFrame::empty());
    }
    Ok(DataFrame::new(columns)?)
}

/// Select `names` from `df` in the given order.
///
/// A name the frame does not have is widened with an all-null `Float64`
/// column of the frame's height.
pub fn select_widening(df: &DataFrame, names: &[String]) -> Result<DataFrame> {
    let height = df.height();
    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        match df.column(name) {
            Ok(column) => columns.push(column.clone()),
            Err(_) => {
                warn!(column = %name, "column missing from life, filling with nulls");
                columns.push(Column::full_null(
                    PlSmallStr::from(name.as_str()),
                    height,
                    &DataType::Float64,
                ));
            }
        }
    }
    frame_from_columns(columns)
}

/// Select `names` from `df`, failing if any is absent.
pub fn select_strict(df: &DataFrame, names: &[&str]) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let column = df
            .column(name)
            .map_err(|_| RulError::MissingColumn((*name).to_string()))?;
        columns.push(column.clone());
    }
    frame_from_columns(columns)
}

/// Select columns by position, in the given order.
pub fn select_positions(df: &DataFrame, positions: &[usize]) -> Result<DataFrame> {
    let available = df.get_columns();
    let mut columns = Vec::with_capacity(positions.len());
    for &position in positions {
        let column = available.get(position).ok_or(RulError::ShapeMismatch {
            expected: position + 1,
            got: available.len(),
        })?;
        columns.push(column.clone());
    }
    frame_from_columns(columns)
}

pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Boolean
    )
}

/// Fail with [`RulError::NonNumeric`] on the first non-numeric column.
pub fn ensure_numeric(df: &DataFrame) -> Result<()> {
    for column in df.get_columns() {
        if !is_numeric_dtype(column.dtype()) {
            return Err(RulError::NonNumeric {
                column: column.name().to_string(),
                dtype: column.dtype().to_string(),
            });
        }
    }
    Ok(())
}

/// Values of a numeric column as `Float64`.
pub fn float_values(column: &Column) -> Result<Float64Chunked> {
    if !is_numeric_dtype(column.dtype()) {
        return Err(RulError::NonNumeric {
            column: column.name().to_string(),
            dtype: column.dtype().to_string(),
        });
    }
    let cast = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(cast.f64()?.clone())
}

/// Finite values of a numeric column; nulls, NaN and infinities are skipped.
pub fn finite_values(column: &Column) -> Result<Vec<f64>> {
    let values = float_values(column)?;
    Ok(values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect())
}

/// Apply `f` to every column of a numeric frame, producing `Float64` columns.
pub fn map_float_columns<F>(df: &DataFrame, mut f: F) -> Result<DataFrame>
where
    F: FnMut(usize, Option<f64>) -> Option<f64>,
{
    let mut columns = Vec::with_capacity(df.width());
    for (idx, column) in df.get_columns().iter().enumerate() {
        let values = float_values(column)?;
        let mapped: Float64Chunked = values.into_iter().map(|v| f(idx, v)).collect();
        columns.push(mapped.with_name(column.name().clone()).into_column());
    }
    frame_from_columns(columns)
}

/// Stack frames vertically over the union of their columns.
///
/// Columns are ordered by first appearance. A column missing from a frame is
/// filled with nulls, and each column takes the supertype of its dtypes
/// across all frames, so an integer life stacked with a float life stays
/// float.
pub fn concat_diagonal(frames: &[DataFrame]) -> Result<DataFrame> {
    if frames.is_empty() {
        return Err(RulError::EmptyData("no frames to concatenate".to_string()));
    }
    let lazy: Vec<LazyFrame> = frames.iter().map(|frame| frame.clone().lazy()).collect();
    let stacked = concat(
        lazy,
        UnionArgs {
            diagonal: true,
            to_supertypes: true,
            rechunk: true,
            ..Default::default()
        },
    )?
    .collect()?;
    Ok(stacked)
}
