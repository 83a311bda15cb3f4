//! DataFrame helpers with column validation
//!
//! Input tables come from hand-maintained CSVs, so every column read goes
//! through an explicit presence check that names the file and the columns
//! that *are* available.

use crate::error::InputError;
use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

/// Read a CSV with header, full-file schema inference and pandas-like NA tokens
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let parse_options = CsvParseOptions::default().with_null_values(Some(
        NullValues::AllColumns(vec!["NA".into(), "NaN".into(), "nan".into(), "null".into()]),
    ));

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(parse_options)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
        .finish()
        .with_context(|| format!("Failed to load CSV: {:?}", path))
}

/// Check that all `columns` are present in `df`
///
/// # Errors
/// [`InputError::MissingColumn`] for the first absent column.
pub fn require_columns(df: &DataFrame, columns: &[&str], context: &str) -> Result<()> {
    let available: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for &expected in columns {
        if !available.iter().any(|c| c == expected) {
            return Err(InputError::MissingColumn {
                context: context.to_string(),
                column: expected.to_string(),
                available,
            }
            .into());
        }
    }

    Ok(())
}

/// Cast `name` to `dtype`, failing if any non-null cell does not convert
fn strict_column(
    df: &DataFrame,
    name: &str,
    dtype: &DataType,
    expected: &'static str,
    context: &str,
) -> Result<Column> {
    require_columns(df, &[name], context)?;
    df.column(name)?.strict_cast(dtype).map_err(|_| {
        InputError::WrongType {
            context: context.to_string(),
            column: name.to_string(),
            expected,
        }
        .into()
    })
}

/// Extract a numeric column as `Option<f64>` (nulls and NaN become `None`)
///
/// # Errors
/// [`InputError::WrongType`] if a non-missing cell is not a number.
pub fn f64_values(df: &DataFrame, name: &str, context: &str) -> Result<Vec<Option<f64>>> {
    let casted = strict_column(df, name, &DataType::Float64, "numeric", context)?;

    Ok(casted
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Extract an integer id column as `Option<i64>`
pub fn i64_values(df: &DataFrame, name: &str, context: &str) -> Result<Vec<Option<i64>>> {
    let casted = strict_column(df, name, &DataType::Int64, "integer ids", context)?;

    Ok(casted.i64()?.into_iter().collect())
}

/// Extract a label column as `Option<String>` (numbers are stringified)
pub fn string_values(df: &DataFrame, name: &str, context: &str) -> Result<Vec<Option<String>>> {
    require_columns(df, &[name], context)?;
    let casted = df
        .column(name)?
        .cast(&DataType::String)
        .with_context(|| format!("{}: column '{}' cannot be read as text", context, name))?;

    Ok(casted
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}
