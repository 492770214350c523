//! DataFrame column helpers with schema validation
//!
//! Reference tables arrive as untyped CSV. These helpers check the expected
//! columns up front (so a renamed header fails loudly instead of producing an
//! empty table) and pull typed, null-aware columns out of a frame.

use crate::error::{RecommendError, Result};
use polars::prelude::*;
use std::collections::HashSet;

/// Check that every required column is present
///
/// # Errors
/// `MissingColumns` listing every absent column, in the order requested.
///
/// # Example
/// ```ignore
/// require_columns(&df, &["crop_name", "month"], "market")?;
/// ```
pub fn require_columns(df: &DataFrame, columns: &[&str], table: &'static str) -> Result<()> {
    let actual: HashSet<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    let missing: Vec<String> = columns
        .iter()
        .filter(|&&name| !actual.contains(name))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(RecommendError::MissingColumns { table, missing })
    }
}

/// Read a column as `f64`, casting integer columns
///
/// Nulls (and unparseable cells) come back as `None`.
pub fn f64_values(df: &DataFrame, column: &str, table: &'static str) -> Result<Vec<Option<f64>>> {
    let type_error = |source| RecommendError::ColumnType {
        table,
        column: column.to_string(),
        source,
    };

    let casted = df
        .column(column)
        .map_err(type_error)?
        .cast(&DataType::Float64)
        .map_err(type_error)?;

    Ok(casted.f64().map_err(type_error)?.into_iter().collect())
}

/// Read a column as owned strings
pub fn str_values(df: &DataFrame, column: &str, table: &'static str) -> Result<Vec<Option<String>>> {
    let type_error = |source| RecommendError::ColumnType {
        table,
        column: column.to_string(),
        source,
    };

    let casted = df
        .column(column)
        .map_err(type_error)?
        .cast(&DataType::String)
        .map_err(type_error)?;

    Ok(casted
        .str()
        .map_err(type_error)?
        .into_iter()
        .map(|opt| opt.map(|s| s.trim().to_string()))
        .collect())
}
