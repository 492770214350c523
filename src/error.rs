//! Error kinds raised by the recommendation engine
//!
//! Loader and configuration entry points wrap these in `anyhow` context where
//! the caller is a binary. Library functions return `RecommendError` directly.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommendError {
    /// A mandatory soil field (nitrogen, phosphorus, potassium, pH) is absent
    #[error("missing required parameter: {parameter}")]
    MissingParameter { parameter: &'static str },

    /// Inference was attempted before the classifier was fitted
    #[error("classifier has not been trained")]
    UntrainedModel,

    /// A reference table could not be read at all
    #[error("reference data unavailable at {path:?}: {source}")]
    DataUnavailable {
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },

    /// A reference table was readable but lacks expected columns
    #[error("{table} table is missing columns: {missing:?}")]
    MissingColumns {
        table: &'static str,
        missing: Vec<String>,
    },

    /// Column exists but could not be read with the expected type
    #[error("{table} table, column '{column}': {source}")]
    ColumnType {
        table: &'static str,
        column: String,
        #[source]
        source: polars::error::PolarsError,
    },

    /// No crop requirements to generate training samples from
    #[error("no crop requirements available for training")]
    EmptyTrainingSet,

    #[error("unknown crop: {crop}")]
    UnknownCrop { crop: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, RecommendError>;
