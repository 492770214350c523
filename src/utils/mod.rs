//! Utility modules for crop scoring
//!
//! Contains shared functionality used across the scorers and loaders:
//! - Normalization: decay curves and min-max scaling onto [0, 1]
//! - Frame helpers: column validation and typed extraction from Polars frames

pub mod normalization;
pub mod frame_helpers;

// Re-export commonly used helpers
pub use normalization::{clamp_unit, min_max_normalize, nutrient_score, optional_range_score, range_score};
pub use frame_helpers::{f64_values, require_columns, str_values};
