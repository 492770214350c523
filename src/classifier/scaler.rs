//! Feature standardization (zero mean, unit variance)
//!
//! Fitted once on the training split; the same parameters are applied to the
//! test split and to every later inference.

use super::synthetic::FeatureRow;
use crate::types::Feature;

#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: FeatureRow,
    scale: FeatureRow,
}

impl StandardScaler {
    /// Fit per-feature mean and population standard deviation
    ///
    /// A constant feature gets scale 1.0 so it maps to 0 rather than NaN.
    pub fn fit(rows: &[FeatureRow]) -> Self {
        let mut mean = [0.0; Feature::COUNT];
        let mut scale = [1.0; Feature::COUNT];
        if rows.is_empty() {
            return Self { mean, scale };
        }

        let n = rows.len() as f64;
        for j in 0..Feature::COUNT {
            let mu = rows.iter().map(|r| r[j]).sum::<f64>() / n;
            let variance = rows.iter().map(|r| (r[j] - mu).powi(2)).sum::<f64>() / n;
            mean[j] = mu;
            let sd = variance.sqrt();
            if sd > f64::EPSILON {
                scale[j] = sd;
            }
        }

        Self { mean, scale }
    }

    pub fn transform(&self, row: &FeatureRow) -> FeatureRow {
        let mut out = [0.0; Feature::COUNT];
        for j in 0..Feature::COUNT {
            out[j] = (row[j] - self.mean[j]) / self.scale[j];
        }
        out
    }

    /// Training mean of each feature (used to impute absent optional inputs)
    pub fn mean(&self) -> &FeatureRow {
        &self.mean
    }

    pub fn scale(&self) -> &FeatureRow {
        &self.scale
    }
}
