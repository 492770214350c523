//! Recommender - end-to-end pipeline over injected reference data
//!
//! Reading → rule-based ranking and classifier predictions (independent) →
//! merge → final ranked list. Reference data and the classifier are built
//! once and shared; every call after the first reuses the trained model.

use crate::classifier::{CropClassifier, CropProbability};
use crate::config::EngineConfig;
use crate::data::ReferenceData;
use crate::error::{RecommendError, Result};
use crate::merger::RecommendationMerger;
use crate::scorer::CropScorer;
use crate::types::{ScoreRecord, SoilReading};
use anyhow::Context;
use std::sync::Arc;

pub struct Recommender {
    data: Arc<ReferenceData>,
    config: EngineConfig,
    classifier: CropClassifier,
}

impl Recommender {
    pub fn new(data: Arc<ReferenceData>, config: EngineConfig) -> Self {
        let classifier = CropClassifier::new(Arc::clone(&data), &config);
        Self { data, config, classifier }
    }

    /// Load both reference tables from the configured paths
    ///
    /// An unreadable table degrades to an empty one; a table with missing
    /// columns is a hard error.
    pub fn from_config(config: EngineConfig) -> anyhow::Result<Self> {
        config.validate().context("Invalid engine configuration")?;

        let data = ReferenceData::load_or_empty(&config.crop_data_path, &config.market_data_path).with_context(|| {
            format!(
                "Failed to load reference data from {:?} and {:?}",
                config.crop_data_path, config.market_data_path
            )
        })?;

        Ok(Self::new(Arc::new(data), config))
    }

    pub fn data(&self) -> &ReferenceData {
        &self.data
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn classifier(&self) -> &CropClassifier {
        &self.classifier
    }

    pub fn scorer(&self) -> CropScorer<'_> {
        CropScorer::new(&self.data, &self.config)
    }

    /// Final merged ranking for a reading
    ///
    /// `year` defaults to the configured reference year. With no crop table
    /// the result is empty rather than an error.
    ///
    /// # Errors
    /// `MissingParameter` if nitrogen, phosphorus, potassium or pH is absent.
    pub fn recommend(&self, reading: &SoilReading, year: Option<i32>) -> Result<Vec<ScoreRecord>> {
        reading.core()?;
        let year = year.unwrap_or(self.config.reference_year);

        let rule_list = self
            .scorer()
            .rank(reading, reading.month, year, self.config.rule_limit);

        let predictions: Vec<CropProbability> = match self.classifier.predict(reading) {
            Ok(predictions) => predictions,
            Err(RecommendError::EmptyTrainingSet) => {
                tracing::warn!("No crop requirements loaded, classifier skipped");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let merged = RecommendationMerger::new(&self.data, &self.config).merge(&predictions, &rule_list, reading, year);
        tracing::debug!(
            "Merged {} rule-based and {} classifier entries into {}",
            rule_list.len(),
            predictions.len().min(self.config.model_top_k),
            merged.len()
        );
        Ok(merged)
    }
}
