//! Recommendation Merger - combines classifier and rule-based lists
//!
//! Merge is keyed by crop name:
//! - in both lists: combined = mean(model probability, rule combined score),
//!   soil/market sub-scores come from the rule entry
//! - classifier only: resolved by `MergePolicy` (neutral 0.5 placeholders, or
//!   recomputed soil/market scores)
//! - rule only: appended unchanged
//!
//! The merged list is sorted by combined score (stable, so ties keep
//! classifier order first, then rule order) and truncated.

use crate::classifier::CropProbability;
use crate::config::{EngineConfig, MergePolicy};
use crate::data::ReferenceData;
use crate::metrics::NEUTRAL_MARKET_SCORE;
use crate::scorer::CropScorer;
use crate::types::{CropRequirement, RecommendationSource, ScoreRecord, SoilReading};
use rustc_hash::{FxHashMap, FxHashSet};

/// Placeholder soil score for classifier-only crops under `NeutralDefaults`
pub const NEUTRAL_SOIL_SCORE: f64 = 0.5;

/// Entry for a crop found in both lists
pub fn merge_shared(prediction: &CropProbability, rule: &ScoreRecord) -> ScoreRecord {
    ScoreRecord {
        combined_score: (prediction.probability + rule.combined_score) / 2.0,
        source: RecommendationSource::Both,
        model_probability: Some(prediction.probability),
        ..rule.clone()
    }
}

/// Entry for a classifier-only crop with neutral sub-scores
pub fn neutral_entry(prediction: &CropProbability, crop: &CropRequirement) -> ScoreRecord {
    ScoreRecord {
        crop_name: crop.crop_name.clone(),
        soil_score: NEUTRAL_SOIL_SCORE,
        market_score: NEUTRAL_MARKET_SCORE,
        combined_score: prediction.probability,
        season: crop.season,
        growing_days: crop.growing_days,
        source: RecommendationSource::Model,
        model_probability: Some(prediction.probability),
    }
}

/// Merges the two recommendation lists for one reading
pub struct RecommendationMerger<'a> {
    data: &'a ReferenceData,
    config: &'a EngineConfig,
}

impl<'a> RecommendationMerger<'a> {
    pub fn new(data: &'a ReferenceData, config: &'a EngineConfig) -> Self {
        Self { data, config }
    }

    /// Merge with the configured classifier cut-off and output limit
    pub fn merge(
        &self,
        predictions: &[CropProbability],
        rule_list: &[ScoreRecord],
        reading: &SoilReading,
        year: i32,
    ) -> Vec<ScoreRecord> {
        self.merge_with_limit(predictions, rule_list, reading, year, self.config.merge_limit)
    }

    /// Merge the top `model_top_k` predictions with `rule_list`, keep `limit`
    pub fn merge_with_limit(
        &self,
        predictions: &[CropProbability],
        rule_list: &[ScoreRecord],
        reading: &SoilReading,
        year: i32,
        limit: usize,
    ) -> Vec<ScoreRecord> {
        let rule_index: FxHashMap<&str, usize> = rule_list
            .iter()
            .enumerate()
            .rev()
            .map(|(i, record)| (record.crop_name.as_str(), i))
            .collect();

        let mut merged = Vec::with_capacity(self.config.model_top_k + rule_list.len());
        let mut included: FxHashSet<&str> = FxHashSet::default();

        for prediction in predictions.iter().take(self.config.model_top_k) {
            let name = prediction.crop_name.as_str();
            if !included.insert(name) {
                continue;
            }

            match rule_index.get(name) {
                Some(&i) => merged.push(merge_shared(prediction, &rule_list[i])),
                None => {
                    if let Some(record) = self.model_only(prediction, reading, year) {
                        merged.push(record);
                    }
                }
            }
        }

        for record in rule_list {
            if included.insert(record.crop_name.as_str()) {
                merged.push(record.clone());
            }
        }

        merged.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));
        merged.truncate(limit);
        merged
    }

    fn model_only(&self, prediction: &CropProbability, reading: &SoilReading, year: i32) -> Option<ScoreRecord> {
        let Some(crop) = self.data.crops.get(&prediction.crop_name) else {
            tracing::warn!("Classifier predicted unknown crop '{}', skipping", prediction.crop_name);
            return None;
        };

        Some(match self.config.merge_policy {
            MergePolicy::NeutralDefaults => neutral_entry(prediction, crop),
            MergePolicy::Recompute => {
                let scored = CropScorer::new(self.data, self.config).score_crop(crop, reading, reading.month, year);
                ScoreRecord {
                    combined_score: (prediction.probability + scored.combined_score) / 2.0,
                    source: RecommendationSource::Model,
                    model_probability: Some(prediction.probability),
                    ..scored
                }
            }
        })
    }
}
