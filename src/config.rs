//! Engine configuration
//!
//! Weights, training hyper-parameters, limits and data paths. Loaded from a
//! JSON file; every field has a default so a partial file (or none at all)
//! is valid.

use crate::error::RecommendError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Soil factor weights (convex combination)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilWeights {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub ph: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
}

impl Default for SoilWeights {
    fn default() -> Self {
        Self {
            nitrogen: 0.20,
            phosphorus: 0.15,
            potassium: 0.15,
            ph: 0.20,
            temperature: 0.10,
            humidity: 0.10,
            rainfall: 0.10,
        }
    }
}

impl SoilWeights {
    fn values(&self) -> [f64; 7] {
        [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.ph,
            self.temperature,
            self.humidity,
            self.rainfall,
        ]
    }
}

/// Market factor weights (convex combination)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketWeights {
    pub price: f64,
    pub demand: f64,
    pub supply: f64,
    pub profit: f64,
}

impl Default for MarketWeights {
    fn default() -> Self {
        Self {
            price: 0.30,
            demand: 0.30,
            supply: 0.20,
            profit: 0.20,
        }
    }
}

/// Soil vs market blend used by the rule-based ranker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendWeights {
    pub soil: f64,
    pub market: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self { soil: 0.6, market: 0.4 }
    }
}

impl BlendWeights {
    pub fn combine(&self, soil_score: f64, market_score: f64) -> f64 {
        self.soil * soil_score + self.market * market_score
    }
}

/// Synthetic sample generation and evaluation split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    /// Seed for sample generation and forest fitting
    pub seed: u64,
    pub samples_per_crop: usize,
    pub negative_sample_probability: f64,
    pub test_fraction: f64,
    /// Seed for the train/test shuffle
    pub split_seed: u64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            seed: 42,
            samples_per_crop: 5,
            negative_sample_probability: 0.3,
            test_fraction: 0.2,
            split_seed: 42,
        }
    }
}

/// Random forest hyper-parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    pub n_trees: usize,
    /// Unlimited when `None`
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features tried per split; `None` means floor(sqrt(n_features))
    pub max_features: Option<usize>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
        }
    }
}

/// How classifier-only crops get their soil/market sub-scores when merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Fill with 0.5 placeholders; combined score is the model probability
    #[default]
    NeutralDefaults,
    /// Compute the true soil/market scores; combined score averages the
    /// model probability with the blended rule score
    Recompute,
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub soil_weights: SoilWeights,
    pub market_weights: MarketWeights,
    pub blend: BlendWeights,
    pub training: TrainingParams,
    pub forest: ForestParams,
    /// Year used for market lookups when the caller gives none
    pub reference_year: i32,
    /// Length of the rule-based list fed to the merger
    pub rule_limit: usize,
    /// Number of classifier predictions fed to the merger
    pub model_top_k: usize,
    /// Length of the final merged list
    pub merge_limit: usize,
    pub merge_policy: MergePolicy,
    pub crop_data_path: PathBuf,
    pub market_data_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            soil_weights: SoilWeights::default(),
            market_weights: MarketWeights::default(),
            blend: BlendWeights::default(),
            training: TrainingParams::default(),
            forest: ForestParams::default(),
            reference_year: 2023,
            rule_limit: 5,
            model_top_k: 10,
            merge_limit: 10,
            merge_policy: MergePolicy::default(),
            crop_data_path: PathBuf::from("data/crop_data.csv"),
            market_data_path: PathBuf::from("data/market_data.csv"),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: EngineConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path))?;

        config.validate()?;
        Ok(config)
    }

    /// Check weight sums, limits and fractions
    pub fn validate(&self) -> std::result::Result<(), RecommendError> {
        check_convex("soil_weights", &self.soil_weights.values())?;
        check_convex(
            "market_weights",
            &[
                self.market_weights.price,
                self.market_weights.demand,
                self.market_weights.supply,
                self.market_weights.profit,
            ],
        )?;
        check_convex("blend", &[self.blend.soil, self.blend.market])?;

        let t = &self.training;
        if t.samples_per_crop == 0 {
            return invalid("training.samples_per_crop must be at least 1");
        }
        if !(0.0..=1.0).contains(&t.negative_sample_probability) {
            return invalid("training.negative_sample_probability must lie in [0, 1]");
        }
        if !(t.test_fraction > 0.0 && t.test_fraction < 1.0) {
            return invalid("training.test_fraction must lie in (0, 1)");
        }

        let f = &self.forest;
        if f.n_trees == 0 {
            return invalid("forest.n_trees must be at least 1");
        }
        if f.min_samples_split < 2 {
            return invalid("forest.min_samples_split must be at least 2");
        }
        if f.max_features == Some(0) || f.max_depth == Some(0) {
            return invalid("forest.max_features and forest.max_depth must be positive when set");
        }

        if self.rule_limit == 0 || self.model_top_k == 0 || self.merge_limit == 0 {
            return invalid("rule_limit, model_top_k and merge_limit must be positive");
        }

        Ok(())
    }
}

fn invalid(message: &str) -> std::result::Result<(), RecommendError> {
    Err(RecommendError::InvalidConfig(message.to_string()))
}

fn check_convex(name: &str, weights: &[f64]) -> std::result::Result<(), RecommendError> {
    if weights.iter().any(|w| !(0.0..=1.0).contains(w)) {
        return Err(RecommendError::InvalidConfig(format!("{} entries must lie in [0, 1]", name)));
    }
    let total: f64 = weights.iter().sum();
    if (total - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(RecommendError::InvalidConfig(format!(
            "{} must sum to 1.0 (got {:.6})",
            name, total
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reference_year, 2023);
        assert_eq!(config.merge_policy, MergePolicy::NeutralDefaults);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{
            "rule_limit": 8,
            "training": { "seed": 7 },
            "merge_policy": "recompute"
        }"#;

        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.rule_limit, 8);
        assert_eq!(config.training.seed, 7);
        assert_eq!(config.training.samples_per_crop, 5);
        assert_eq!(config.merge_policy, MergePolicy::Recompute);
        assert_eq!(config.soil_weights, SoilWeights::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut config = EngineConfig::default();
        config.market_weights.price = 0.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("market_weights"));
    }

    #[test]
    fn test_zero_trees_rejected() {
        let mut config = EngineConfig::default();
        config.forest.n_trees = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = EngineConfig::load(Path::new("no/such/config.json"));
        assert!(result.unwrap_err().to_string().contains("Failed to read config file"));
    }
}
