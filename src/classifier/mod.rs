//! Crop classifier trained on synthetic samples
//!
//! Lifecycle: train once, reuse until the process ends. The first caller of
//! `train` (or of any inference method) fits the model; concurrent callers
//! block on the same in-flight fit and then share its result. A failed fit
//! leaves the classifier untrained so a later call can retry.
//!
//! Pipeline: generate samples → 80/20 split → fit scaler on the train split →
//! fit forest on scaled train rows → report held-out accuracy.

pub mod forest;
pub mod scaler;
pub mod synthetic;

pub use forest::RandomForest;
pub use scaler::StandardScaler;
pub use synthetic::{generate_training_set, train_test_split, FeatureRow, TrainingSample, TrainingSet};

use crate::config::{EngineConfig, ForestParams, TrainingParams};
use crate::data::ReferenceData;
use crate::error::{RecommendError, Result};
use crate::explanation::crop_rationale;
use crate::types::{CropRequirement, Feature, SoilReading};
use once_cell::sync::OnceCell;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;

/// One classifier output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropProbability {
    pub crop_name: String,
    pub probability: f64,
}

/// Everything produced by a fit
#[derive(Debug, Clone)]
pub struct TrainedModel {
    labels: Vec<String>,
    scaler: StandardScaler,
    forest: RandomForest,
    accuracy: f64,
    n_train: usize,
    n_test: usize,
}

impl TrainedModel {
    /// Held-out accuracy on the test split
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn n_train(&self) -> usize {
        self.n_train
    }

    pub fn n_test(&self) -> usize {
        self.n_test
    }

    /// Standardize a raw feature row with the training-split parameters
    fn scale(&self, row: &FeatureRow) -> FeatureRow {
        self.scaler.transform(row)
    }
}

/// Fit a model from crop requirements
///
/// # Errors
/// `EmptyTrainingSet` if there are no crops or too few samples to split.
pub fn fit_model(
    crops: &[CropRequirement],
    training: &TrainingParams,
    forest_params: &ForestParams,
) -> Result<TrainedModel> {
    let mut rng = StdRng::seed_from_u64(training.seed);
    let set = generate_training_set(crops, training, &mut rng)?;

    let mut split_rng = StdRng::seed_from_u64(training.split_seed);
    let (train, test) = train_test_split(set.samples, training.test_fraction, &mut split_rng)?;

    let train_rows: Vec<FeatureRow> = train.iter().map(|s| s.features).collect();
    let scaler = StandardScaler::fit(&train_rows);

    let x_train: Vec<FeatureRow> = train_rows.iter().map(|r| scaler.transform(r)).collect();
    let y_train: Vec<usize> = train.iter().map(|s| s.label).collect();

    let forest = RandomForest::fit(&x_train, &y_train, set.labels.len(), forest_params, training.seed);

    let correct = test
        .iter()
        .filter(|s| forest.predict(&scaler.transform(&s.features)) == s.label)
        .count();
    let accuracy = correct as f64 / test.len() as f64;

    Ok(TrainedModel {
        labels: set.labels,
        scaler,
        forest,
        accuracy,
        n_train: train.len(),
        n_test: test.len(),
    })
}

/// Lazily trained crop classifier over shared reference data
pub struct CropClassifier {
    data: Arc<ReferenceData>,
    training: TrainingParams,
    forest: ForestParams,
    model: OnceCell<TrainedModel>,
}

impl CropClassifier {
    pub fn new(data: Arc<ReferenceData>, config: &EngineConfig) -> Self {
        Self {
            data,
            training: config.training,
            forest: config.forest,
            model: OnceCell::new(),
        }
    }

    /// Train if not yet trained; returns held-out accuracy
    ///
    /// Idempotent: later calls return the memoized accuracy without refitting.
    pub fn train(&self) -> Result<f64> {
        let model = self.model.get_or_try_init(|| {
            tracing::info!(
                "Training crop classifier on {} crops (seed {}, {} trees)",
                self.data.crops.len(),
                self.training.seed,
                self.forest.n_trees
            );
            let model = fit_model(self.data.crops.as_slice(), &self.training, &self.forest)?;
            tracing::info!(
                "Classifier trained: {} train / {} test samples, accuracy {:.3}",
                model.n_train(),
                model.n_test(),
                model.accuracy()
            );
            Ok::<_, RecommendError>(model)
        })?;

        Ok(model.accuracy())
    }

    pub fn is_trained(&self) -> bool {
        self.model.get().is_some()
    }

    /// Fitted model, or `UntrainedModel` if no fit has completed
    pub fn model(&self) -> Result<&TrainedModel> {
        self.model.get().ok_or(RecommendError::UntrainedModel)
    }

    /// Fitted model, training first if needed
    fn ensure_trained(&self) -> Result<&TrainedModel> {
        match self.model() {
            Err(RecommendError::UntrainedModel) => {
                tracing::debug!("Classifier used before training, training now");
                self.train()?;
                self.model()
            }
            other => other,
        }
    }

    /// Crop probabilities for a reading, most probable first
    ///
    /// Every trained label appears exactly once. Ties keep crop-table order.
    /// Absent optional climate values are imputed with the training mean.
    ///
    /// # Errors
    /// `MissingParameter` if nitrogen, phosphorus, potassium or pH is absent.
    pub fn predict(&self, reading: &SoilReading) -> Result<Vec<CropProbability>> {
        let reading = reading.clamped();
        reading.core()?;
        let model = self.ensure_trained()?;

        let mut row = [0.0; Feature::COUNT];
        for (j, feature) in Feature::ALL.iter().enumerate() {
            row[j] = match reading.feature_value(*feature) {
                Some(value) => value,
                None if feature.is_optional() => model.scaler.mean()[j],
                None => {
                    return Err(RecommendError::MissingParameter { parameter: feature.name() });
                }
            };
        }

        let proba = model.forest.predict_proba(&model.scale(&row));
        let mut ranked: Vec<CropProbability> = model
            .labels
            .iter()
            .zip(proba)
            .map(|(crop_name, probability)| CropProbability {
                crop_name: crop_name.clone(),
                probability,
            })
            .collect();

        ranked.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        Ok(ranked)
    }

    /// Normalized per-feature importance in model feature order
    pub fn feature_importance(&self) -> Result<Vec<(Feature, f64)>> {
        let model = self.ensure_trained()?;
        Ok(Feature::ALL
            .iter()
            .copied()
            .zip(model.forest.feature_importances())
            .collect())
    }

    /// Agronomic rationale for recommending `crop_name` given `reading`
    ///
    /// Compares the reading with the crop's requirements only, so it never
    /// triggers a fit.
    ///
    /// # Errors
    /// `MissingParameter` if a mandatory soil value is absent, `UnknownCrop`
    /// if the crop is not in the table.
    pub fn explain(&self, reading: &SoilReading, crop_name: &str) -> Result<String> {
        reading.clamped().core()?;
        let crop = self
            .data
            .crops
            .get(crop_name)
            .ok_or_else(|| RecommendError::UnknownCrop { crop: crop_name.to_string() })?;
        crop_rationale(crop, reading)
    }

    /// Held-out accuracy, if trained
    pub fn accuracy(&self) -> Option<f64> {
        self.model.get().map(TrainedModel::accuracy)
    }
}
