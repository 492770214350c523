//! Synthetic training data
//!
//! The crop table holds requirement ranges, not observations, so the
//! classifier learns from samples drawn around each crop's optimum:
//!
//! - nutrients: requirement × U(0.9, 1.1)
//! - climate: range midpoint + N(0, σ) with σ = 2 °C, 5 %RH, 0.3 pH, 10 mm
//! - month: uniform over the crop's season (1-12 for annual crops)
//! - with probability `negative_sample_probability`, one extra off-optimum
//!   sample per base sample, shifted by a signed deviation of 30-50 %
//!
//! All values are clamped (nutrients and climate ≥ 0, pH to [0, 14]).
//! Every random draw goes through the caller's RNG, so a seeded generator
//! reproduces the same set.

use crate::config::TrainingParams;
use crate::error::{RecommendError, Result};
use crate::types::{CropRequirement, Feature};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::StandardNormal;

/// One feature vector in `Feature::ALL` order
pub type FeatureRow = [f64; Feature::COUNT];

const NUTRIENT_JITTER: f64 = 0.1;
const TEMPERATURE_SIGMA: f64 = 2.0;
const HUMIDITY_SIGMA: f64 = 5.0;
const PH_SIGMA: f64 = 0.3;
const RAINFALL_SIGMA: f64 = 10.0;

const MIN_DEVIATION: f64 = 0.3;
const MAX_DEVIATION: f64 = 0.5;

/// Labelled sample; `label` indexes `TrainingSet::labels`
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSample {
    pub features: FeatureRow,
    pub label: usize,
}

/// Generated samples plus the label vocabulary in crop-table order
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub samples: Vec<TrainingSample>,
    pub labels: Vec<String>,
}

/// Raw (unclamped) draw around a crop's optimum
#[derive(Debug, Clone, Copy)]
struct Draw {
    nitrogen: f64,
    phosphorus: f64,
    potassium: f64,
    temperature: f64,
    humidity: f64,
    ph: f64,
    rainfall: f64,
    month: u32,
}

impl Draw {
    fn around<R: Rng + ?Sized>(crop: &CropRequirement, rng: &mut R) -> Self {
        let mut jitter = |requirement: f64| {
            requirement * rng.gen_range((1.0 - NUTRIENT_JITTER)..=(1.0 + NUTRIENT_JITTER))
        };
        let nitrogen = jitter(crop.nitrogen);
        let phosphorus = jitter(crop.phosphorus);
        let potassium = jitter(crop.potassium);

        let mut gaussian = |mid: f64, sigma: f64| {
            let z: f64 = rng.sample(StandardNormal);
            mid + sigma * z
        };
        let temperature = gaussian(crop.temperature.midpoint(), TEMPERATURE_SIGMA);
        let humidity = gaussian(crop.humidity.midpoint(), HUMIDITY_SIGMA);
        let ph = gaussian(crop.ph.midpoint(), PH_SIGMA);
        let rainfall = gaussian(crop.rainfall.midpoint(), RAINFALL_SIGMA);

        // Season month lists are never empty
        let month = crop.season.months().choose(rng).copied().unwrap_or(1);

        Self {
            nitrogen,
            phosphorus,
            potassium,
            temperature,
            humidity,
            ph,
            rainfall,
            month,
        }
    }

    /// Shift away from the optimum; climate factors move less than nutrients
    fn off_optimum(&self, deviation: f64) -> Self {
        let factor = 1.0 + deviation;
        Self {
            nitrogen: self.nitrogen * factor,
            phosphorus: self.phosphorus * factor,
            potassium: self.potassium * factor,
            temperature: self.temperature * (1.0 + deviation * 0.5),
            humidity: self.humidity * (1.0 + deviation * 0.3),
            ph: self.ph * (1.0 + deviation * 0.1),
            rainfall: self.rainfall * (1.0 + deviation * 0.3),
            month: self.month,
        }
    }

    fn to_row(self) -> FeatureRow {
        [
            self.nitrogen.max(0.0),
            self.phosphorus.max(0.0),
            self.potassium.max(0.0),
            self.temperature.max(0.0),
            self.humidity.max(0.0),
            self.ph.clamp(0.0, 14.0),
            self.rainfall.max(0.0),
            self.month as f64,
        ]
    }
}

/// Generate the labelled sample set for every crop
///
/// # Errors
/// `EmptyTrainingSet` when `crops` is empty.
pub fn generate_training_set<R: Rng + ?Sized>(
    crops: &[CropRequirement],
    params: &TrainingParams,
    rng: &mut R,
) -> Result<TrainingSet> {
    if crops.is_empty() {
        return Err(RecommendError::EmptyTrainingSet);
    }

    let negative_probability = params.negative_sample_probability.clamp(0.0, 1.0);
    let mut samples = Vec::with_capacity(crops.len() * params.samples_per_crop * 2);

    for (label, crop) in crops.iter().enumerate() {
        for _ in 0..params.samples_per_crop {
            let draw = Draw::around(crop, rng);
            samples.push(TrainingSample { features: draw.to_row(), label });

            if rng.gen::<f64>() < negative_probability {
                let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                let deviation = sign * rng.gen_range(MIN_DEVIATION..=MAX_DEVIATION);
                samples.push(TrainingSample {
                    features: draw.off_optimum(deviation).to_row(),
                    label,
                });
            }
        }
    }

    Ok(TrainingSet {
        samples,
        labels: crops.iter().map(|c| c.crop_name.clone()).collect(),
    })
}

/// Shuffle and split into (train, test)
///
/// The test share is `ceil(n × test_fraction)`, kept within [1, n-1] so both
/// sides are non-empty.
///
/// # Errors
/// `EmptyTrainingSet` when fewer than two samples are available.
pub fn train_test_split<R: Rng + ?Sized>(
    mut samples: Vec<TrainingSample>,
    test_fraction: f64,
    rng: &mut R,
) -> Result<(Vec<TrainingSample>, Vec<TrainingSample>)> {
    let n = samples.len();
    if n < 2 {
        return Err(RecommendError::EmptyTrainingSet);
    }

    samples.shuffle(rng);
    let n_test = ((n as f64 * test_fraction).ceil() as usize).clamp(1, n - 1);
    let train = samples.split_off(n_test);

    Ok((train, samples))
}
