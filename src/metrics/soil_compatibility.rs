//! SOIL COMPATIBILITY
//!
//! Scores how well a soil/climate reading fits one crop's requirements.
//!
//! Factors:
//!   1. Nitrogen, phosphorus, potassium: ratio below requirement, plateau up
//!      to 2x, gentle decay above 2x (floor 0.5)
//!   2. pH: 1.0 inside the optimal range, linear decay to 0 over 2 pH units
//!   3. Temperature, humidity, rainfall: same decay pattern with half-widths
//!      of 10 °C, 20 %, 50 mm; an absent reading scores a neutral 1.0
//!
//! The final score is the weighted sum of the seven factors. Nitrogen,
//! phosphorus, potassium and pH are mandatory; without them the crop scores 0.

use crate::config::SoilWeights;
use crate::error::Result;
use crate::types::{CropRequirement, SoilReading};
use crate::utils::{clamp_unit, nutrient_score, optional_range_score, range_score};
use serde::Serialize;

/// pH units outside the range at which the pH factor reaches 0
pub const PH_HALF_WIDTH: f64 = 2.0;
/// °C outside the range at which the temperature factor reaches 0
pub const TEMPERATURE_HALF_WIDTH: f64 = 10.0;
/// Percentage points outside the range at which the humidity factor reaches 0
pub const HUMIDITY_HALF_WIDTH: f64 = 20.0;
/// Millimetres outside the range at which the rainfall factor reaches 0
pub const RAINFALL_HALF_WIDTH: f64 = 50.0;

/// Per-factor soil compatibility
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SoilScoreBreakdown {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub ph: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
    /// Weighted total in [0, 1]
    pub score: f64,
}

/// Score every factor of `reading` against `crop`
///
/// The reading is clamped to natural bounds first (negative nutrients to 0,
/// pH to [0, 14]).
///
/// # Errors
/// `MissingParameter` if nitrogen, phosphorus, potassium or pH is absent.
pub fn calculate_soil_score(
    crop: &CropRequirement,
    reading: &SoilReading,
    weights: &SoilWeights,
) -> Result<SoilScoreBreakdown> {
    let reading = reading.clamped();
    let core = reading.core()?;

    let nitrogen = nutrient_score(core.nitrogen, crop.nitrogen);
    let phosphorus = nutrient_score(core.phosphorus, crop.phosphorus);
    let potassium = nutrient_score(core.potassium, crop.potassium);
    let ph = range_score(core.ph, &crop.ph, PH_HALF_WIDTH);

    let temperature = optional_range_score(reading.temperature, &crop.temperature, TEMPERATURE_HALF_WIDTH);
    let humidity = optional_range_score(reading.humidity, &crop.humidity, HUMIDITY_HALF_WIDTH);
    let rainfall = optional_range_score(reading.rainfall, &crop.rainfall, RAINFALL_HALF_WIDTH);

    let score = weights.nitrogen * nitrogen
        + weights.phosphorus * phosphorus
        + weights.potassium * potassium
        + weights.ph * ph
        + weights.temperature * temperature
        + weights.humidity * humidity
        + weights.rainfall * rainfall;

    Ok(SoilScoreBreakdown {
        nitrogen,
        phosphorus,
        potassium,
        ph,
        temperature,
        humidity,
        rainfall,
        score: clamp_unit(score),
    })
}

/// Soil compatibility in [0, 1]; 0 when a mandatory value is missing
pub fn soil_score(crop: &CropRequirement, reading: &SoilReading, weights: &SoilWeights) -> f64 {
    calculate_soil_score(crop, reading, weights).map_or(0.0, |b| b.score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecommendError;
    use crate::types::{Season, ValueRange};
    use approx::assert_relative_eq;

    fn rice() -> CropRequirement {
        CropRequirement {
            crop_name: "rice".to_string(),
            nitrogen: 80.0,
            phosphorus: 40.0,
            potassium: 40.0,
            temperature: ValueRange::new(20.0, 35.0),
            humidity: ValueRange::new(70.0, 90.0),
            rainfall: ValueRange::new(150.0, 300.0),
            ph: ValueRange::new(5.5, 7.0),
            season: Season::Kharif,
            growing_days: 120,
        }
    }

    #[test]
    fn test_exact_requirement_without_climate_scores_one() {
        let reading = SoilReading::new(80.0, 40.0, 40.0, 6.2, 7);
        let breakdown = calculate_soil_score(&rice(), &reading, &SoilWeights::default()).unwrap();

        assert_relative_eq!(breakdown.nitrogen, 1.0);
        assert_relative_eq!(breakdown.phosphorus, 1.0);
        assert_relative_eq!(breakdown.potassium, 1.0);
        assert_relative_eq!(breakdown.ph, 1.0);
        assert_relative_eq!(breakdown.temperature, 1.0);
        assert_relative_eq!(breakdown.score, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_alkaline_ph_penalty() {
        let reading = SoilReading::new(80.0, 40.0, 40.0, 8.5, 7);
        let breakdown = calculate_soil_score(&rice(), &reading, &SoilWeights::default()).unwrap();

        assert_relative_eq!(breakdown.ph, 0.25);
        // Only pH (weight 0.2) deviates: 0.8 + 0.2 * 0.25
        assert_relative_eq!(breakdown.score, 0.85, epsilon = 1e-12);
    }

    #[test]
    fn test_climate_factors_when_present() {
        let reading = SoilReading::new(80.0, 40.0, 40.0, 6.2, 7)
            .with_temperature(40.0) // 5 over: 0.5
            .with_humidity(60.0) // 10 under: 0.5
            .with_rainfall(400.0); // 100 over: 0.0
        let breakdown = calculate_soil_score(&rice(), &reading, &SoilWeights::default()).unwrap();

        assert_relative_eq!(breakdown.temperature, 0.5);
        assert_relative_eq!(breakdown.humidity, 0.5);
        assert_relative_eq!(breakdown.rainfall, 0.0);
        assert_relative_eq!(breakdown.score, 0.7 + 0.05 + 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_mandatory_value_scores_zero() {
        let mut reading = SoilReading::new(80.0, 40.0, 40.0, 6.2, 7);
        reading.ph = None;

        assert!(matches!(
            calculate_soil_score(&rice(), &reading, &SoilWeights::default()),
            Err(RecommendError::MissingParameter { parameter: "ph" })
        ));
        assert_eq!(soil_score(&rice(), &reading, &SoilWeights::default()), 0.0);
    }

    #[test]
    fn test_depleted_soil() {
        let reading = SoilReading::new(0.0, 0.0, 0.0, 6.2, 7);
        let breakdown = calculate_soil_score(&rice(), &reading, &SoilWeights::default()).unwrap();
        // Only the pH and neutral climate factors remain
        assert_relative_eq!(breakdown.score, 0.2 + 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_range_ph_is_clamped() {
        let reading = SoilReading::new(80.0, 40.0, 40.0, 19.0, 7);
        let breakdown = calculate_soil_score(&rice(), &reading, &SoilWeights::default()).unwrap();
        // Clamped to 14, which is 7 units above the range
        assert_relative_eq!(breakdown.ph, 0.0);
    }
}
