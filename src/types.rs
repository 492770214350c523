//! Core data model shared by the scorers, the classifier and the merger
//!
//! Reference records (`CropRequirement`, `MarketRecord`) are loaded once and
//! never mutated. `SoilReading` and `ScoreRecord` live for a single call.

use crate::error::{RecommendError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Seasons
// ============================================================================

/// Planting season tag carried by every crop requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Kharif,
    Rabi,
    Summer,
    Annual,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Kharif, Season::Rabi, Season::Summer, Season::Annual];

    /// Months in which the season is planted
    ///
    /// Annual crops are valid in every month.
    pub fn months(&self) -> &'static [u32] {
        match self {
            Season::Kharif => &[6, 7, 8, 9],
            Season::Rabi => &[10, 11, 12, 1, 2],
            Season::Summer => &[3, 4, 5],
            Season::Annual => &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
        }
    }

    /// Season implied by a calendar month
    ///
    /// Never returns `Annual`; months outside 1-12 have no season.
    pub fn for_month(month: u32) -> Option<Season> {
        [Season::Kharif, Season::Rabi, Season::Summer]
            .into_iter()
            .find(|season| season.months().contains(&month))
    }

    /// Whether a crop tagged with `self` may be planted in `month`
    pub fn accepts_month(&self, month: u32) -> bool {
        match self {
            Season::Annual => true,
            other => Season::for_month(month) == Some(*other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Kharif => "kharif",
            Season::Rabi => "rabi",
            Season::Summer => "summer",
            Season::Annual => "annual",
        }
    }

    /// Display label for the presentation layer
    pub fn label(&self) -> &'static str {
        match self {
            Season::Kharif => "Kharif (monsoon season, June to September)",
            Season::Rabi => "Rabi (winter season, October to February)",
            Season::Summer => "Summer (zaid season, March to May)",
            Season::Annual => "Annual (can be planted year-round)",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kharif" => Ok(Season::Kharif),
            "rabi" => Ok(Season::Rabi),
            "summer" | "zaid" => Ok(Season::Summer),
            "annual" => Ok(Season::Annual),
            other => Err(format!("unknown season '{}'", other)),
        }
    }
}

// ============================================================================
// Reference records
// ============================================================================

/// Closed interval `[min, max]` of an optimal growing condition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Build a range, swapping the bounds if given in reverse order
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Per-crop agronomic requirements (one row of the crop table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRequirement {
    pub crop_name: String,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub temperature: ValueRange,
    pub humidity: ValueRange,
    pub rainfall: ValueRange,
    pub ph: ValueRange,
    pub season: Season,
    pub growing_days: u32,
}

/// Market observation for one crop in one month of one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    pub crop_name: String,
    pub month: u32,
    pub year: i32,
    pub price_per_kg: f64,
    /// 0-10 scale
    pub demand_score: f64,
    /// 0-10 scale
    pub supply_score: f64,
    /// 0-10 scale
    pub profit_potential: f64,
}

// ============================================================================
// Input reading
// ============================================================================

/// Soil and climate reading supplied by the caller
///
/// Nitrogen, phosphorus, potassium and pH are mandatory for scoring but kept
/// optional here so an incomplete reading can be represented and rejected
/// explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoilReading {
    pub nitrogen: Option<f64>,
    pub phosphorus: Option<f64>,
    pub potassium: Option<f64>,
    pub ph: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub rainfall: Option<f64>,
    pub month: u32,
}

/// The four mandatory soil values, all present
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoreSoil {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub ph: f64,
}

impl SoilReading {
    pub fn new(nitrogen: f64, phosphorus: f64, potassium: f64, ph: f64, month: u32) -> Self {
        Self {
            nitrogen: Some(nitrogen),
            phosphorus: Some(phosphorus),
            potassium: Some(potassium),
            ph: Some(ph),
            month,
            ..Default::default()
        }
    }

    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.temperature = Some(celsius);
        self
    }

    pub fn with_humidity(mut self, percent: f64) -> Self {
        self.humidity = Some(percent);
        self
    }

    pub fn with_rainfall(mut self, mm: f64) -> Self {
        self.rainfall = Some(mm);
        self
    }

    /// Mandatory values, or `MissingParameter` naming the first absent one
    pub fn core(&self) -> Result<CoreSoil> {
        Ok(CoreSoil {
            nitrogen: require(self.nitrogen, "nitrogen")?,
            phosphorus: require(self.phosphorus, "phosphorus")?,
            potassium: require(self.potassium, "potassium")?,
            ph: require(self.ph, "ph")?,
        })
    }

    /// Copy with out-of-range values pulled back to their natural bounds
    pub fn clamped(&self) -> Self {
        let non_negative = |v: Option<f64>| v.map(|x| x.max(0.0));
        Self {
            nitrogen: non_negative(self.nitrogen),
            phosphorus: non_negative(self.phosphorus),
            potassium: non_negative(self.potassium),
            ph: self.ph.map(|x| x.clamp(0.0, 14.0)),
            temperature: self.temperature,
            humidity: self.humidity.map(|x| x.clamp(0.0, 100.0)),
            rainfall: non_negative(self.rainfall),
            month: self.month,
        }
    }

    /// Raw value of a classifier feature, if present
    pub fn feature_value(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::Nitrogen => self.nitrogen,
            Feature::Phosphorus => self.phosphorus,
            Feature::Potassium => self.potassium,
            Feature::Temperature => self.temperature,
            Feature::Humidity => self.humidity,
            Feature::Ph => self.ph,
            Feature::Rainfall => self.rainfall,
            Feature::Month => Some(self.month as f64),
        }
    }
}

fn require(value: Option<f64>, parameter: &'static str) -> Result<f64> {
    value.ok_or(RecommendError::MissingParameter { parameter })
}

// ============================================================================
// Classifier features
// ============================================================================

/// Feature columns of the classifier, in model order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Nitrogen,
    Phosphorus,
    Potassium,
    Temperature,
    Humidity,
    Ph,
    Rainfall,
    Month,
}

impl Feature {
    pub const COUNT: usize = 8;

    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::Nitrogen,
        Feature::Phosphorus,
        Feature::Potassium,
        Feature::Temperature,
        Feature::Humidity,
        Feature::Ph,
        Feature::Rainfall,
        Feature::Month,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Feature::Nitrogen => "nitrogen",
            Feature::Phosphorus => "phosphorus",
            Feature::Potassium => "potassium",
            Feature::Temperature => "temperature",
            Feature::Humidity => "humidity",
            Feature::Ph => "ph",
            Feature::Rainfall => "rainfall",
            Feature::Month => "month",
        }
    }

    /// Whether inference can proceed without this feature
    pub fn is_optional(&self) -> bool {
        matches!(self, Feature::Temperature | Feature::Humidity | Feature::Rainfall)
    }
}

// ============================================================================
// Output record
// ============================================================================

/// Which list(s) a recommendation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    RuleBased,
    Model,
    Both,
}

/// Scored crop handed between ranker, merger and the explanation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub crop_name: String,
    pub soil_score: f64,
    pub market_score: f64,
    pub combined_score: f64,
    pub season: Season,
    pub growing_days: u32,
    pub source: RecommendationSource,
    /// Classifier probability when the crop came through the model list
    pub model_probability: Option<f64>,
}
