//! Crop Scorer - rule-based ranking of in-season crops
//!
//! Combines the soil compatibility and market desirability scores for every
//! crop whose season matches the query month (annual crops always qualify)
//! and ranks them. Includes sequential and parallel (Rayon) batch entry points.

use crate::config::EngineConfig;
use crate::data::ReferenceData;
use crate::metrics::{market_score, soil_score};
use crate::types::{CropRequirement, RecommendationSource, ScoreRecord, SoilReading};
use rayon::prelude::*;

/// Rule-based ranker over borrowed reference data
pub struct CropScorer<'a> {
    data: &'a ReferenceData,
    config: &'a EngineConfig,
}

impl<'a> CropScorer<'a> {
    pub fn new(data: &'a ReferenceData, config: &'a EngineConfig) -> Self {
        Self { data, config }
    }

    /// Score one crop: combined = soil·w_soil + market·w_market
    pub fn score_crop(&self, crop: &CropRequirement, reading: &SoilReading, month: u32, year: i32) -> ScoreRecord {
        let soil = soil_score(crop, reading, &self.config.soil_weights);
        let market = market_score(&crop.crop_name, month, year, &self.data.market, &self.config.market_weights);

        ScoreRecord {
            crop_name: crop.crop_name.clone(),
            soil_score: soil,
            market_score: market,
            combined_score: self.config.blend.combine(soil, market),
            season: crop.season,
            growing_days: crop.growing_days,
            source: RecommendationSource::RuleBased,
            model_probability: None,
        }
    }

    /// Rank in-season crops for `month`, best first, at most `limit` entries
    ///
    /// Ties keep crop-table order (stable sort). Returns an empty list when no
    /// crop is plantable in `month`.
    pub fn rank(&self, reading: &SoilReading, month: u32, year: i32, limit: usize) -> Vec<ScoreRecord> {
        let mut ranked: Vec<ScoreRecord> = self
            .data
            .crops
            .in_season(month)
            .map(|crop| self.score_crop(crop, reading, month, year))
            .collect();

        if ranked.is_empty() {
            tracing::debug!("No crops match the season for month {}", month);
            return ranked;
        }

        ranked.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));
        ranked.truncate(limit);
        ranked
    }

    /// Rank using the reading's own month, the reference year and the configured limit
    pub fn rank_reading(&self, reading: &SoilReading) -> Vec<ScoreRecord> {
        self.rank(reading, reading.month, self.config.reference_year, self.config.rule_limit)
    }

    /// Rank many readings in parallel; output order matches input order
    pub fn rank_batch(&self, readings: &[SoilReading], year: i32, limit: usize) -> Vec<Vec<ScoreRecord>> {
        readings
            .par_iter()
            .map(|reading| self.rank(reading, reading.month, year, limit))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MarketRecord, Season, ValueRange};
    use approx::assert_relative_eq;

    fn crop(name: &str, season: Season, n: f64) -> CropRequirement {
        CropRequirement {
            crop_name: name.to_string(),
            nitrogen: n,
            phosphorus: 40.0,
            potassium: 40.0,
            temperature: ValueRange::new(20.0, 35.0),
            humidity: ValueRange::new(60.0, 90.0),
            rainfall: ValueRange::new(100.0, 300.0),
            ph: ValueRange::new(5.5, 7.0),
            season,
            growing_days: 100,
        }
    }

    fn data() -> ReferenceData {
        ReferenceData::new(
            vec![
                crop("rice", Season::Kharif, 80.0),
                crop("wheat", Season::Rabi, 80.0),
                crop("maize", Season::Kharif, 160.0),
                crop("banana", Season::Annual, 80.0),
                crop("sorghum", Season::Kharif, 80.0),
            ],
            vec![MarketRecord {
                crop_name: "sorghum".to_string(),
                month: 7,
                year: 2023,
                price_per_kg: 10.0,
                demand_score: 10.0,
                supply_score: 0.0,
                profit_potential: 10.0,
            }],
        )
    }

    #[test]
    fn test_rank_filters_by_season() {
        let data = data();
        let config = EngineConfig::default();
        let scorer = CropScorer::new(&data, &config);

        let ranked = scorer.rank(&SoilReading::new(80.0, 40.0, 40.0, 6.2, 7), 7, 2023, 10);
        let names: Vec<_> = ranked.iter().map(|r| r.crop_name.as_str()).collect();

        assert!(!names.contains(&"wheat"));
        assert!(names.contains(&"banana"));
        assert_eq!(ranked.len(), 4);
    }

    #[test]
    fn test_rank_orders_descending_with_stable_ties() {
        let data = data();
        let config = EngineConfig::default();
        let scorer = CropScorer::new(&data, &config);

        let ranked = scorer.rank(&SoilReading::new(80.0, 40.0, 40.0, 6.2, 7), 7, 2023, 10);
        let names: Vec<_> = ranked.iter().map(|r| r.crop_name.as_str()).collect();

        // Sorghum has the only (perfect) market record; rice and banana tie
        // and keep table order; maize is short on nitrogen.
        assert_eq!(names, vec!["sorghum", "rice", "banana", "maize"]);
        assert_relative_eq!(ranked[0].combined_score, 0.6 + 0.4 * 0.7, epsilon = 1e-12);
        assert_relative_eq!(ranked[1].combined_score, 0.6 + 0.4 * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_rank_truncates_to_limit() {
        let data = data();
        let config = EngineConfig::default();
        let scorer = CropScorer::new(&data, &config);

        let ranked = scorer.rank(&SoilReading::new(80.0, 40.0, 40.0, 6.2, 7), 7, 2023, 2);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_no_season_match_returns_empty() {
        let data = ReferenceData::new(vec![crop("wheat", Season::Rabi, 80.0)], vec![]);
        let config = EngineConfig::default();
        let scorer = CropScorer::new(&data, &config);

        assert!(scorer.rank(&SoilReading::new(80.0, 40.0, 40.0, 6.2, 7), 7, 2023, 5).is_empty());
    }

    #[test]
    fn test_rank_batch_matches_sequential() {
        let data = data();
        let config = EngineConfig::default();
        let scorer = CropScorer::new(&data, &config);

        let readings = vec![
            SoilReading::new(80.0, 40.0, 40.0, 6.2, 7),
            SoilReading::new(20.0, 10.0, 90.0, 8.0, 11),
            SoilReading::new(150.0, 60.0, 30.0, 5.0, 4),
        ];

        let batch = scorer.rank_batch(&readings, 2023, 5);
        for (reading, ranked) in readings.iter().zip(&batch) {
            assert_eq!(ranked, &scorer.rank(reading, reading.month, 2023, 5));
        }
    }
}
