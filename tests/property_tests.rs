//! Property tests for score bounds, nutrient curve shape and merge arithmetic

use crop_recommender::classifier::CropProbability;
use crop_recommender::config::{BlendWeights, MarketWeights, SoilWeights};
use crop_recommender::data::MarketTable;
use crop_recommender::merger::merge_shared;
use crop_recommender::metrics::{market_score, soil_score};
use crop_recommender::utils::nutrient_score;
use crop_recommender::{CropRequirement, MarketRecord, RecommendationSource, ScoreRecord, Season, SoilReading, ValueRange};
use proptest::prelude::*;

fn crop(n: f64, p: f64, k: f64) -> CropRequirement {
    CropRequirement {
        crop_name: "test_crop".to_string(),
        nitrogen: n,
        phosphorus: p,
        potassium: k,
        temperature: ValueRange::new(20.0, 30.0),
        humidity: ValueRange::new(60.0, 80.0),
        rainfall: ValueRange::new(100.0, 200.0),
        ph: ValueRange::new(6.0, 7.0),
        season: Season::Annual,
        growing_days: 100,
    }
}

proptest! {
    #[test]
    fn soil_score_is_bounded(
        n in -50.0f64..400.0,
        p in -50.0f64..400.0,
        k in -50.0f64..400.0,
        ph in -2.0f64..16.0,
        temperature in proptest::option::of(-20.0f64..60.0),
        humidity in proptest::option::of(-10.0f64..120.0),
        rainfall in proptest::option::of(-10.0f64..600.0),
        req in 1.0f64..200.0,
    ) {
        let reading = SoilReading { temperature, humidity, rainfall, ..SoilReading::new(n, p, k, ph, 6) };
        let score = soil_score(&crop(req, req, req), &reading, &SoilWeights::default());
        prop_assert!((0.0..=1.0).contains(&score), "soil score {} out of bounds", score);
    }

    #[test]
    fn nutrient_curve_rises_then_falls(req in 1.0f64..200.0, a in 0.0f64..6.0, b in 0.0f64..6.0) {
        let (lo, hi) = if a <= b { (a * req, b * req) } else { (b * req, a * req) };
        let ceiling = 2.0 * req;

        if hi <= ceiling {
            prop_assert!(nutrient_score(lo, req) <= nutrient_score(hi, req));
        }
        if lo >= ceiling {
            prop_assert!(nutrient_score(lo, req) >= nutrient_score(hi, req));
        }
    }

    #[test]
    fn market_and_combined_scores_are_bounded(
        price in 0.0f64..200.0,
        demand in -2.0f64..12.0,
        supply in -2.0f64..12.0,
        profit in -2.0f64..12.0,
        soil in 0.0f64..=1.0,
    ) {
        let market = MarketTable::new(vec![
            MarketRecord {
                crop_name: "test_crop".to_string(),
                month: 6,
                year: 2023,
                price_per_kg: price,
                demand_score: demand,
                supply_score: supply,
                profit_potential: profit,
            },
            MarketRecord {
                crop_name: "other".to_string(),
                month: 6,
                year: 2023,
                price_per_kg: 50.0,
                demand_score: 5.0,
                supply_score: 5.0,
                profit_potential: 5.0,
            },
        ]);

        let market_value = market_score("test_crop", 6, 2023, &market, &MarketWeights::default());
        prop_assert!((0.0..=1.0).contains(&market_value));

        let combined = BlendWeights::default().combine(soil, market_value);
        prop_assert!((0.0..=1.0).contains(&combined));
    }

    #[test]
    fn shared_merge_is_exact_mean(probability in 0.0f64..=1.0, rule_score in 0.0f64..=1.0) {
        let rule = ScoreRecord {
            crop_name: "rice".to_string(),
            soil_score: 0.9,
            market_score: 0.4,
            combined_score: rule_score,
            season: Season::Kharif,
            growing_days: 120,
            source: RecommendationSource::RuleBased,
            model_probability: None,
        };
        let prediction = CropProbability { crop_name: "rice".to_string(), probability };

        let merged = merge_shared(&prediction, &rule);
        prop_assert_eq!(merged.combined_score, (probability + rule_score) / 2.0);
        prop_assert_eq!(merged.soil_score, rule.soil_score);
        prop_assert_eq!(merged.market_score, rule.market_score);
    }
}
