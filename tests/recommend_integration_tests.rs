//! Recommendation Integration Tests
//!
//! Runs the full pipeline against the bundled reference tables in `data/`:
//! CSV loading, rule-based ranking, classifier training, merge and the
//! explanation helpers.

use approx::assert_relative_eq;
use crop_recommender::market_trends::{price_change, top_profitable_crops};
use crop_recommender::{
    explain_market_trends, market_score, soil_score, CropScorer, EngineConfig, MergePolicy, RecommendError,
    RecommendationSource, Recommender, ReferenceData, Season, SoilReading,
};
use std::path::PathBuf;
use std::sync::Arc;

fn data_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(file)
}

fn config() -> EngineConfig {
    let mut config = EngineConfig {
        crop_data_path: data_path("crop_data.csv"),
        market_data_path: data_path("market_data.csv"),
        ..EngineConfig::default()
    };
    config.forest.n_trees = 40;
    config
}

fn reference_data() -> ReferenceData {
    let config = config();
    ReferenceData::load(&config.crop_data_path, &config.market_data_path).expect("bundled data loads")
}

#[test]
fn test_bundled_tables_load() {
    let data = reference_data();
    assert_eq!(data.crops.len(), 16);
    assert!(data.market.len() > 200);

    let rice = data.crops.get("rice").unwrap();
    assert_eq!(rice.season, Season::Kharif);
    assert_eq!(rice.growing_days, 120);
    assert_relative_eq!(rice.ph.min, 5.5);
}

#[test]
fn test_rice_reading_scores_perfectly() {
    let data = reference_data();
    let config = config();
    let rice = data.crops.get("rice").unwrap();

    let reading = SoilReading::new(80.0, 40.0, 40.0, 6.2, 7);
    assert_relative_eq!(soil_score(rice, &reading, &config.soil_weights), 1.0, epsilon = 1e-12);
}

#[test]
fn test_missing_market_record_is_neutral() {
    let data = reference_data();
    let config = config();
    assert_eq!(market_score("wheat", 3, 2023, &data.market, &config.market_weights), 0.5);
}

#[test]
fn test_rule_ranking_respects_season() {
    let data = reference_data();
    let config = config();
    let scorer = CropScorer::new(&data, &config);

    let ranked = scorer.rank(&SoilReading::new(90.0, 45.0, 45.0, 6.5, 11), 11, 2023, 16);
    assert!(!ranked.is_empty());
    for record in &ranked {
        assert!(
            record.season == Season::Rabi || record.season == Season::Annual,
            "{} ({}) should not be offered in November",
            record.crop_name,
            record.season
        );
    }
}

#[test]
fn test_invalid_month_only_offers_annual_crops() {
    let data = reference_data();
    let config = config();
    let ranked = CropScorer::new(&data, &config).rank(&SoilReading::new(90.0, 45.0, 45.0, 6.5, 13), 13, 2023, 16);

    let names: Vec<&str> = ranked.iter().map(|r| r.crop_name.as_str()).collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"sugarcane"));
    assert!(names.contains(&"banana"));
}

#[test]
fn test_end_to_end_recommendation() {
    let recommender = Recommender::from_config(config()).unwrap();
    let reading = SoilReading::new(80.0, 40.0, 40.0, 6.2, 7)
        .with_temperature(28.0)
        .with_humidity(80.0)
        .with_rainfall(200.0);

    let ranked = recommender.recommend(&reading, None).unwrap();

    assert!(!ranked.is_empty());
    assert!(ranked.len() <= 10);
    assert!(ranked.windows(2).all(|w| w[0].combined_score >= w[1].combined_score));
    for record in &ranked {
        assert!((0.0..=1.0).contains(&record.combined_score));
        assert!((0.0..=1.0).contains(&record.soil_score));
        assert!((0.0..=1.0).contains(&record.market_score));
    }
    assert!(ranked.iter().take(5).any(|r| r.crop_name == "rice"));

    let accuracy = recommender.classifier().accuracy().unwrap();
    assert!(accuracy > 0.25, "held-out accuracy {} too low", accuracy);
}

#[test]
fn test_recompute_policy_end_to_end() {
    let config = EngineConfig { merge_policy: MergePolicy::Recompute, ..config() };
    let recommender = Recommender::from_config(config).unwrap();
    let reading = SoilReading::new(100.0, 50.0, 50.0, 6.8, 12);
    let ranked = recommender.recommend(&reading, Some(2023)).unwrap();

    assert!(!ranked.is_empty());
    // Classifier-only entries carry their real soil score
    for record in ranked.iter().filter(|r| r.source == RecommendationSource::Model) {
        let crop = recommender.data().crops.get(&record.crop_name).unwrap();
        let expected = soil_score(crop, &reading, &recommender.config().soil_weights);
        assert_relative_eq!(record.soil_score, expected);
    }
}

#[test]
fn test_missing_files_degrade_to_empty() {
    let config = EngineConfig {
        crop_data_path: data_path("does_not_exist.csv"),
        market_data_path: data_path("also_missing.csv"),
        ..EngineConfig::default()
    };
    let recommender = Recommender::from_config(config).unwrap();

    assert!(recommender.data().crops.is_empty());
    let ranked = recommender
        .recommend(&SoilReading::new(80.0, 40.0, 40.0, 6.2, 7), None)
        .unwrap();
    assert!(ranked.is_empty());
}

#[test]
fn test_missing_mandatory_field_is_reported() {
    let recommender = Recommender::new(Arc::new(reference_data()), config());
    let mut reading = SoilReading::new(80.0, 40.0, 40.0, 6.2, 7);
    reading.ph = None;

    assert!(matches!(
        recommender.recommend(&reading, None),
        Err(RecommendError::MissingParameter { parameter: "ph" })
    ));
    assert!(!recommender.classifier().is_trained());
}

#[test]
fn test_training_is_reproducible() {
    let data = Arc::new(reference_data());
    let a = Recommender::new(Arc::clone(&data), config());
    let b = Recommender::new(data, config());

    assert_eq!(
        a.classifier().feature_importance().unwrap(),
        b.classifier().feature_importance().unwrap()
    );
}

#[test]
fn test_explanations_for_top_crop() {
    let recommender = Recommender::from_config(config()).unwrap();
    let reading = SoilReading::new(80.0, 40.0, 40.0, 6.2, 7);

    let rationale = recommender.classifier().explain(&reading, "rice").unwrap();
    assert!(rationale.contains("ideal for rice"));

    let market = explain_market_trends(&recommender.data().market, "rice", 7, 2023);
    assert!(market.starts_with("Rice "));
    assert!(market.contains("since last month"));
}

#[test]
fn test_market_trend_queries() {
    let data = reference_data();

    // January compares against the December 2022 rows
    assert!(price_change(&data.market, "cotton", 1, 2023).is_some());

    let top = top_profitable_crops(&data.market, 6, 2023, 3);
    assert_eq!(top.len(), 3);
    assert!(top[0].profit_potential >= top[1].profit_potential);
    assert!(top[1].profit_potential >= top[2].profit_potential);
}
