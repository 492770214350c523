// Crop recommendation CLI
//
// Usage: recommend_crops N P K pH month [temperature humidity rainfall]
// Config: CROP_CONFIG=path/to/config.json (defaults otherwise)
// Logging: RUST_LOG overrides the default filter

use anyhow::{bail, Context};
use crop_recommender::explanation::{display_name, explain_market_trends};
use crop_recommender::{EngineConfig, Recommender, SoilReading};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: recommend_crops N P K pH month [temperature humidity rainfall]";

fn parse_value(args: &[String], index: usize, name: &str) -> anyhow::Result<Option<f64>> {
    match args.get(index) {
        None => Ok(None),
        Some(raw) if raw == "-" => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .map(Some)
            .with_context(|| format!("{} must be a number, got '{}'", name, raw)),
    }
}

fn parse_reading(args: &[String]) -> anyhow::Result<SoilReading> {
    if args.len() < 5 {
        bail!(USAGE);
    }

    let month: u32 = args[4]
        .parse()
        .with_context(|| format!("month must be an integer, got '{}'", args[4]))?;
    if !(1..=12).contains(&month) {
        tracing::warn!("Month {} is outside 1-12; only annual crops will match", month);
    }

    Ok(SoilReading {
        nitrogen: parse_value(args, 0, "nitrogen")?,
        phosphorus: parse_value(args, 1, "phosphorus")?,
        potassium: parse_value(args, 2, "potassium")?,
        ph: parse_value(args, 3, "pH")?,
        temperature: parse_value(args, 5, "temperature")?,
        humidity: parse_value(args, 6, "humidity")?,
        rainfall: parse_value(args, 7, "rainfall")?,
        month,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crop_recommender=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let reading = parse_reading(&args)?;

    let config = match std::env::var("CROP_CONFIG") {
        Ok(path) => EngineConfig::load(&PathBuf::from(path))?,
        Err(_) => EngineConfig::default(),
    };
    let year = config.reference_year;

    let recommender = Recommender::from_config(config)?;
    let ranked = recommender.recommend(&reading, Some(year))?;

    if ranked.is_empty() {
        println!("No crops match this reading for month {}.", reading.month);
        return Ok(());
    }

    println!("{:<4} {:<16} {:>8} {:>8} {:>8}  {:<8} {:>5}  source", "#", "crop", "combined", "soil", "market", "season", "days");
    for (i, record) in ranked.iter().enumerate() {
        println!(
            "{:<4} {:<16} {:>8.3} {:>8.3} {:>8.3}  {:<8} {:>5}  {:?}",
            i + 1,
            display_name(&record.crop_name),
            record.combined_score,
            record.soil_score,
            record.market_score,
            record.season,
            record.growing_days,
            record.source
        );
    }

    let classifier = recommender.classifier();
    if let Ok(model) = classifier.model() {
        println!(
            "\nClassifier: {} crops, {} train / {} test samples, held-out accuracy {:.1}%",
            model.labels().len(),
            model.n_train(),
            model.n_test(),
            model.accuracy() * 100.0
        );
        println!("Feature importance:");
        for (feature, weight) in classifier.feature_importance()? {
            println!("  {:<12} {:.3}", feature.name(), weight);
        }
    }

    let top = &ranked[0];
    println!("\nWhy {}?", display_name(&top.crop_name));
    if let Some(crop) = recommender.data().crops.get(&top.crop_name) {
        println!("{}", crop_recommender::crop_rationale(crop, &reading)?);
        println!("Season: {}", crop.season.label());
    }
    println!("{}", explain_market_trends(&recommender.data().market, &top.crop_name, reading.month, year));

    Ok(())
}
