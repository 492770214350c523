//! Crop Recommender
//!
//! Recommends crops for a soil/climate reading and calendar month by merging
//! two independent rankings:
//! - `scorer`: rule-based soil compatibility + market desirability
//! - `classifier`: random forest trained on synthetic samples around each
//!   crop's requirements
//!
//! Module layout:
//! - `data`: reference tables loaded with Polars
//! - `metrics`: soil and market scoring factors
//! - `utils`: decay curves and frame helpers
//! - `merger`: merge-by-key of the two rankings
//! - `recommender`: end-to-end pipeline
//! - `explanation`, `market_trends`: inputs for the presentation layer

pub mod types;
pub mod error;
pub mod config;
pub mod utils;
pub mod data;
pub mod metrics;
pub mod scorer;
pub mod classifier;
pub mod merger;
pub mod recommender;
pub mod market_trends;
pub mod explanation;

// Re-export commonly used types
pub use types::{
    CropRequirement, Feature, MarketRecord, RecommendationSource, ScoreRecord, Season, SoilReading, ValueRange,
};
pub use error::{RecommendError, Result};
pub use config::{EngineConfig, MergePolicy};
pub use data::ReferenceData;
pub use metrics::{market_score, soil_score};
pub use scorer::CropScorer;
pub use classifier::{CropClassifier, CropProbability};
pub use merger::RecommendationMerger;
pub use recommender::Recommender;
pub use explanation::{crop_rationale, explain_market_trends};
