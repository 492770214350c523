//! Scoring modules for crop recommendation
//!
//! Each factor family is implemented in its own module.

pub mod soil_compatibility;
pub mod market;

// Re-export scoring functions
pub use soil_compatibility::{calculate_soil_score, soil_score, SoilScoreBreakdown};
pub use market::{calculate_market_score, market_score, MarketScoreBreakdown, NEUTRAL_MARKET_SCORE};
