//! MARKET DESIRABILITY
//!
//! Scores a crop's market position for one (month, year) from the market table.
//!
//! Factors (each on [0, 1]):
//!   1. Price: min-max normalized against every loaded record's price
//!   2. Demand: demand_score / 10
//!   3. Supply: 1 - supply_score / 10 (scarcity is rewarded)
//!   4. Profit: profit_potential / 10
//!
//! Missing market data is not penalized: a crop with no record for the exact
//! (crop, month, year) key scores a neutral 0.5.

use crate::config::MarketWeights;
use crate::data::MarketTable;
use crate::utils::{clamp_unit, min_max_normalize};
use serde::Serialize;

/// Score returned when no record matches
pub const NEUTRAL_MARKET_SCORE: f64 = 0.5;

/// Upper end of the demand/supply/profit scales
const SCORE_SCALE: f64 = 10.0;

/// Per-factor market desirability
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketScoreBreakdown {
    pub price: f64,
    pub demand: f64,
    pub supply: f64,
    pub profit: f64,
    /// Weighted total in [0, 1]
    pub score: f64,
}

/// Score the exact (crop, month, year) record
///
/// Returns `None` when the table has no such record.
pub fn calculate_market_score(
    crop_name: &str,
    month: u32,
    year: i32,
    market: &MarketTable,
    weights: &MarketWeights,
) -> Option<MarketScoreBreakdown> {
    let record = market.get(crop_name, month, year)?;

    let price = match market.price_bounds() {
        Some((min, max)) => min_max_normalize(record.price_per_kg, min, max),
        None => 0.0,
    };
    let demand = clamp_unit(record.demand_score / SCORE_SCALE);
    let supply = clamp_unit(1.0 - record.supply_score / SCORE_SCALE);
    let profit = clamp_unit(record.profit_potential / SCORE_SCALE);

    let score = weights.price * price
        + weights.demand * demand
        + weights.supply * supply
        + weights.profit * profit;

    Some(MarketScoreBreakdown {
        price,
        demand,
        supply,
        profit,
        score: clamp_unit(score),
    })
}

/// Market score in [0, 1]; `NEUTRAL_MARKET_SCORE` when no record matches
pub fn market_score(
    crop_name: &str,
    month: u32,
    year: i32,
    market: &MarketTable,
    weights: &MarketWeights,
) -> f64 {
    calculate_market_score(crop_name, month, year, market, weights)
        .map_or(NEUTRAL_MARKET_SCORE, |b| b.score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MarketRecord;
    use approx::assert_relative_eq;

    fn record(crop: &str, month: u32, price: f64, demand: f64, supply: f64, profit: f64) -> MarketRecord {
        MarketRecord {
            crop_name: crop.to_string(),
            month,
            year: 2023,
            price_per_kg: price,
            demand_score: demand,
            supply_score: supply,
            profit_potential: profit,
        }
    }

    fn table() -> MarketTable {
        MarketTable::new(vec![
            record("rice", 7, 20.0, 8.0, 4.0, 7.0),
            record("cotton", 7, 60.0, 6.0, 5.0, 8.0),
            record("wheat", 11, 40.0, 10.0, 0.0, 10.0),
        ])
    }

    #[test]
    fn test_missing_record_is_neutral() {
        let score = market_score("wheat", 3, 2023, &table(), &MarketWeights::default());
        assert_eq!(score, 0.5);
    }

    #[test]
    fn test_breakdown_values() {
        let b = calculate_market_score("wheat", 11, 2023, &table(), &MarketWeights::default()).unwrap();
        // Price 40 within [20, 60]
        assert_relative_eq!(b.price, 0.5);
        assert_relative_eq!(b.demand, 1.0);
        assert_relative_eq!(b.supply, 1.0);
        assert_relative_eq!(b.profit, 1.0);
        assert_relative_eq!(b.score, 0.3 * 0.5 + 0.3 + 0.2 + 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_cheapest_record_gets_zero_price_factor() {
        let b = calculate_market_score("rice", 7, 2023, &table(), &MarketWeights::default()).unwrap();
        assert_relative_eq!(b.price, 0.0);
        assert_relative_eq!(b.supply, 0.6);
        assert_relative_eq!(b.score, 0.3 * 0.8 + 0.2 * 0.6 + 0.2 * 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_single_price_level_normalizes_to_zero() {
        let flat = MarketTable::new(vec![record("rice", 7, 30.0, 5.0, 5.0, 5.0)]);
        let b = calculate_market_score("rice", 7, 2023, &flat, &MarketWeights::default()).unwrap();
        assert_eq!(b.price, 0.0);
        assert_relative_eq!(b.score, 0.3 * 0.5 + 0.2 * 0.5 + 0.2 * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_off_scale_scores_are_clamped() {
        let odd = MarketTable::new(vec![record("rice", 7, 30.0, 14.0, 12.0, -3.0)]);
        let b = calculate_market_score("rice", 7, 2023, &odd, &MarketWeights::default()).unwrap();
        assert_eq!(b.demand, 1.0);
        assert_eq!(b.supply, 0.0);
        assert_eq!(b.profit, 0.0);
        assert!((0.0..=1.0).contains(&b.score));
    }
}
