//! Market trend queries over the loaded market table
//!
//! Read-only lookups used by the market narrative and the presentation layer:
//! the latest record for a crop, a year's monthly price series, the
//! month-over-month price change and the most profitable crops in a month.

use crate::data::MarketTable;
use crate::types::MarketRecord;
use serde::Serialize;

/// Month-over-month price movement
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceChange {
    pub previous_price: f64,
    pub current_price: f64,
    /// Percent change relative to the previous month
    pub percent: f64,
}

/// Exact (crop, month, year) record
pub fn market_metrics<'a>(market: &'a MarketTable, crop_name: &str, month: u32, year: i32) -> Option<&'a MarketRecord> {
    market.get(crop_name, month, year)
}

/// Most recent record for a crop (latest year, then latest month)
pub fn latest_record<'a>(market: &'a MarketTable, crop_name: &'a str) -> Option<&'a MarketRecord> {
    market
        .records_for(crop_name)
        .fold(None, |best: Option<&MarketRecord>, r| match best {
            Some(b) if (b.year, b.month) >= (r.year, r.month) => Some(b),
            _ => Some(r),
        })
}

/// (month, price) pairs for one crop and year, sorted by month
pub fn price_trend(market: &MarketTable, crop_name: &str, year: i32) -> Vec<(u32, f64)> {
    let mut trend: Vec<(u32, f64)> = market
        .records_for(crop_name)
        .filter(|r| r.year == year)
        .map(|r| (r.month, r.price_per_kg))
        .collect();
    trend.sort_by_key(|&(month, _)| month);
    trend
}

/// Previous calendar month, wrapping January back to December of the prior year
pub fn previous_period(month: u32, year: i32) -> (u32, i32) {
    if month <= 1 {
        (12, year - 1)
    } else {
        (month - 1, year)
    }
}

/// Price change against the previous month
///
/// `None` when either month is missing or the previous price is zero.
pub fn price_change(market: &MarketTable, crop_name: &str, month: u32, year: i32) -> Option<PriceChange> {
    let current = market.get(crop_name, month, year)?;
    let (prev_month, prev_year) = previous_period(month, year);
    let previous = market.get(crop_name, prev_month, prev_year)?;

    if previous.price_per_kg <= 0.0 {
        return None;
    }

    Some(PriceChange {
        previous_price: previous.price_per_kg,
        current_price: current.price_per_kg,
        percent: (current.price_per_kg - previous.price_per_kg) / previous.price_per_kg * 100.0,
    })
}

/// Records for (month, year) with the highest profit potential
///
/// Ties keep table order.
pub fn top_profitable_crops(market: &MarketTable, month: u32, year: i32, limit: usize) -> Vec<&MarketRecord> {
    let mut records: Vec<&MarketRecord> = market
        .records()
        .iter()
        .filter(|r| r.month == month && r.year == year)
        .collect();
    records.sort_by(|a, b| b.profit_potential.total_cmp(&a.profit_potential));
    records.truncate(limit);
    records
}
