use crate::data::MarketTable;
use crate::market_trends::{market_metrics, price_change};

/// "sweet_potato" -> "Sweet potato"
pub fn display_name(crop_name: &str) -> String {
    let spaced = crop_name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn score_band(score: f64, high: &'static str, medium: &'static str, low: &'static str) -> &'static str {
    if score >= 8.0 {
        high
    } else if score >= 6.0 {
        medium
    } else {
        low
    }
}

/// Narrative summary of one crop's market for (month, year)
///
/// Price level, month-over-month movement (when the previous month exists),
/// demand, supply, profit potential and an overall verdict.
pub fn explain_market_trends(market: &MarketTable, crop_name: &str, month: u32, year: i32) -> String {
    let name = display_name(crop_name);
    let Some(record) = market_metrics(market, crop_name, month, year) else {
        return format!("No market data available for {} in month {}, {}.", name, month, year);
    };

    let mut parts = Vec::new();

    let price = record.price_per_kg;
    parts.push(if price > 100.0 {
        format!("{} currently has a high market price of Rs. {:.2} per kg.", name, price)
    } else if price > 50.0 {
        format!("{} has a moderate market price of Rs. {:.2} per kg.", name, price)
    } else {
        format!("{} has a relatively low market price of Rs. {:.2} per kg.", name, price)
    });

    if let Some(change) = price_change(market, crop_name, month, year) {
        let pct = change.percent;
        parts.push(if pct > 10.0 {
            format!("Prices have increased significantly by {:.1}% since last month.", pct)
        } else if pct > 0.0 {
            format!("Prices have increased slightly by {:.1}% since last month.", pct)
        } else if pct > -10.0 {
            format!("Prices have decreased slightly by {:.1}% since last month.", pct.abs())
        } else {
            format!("Prices have decreased significantly by {:.1}% since last month.", pct.abs())
        });
    }

    let demand = record.demand_score;
    parts.push(format!(
        "Market demand is {} ({:.1}/10).",
        score_band(demand, "very high", "good", "moderate"),
        demand
    ));

    let supply = record.supply_score;
    parts.push(format!(
        "Market supply is {} ({:.1}/10).",
        score_band(supply, "abundant", "adequate", "limited"),
        supply
    ));

    let profit = record.profit_potential;
    parts.push(format!(
        "The profit potential is {} ({:.1}/10).",
        score_band(profit, "excellent", "good", "moderate"),
        profit
    ));

    parts.push(if demand > supply && profit >= 6.0 {
        "Overall, market conditions are favorable, with demand exceeding supply.".to_string()
    } else if demand < supply && profit < 6.0 {
        "Overall, supply currently exceeds demand; consider the timing of your sale carefully.".to_string()
    } else {
        "Overall, market conditions are balanced.".to_string()
    });

    parts.join(" ")
}
