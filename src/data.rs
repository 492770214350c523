//! Reference Data Loading and Management
//!
//! Loads the crop requirement and market tables from CSV using Polars and
//! converts them into typed, indexed collections. Tables are read once at
//! start-up and are immutable afterwards; scorers receive them by reference.
//!
//! Failure policy:
//! - a table whose header lacks expected columns is a hard error
//! - a table that cannot be read at all degrades to an empty table
//!   (`ReferenceData::load_or_empty`), which yields zero recommendations

use crate::error::{RecommendError, Result};
use crate::types::{CropRequirement, MarketRecord, Season, ValueRange};
use crate::utils::{f64_values, require_columns, str_values};
use polars::prelude::*;
use rustc_hash::FxHashMap;
use std::path::Path;

/// Column set of the crop requirements table
pub const CROP_COLUMNS: &[&str] = &[
    "crop_name",
    "nitrogen_requirement",
    "phosphorus_requirement",
    "potassium_requirement",
    "temperature_min",
    "temperature_max",
    "rainfall_min",
    "rainfall_max",
    "humidity_min",
    "humidity_max",
    "ph_min",
    "ph_max",
    "season",
    "growing_days",
];

/// Column set of the market records table
pub const MARKET_COLUMNS: &[&str] = &[
    "crop_name",
    "month",
    "year",
    "price_per_kg",
    "demand_score",
    "supply_score",
    "profit_potential",
];

// ============================================================================
// Crop catalog
// ============================================================================

/// Crop requirements in table order, indexed by crop name
#[derive(Debug, Clone, Default)]
pub struct CropCatalog {
    crops: Vec<CropRequirement>,
    index: FxHashMap<String, usize>,
}

impl CropCatalog {
    /// Build a catalog; a repeated crop name keeps its first row
    pub fn new(rows: Vec<CropRequirement>) -> Self {
        let mut crops = Vec::with_capacity(rows.len());
        let mut index = FxHashMap::default();

        for crop in rows {
            if index.contains_key(&crop.crop_name) {
                tracing::warn!("Duplicate crop '{}' in requirements table, keeping first row", crop.crop_name);
                continue;
            }
            index.insert(crop.crop_name.clone(), crops.len());
            crops.push(crop);
        }

        Self { crops, index }
    }

    pub fn get(&self, crop_name: &str) -> Option<&CropRequirement> {
        self.index.get(crop_name).map(|&i| &self.crops[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CropRequirement> {
        self.crops.iter()
    }

    pub fn as_slice(&self) -> &[CropRequirement] {
        &self.crops
    }

    pub fn len(&self) -> usize {
        self.crops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }

    /// Crops plantable in `month` (matching season, or annual), in table order
    pub fn in_season(&self, month: u32) -> impl Iterator<Item = &CropRequirement> {
        self.crops.iter().filter(move |c| c.season.accepts_month(month))
    }
}

// ============================================================================
// Market table
// ============================================================================

/// Market records indexed by crop, then by (month, year)
#[derive(Debug, Clone, Default)]
pub struct MarketTable {
    records: Vec<MarketRecord>,
    index: FxHashMap<String, FxHashMap<(u32, i32), usize>>,
    price_bounds: Option<(f64, f64)>,
}

impl MarketTable {
    /// Build the table; a repeated (crop, month, year) key keeps its first row
    pub fn new(rows: Vec<MarketRecord>) -> Self {
        let mut records = Vec::with_capacity(rows.len());
        let mut index: FxHashMap<String, FxHashMap<(u32, i32), usize>> = FxHashMap::default();

        for record in rows {
            let by_period = index.entry(record.crop_name.clone()).or_default();
            let key = (record.month, record.year);
            if by_period.contains_key(&key) {
                tracing::warn!(
                    "Duplicate market record for {} {}/{}, keeping first row",
                    record.crop_name, record.month, record.year
                );
                continue;
            }
            by_period.insert(key, records.len());
            records.push(record);
        }

        let price_bounds = records.iter().map(|r| r.price_per_kg).fold(None, |acc, p| match acc {
            None => Some((p, p)),
            Some((lo, hi)) => Some((f64::min(lo, p), f64::max(hi, p))),
        });

        Self { records, index, price_bounds }
    }

    /// Exact (crop, month, year) lookup
    pub fn get(&self, crop_name: &str, month: u32, year: i32) -> Option<&MarketRecord> {
        self.index
            .get(crop_name)
            .and_then(|by_period| by_period.get(&(month, year)))
            .map(|&i| &self.records[i])
    }

    /// All records for one crop, in load order
    pub fn records_for<'a>(&'a self, crop_name: &'a str) -> impl Iterator<Item = &'a MarketRecord> + 'a {
        self.records.iter().filter(move |r| r.crop_name == crop_name)
    }

    /// Minimum and maximum price over every loaded record
    pub fn price_bounds(&self) -> Option<(f64, f64)> {
        self.price_bounds
    }

    pub fn records(&self) -> &[MarketRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Reference data
// ============================================================================

/// Both reference tables, owned for the lifetime of the engine
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub crops: CropCatalog,
    pub market: MarketTable,
}

impl ReferenceData {
    pub fn new(crops: Vec<CropRequirement>, market: Vec<MarketRecord>) -> Self {
        Self {
            crops: CropCatalog::new(crops),
            market: MarketTable::new(market),
        }
    }

    /// Zero rows in both tables
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load both tables, failing on any error
    pub fn load(crop_path: &Path, market_path: &Path) -> Result<Self> {
        let crops = load_crops(crop_path)?;
        let market = load_market(market_path)?;

        tracing::info!(
            "Reference data loaded: {} crops, {} market entries",
            crops.len(),
            market.len()
        );

        Ok(Self::new(crops, market))
    }

    /// Load both tables, substituting an empty table for any source that is unreadable
    ///
    /// Schema problems (missing columns) still fail: those indicate a broken
    /// data contract rather than an absent source.
    pub fn load_or_empty(crop_path: &Path, market_path: &Path) -> Result<Self> {
        let crops = or_empty(load_crops(crop_path), "crop requirements")?;
        let market = or_empty(load_market(market_path), "market")?;

        tracing::info!(
            "Reference data loaded: {} crops, {} market entries",
            crops.len(),
            market.len()
        );

        Ok(Self::new(crops, market))
    }
}

fn or_empty<T>(loaded: Result<Vec<T>>, table: &str) -> Result<Vec<T>> {
    match loaded {
        Err(RecommendError::DataUnavailable { path, source }) => {
            tracing::warn!("Error loading {} table from {:?}: {} (continuing with empty table)", table, path, source);
            Ok(Vec::new())
        }
        other => other,
    }
}

/// Read a CSV file into a DataFrame
fn read_csv(path: &Path) -> Result<DataFrame> {
    let unavailable = |source| RecommendError::DataUnavailable {
        path: path.to_path_buf(),
        source,
    };

    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(unavailable)?
        .finish()
        .map_err(unavailable)
}

/// Load crop requirements from CSV
pub fn load_crops(path: &Path) -> Result<Vec<CropRequirement>> {
    crops_from_frame(&read_csv(path)?)
}

/// Load market records from CSV
pub fn load_market(path: &Path) -> Result<Vec<MarketRecord>> {
    market_from_frame(&read_csv(path)?)
}

/// Convert a crop requirements frame into typed rows
///
/// Rows with a null in any column, or an unknown season tag, are skipped.
pub fn crops_from_frame(df: &DataFrame) -> Result<Vec<CropRequirement>> {
    const TABLE: &str = "crop";
    require_columns(df, CROP_COLUMNS, TABLE)?;

    let names = str_values(df, "crop_name", TABLE)?;
    let seasons = str_values(df, "season", TABLE)?;
    let num = |column: &str| f64_values(df, column, TABLE);
    let nitrogen = num("nitrogen_requirement")?;
    let phosphorus = num("phosphorus_requirement")?;
    let potassium = num("potassium_requirement")?;
    let temp_min = num("temperature_min")?;
    let temp_max = num("temperature_max")?;
    let rain_min = num("rainfall_min")?;
    let rain_max = num("rainfall_max")?;
    let hum_min = num("humidity_min")?;
    let hum_max = num("humidity_max")?;
    let ph_min = num("ph_min")?;
    let ph_max = num("ph_max")?;
    let growing_days = num("growing_days")?;

    let mut crops = Vec::with_capacity(df.height());
    let mut skipped = 0usize;

    for idx in 0..df.height() {
        let season = seasons[idx].as_deref().map(str::parse::<Season>);
        let row = (|| {
            Some(CropRequirement {
                crop_name: names[idx].clone().filter(|n| !n.is_empty())?,
                nitrogen: nitrogen[idx]?,
                phosphorus: phosphorus[idx]?,
                potassium: potassium[idx]?,
                temperature: ValueRange::new(temp_min[idx]?, temp_max[idx]?),
                humidity: ValueRange::new(hum_min[idx]?, hum_max[idx]?),
                rainfall: ValueRange::new(rain_min[idx]?, rain_max[idx]?),
                ph: ValueRange::new(ph_min[idx]?, ph_max[idx]?),
                season: season.clone()?.ok()?,
                growing_days: growing_days[idx]?.max(0.0).round() as u32,
            })
        })();

        match row {
            Some(crop) => crops.push(crop),
            None => {
                skipped += 1;
                if let Some(Err(reason)) = season {
                    tracing::debug!("Crop row {}: {}", idx, reason);
                }
            }
        }
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} incomplete crop requirement rows", skipped);
    }

    Ok(crops)
}

/// Convert a market frame into typed rows
///
/// Rows with a null in any column, a month outside 1-12, or a fractional
/// month or year are skipped.
pub fn market_from_frame(df: &DataFrame) -> Result<Vec<MarketRecord>> {
    const TABLE: &str = "market";
    require_columns(df, MARKET_COLUMNS, TABLE)?;

    let names = str_values(df, "crop_name", TABLE)?;
    let num = |column: &str| f64_values(df, column, TABLE);
    let months = num("month")?;
    let years = num("year")?;
    let prices = num("price_per_kg")?;
    let demand = num("demand_score")?;
    let supply = num("supply_score")?;
    let profit = num("profit_potential")?;

    let mut records = Vec::with_capacity(df.height());
    let mut skipped = 0usize;

    for idx in 0..df.height() {
        let row = (|| {
            let month = months[idx]?;
            let year = years[idx]?;
            if !(1.0..=12.0).contains(&month) || month.fract() != 0.0 || year.fract() != 0.0 {
                return None;
            }
            Some(MarketRecord {
                crop_name: names[idx].clone().filter(|n| !n.is_empty())?,
                month: month as u32,
                year: year as i32,
                price_per_kg: prices[idx]?.max(0.0),
                demand_score: demand[idx]?,
                supply_score: supply[idx]?,
                profit_potential: profit[idx]?,
            })
        })();

        match row {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} incomplete market rows", skipped);
    }

    Ok(records)
}
