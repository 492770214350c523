use crate::error::Result;
use crate::types::{CropRequirement, SoilReading};

/// How a nutrient reading compares to the crop's requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutrientLevel {
    /// 90-110% of requirement
    Ideal,
    /// Above 130%
    High,
    /// At least 70% (or 110-130%)
    Adequate,
    /// Below 70%
    Low,
}

pub fn classify_nutrient(actual: f64, required: f64) -> NutrientLevel {
    if required <= 0.0 {
        return NutrientLevel::Ideal;
    }
    let ratio = actual / required;
    if (0.9..=1.1).contains(&ratio) {
        NutrientLevel::Ideal
    } else if ratio > 1.3 {
        NutrientLevel::High
    } else if ratio >= 0.7 {
        NutrientLevel::Adequate
    } else {
        NutrientLevel::Low
    }
}

fn nutrient_sentence(nutrient: &str, actual: f64, required: f64, crop: &str) -> String {
    match classify_nutrient(actual, required) {
        NutrientLevel::Ideal => format!("Your soil's {} level ({:.1}) is ideal for {}.", nutrient, actual, crop),
        NutrientLevel::High => format!(
            "Your soil's {} level ({:.1}) is higher than ideal for {}, but still acceptable.",
            nutrient, actual, crop
        ),
        NutrientLevel::Adequate => format!("Your soil's {} level ({:.1}) is adequate for {}.", nutrient, actual, crop),
        NutrientLevel::Low => format!(
            "Your soil's {} level ({:.1}) is lower than ideal for {}, which needs about {}.",
            nutrient, actual, crop, required
        ),
    }
}

/// Plain-language rationale for recommending `crop` given `reading`
///
/// Covers the three nutrients, pH, temperature (when measured), season fit for
/// the reading's month and the growing duration.
///
/// # Errors
/// `MissingParameter` if nitrogen, phosphorus, potassium or pH is absent.
pub fn crop_rationale(crop: &CropRequirement, reading: &SoilReading) -> Result<String> {
    let reading = reading.clamped();
    let core = reading.core()?;
    let name = crop.crop_name.as_str();

    let mut parts = vec![
        nutrient_sentence("nitrogen", core.nitrogen, crop.nitrogen, name),
        nutrient_sentence("phosphorus", core.phosphorus, crop.phosphorus, name),
        nutrient_sentence("potassium", core.potassium, crop.potassium, name),
    ];

    let ph = &crop.ph;
    parts.push(if ph.contains(core.ph) {
        format!("Your soil's pH ({:.1}) is in the ideal range for {}.", core.ph, name)
    } else {
        let tendency = if core.ph < ph.min { "acidic" } else { "alkaline" };
        format!(
            "Your soil's pH ({:.1}) is slightly too {} for {}, which prefers a pH of {}-{}.",
            core.ph, tendency, name, ph.min, ph.max
        )
    });

    if let Some(temperature) = reading.temperature {
        let range = &crop.temperature;
        parts.push(if range.contains(temperature) {
            format!("The temperature ({:.1}°C) is in the ideal range for {}.", temperature, name)
        } else {
            let tendency = if temperature < range.min { "cooler" } else { "warmer" };
            format!(
                "The temperature ({:.1}°C) is slightly {} than ideal for {}, which prefers {}-{}°C.",
                temperature, tendency, name, range.min, range.max
            )
        });
    }

    parts.push(if crop.season.accepts_month(reading.month) {
        format!(
            "{} is well-suited for planting in month {} (part of the {} season).",
            name, reading.month, crop.season
        )
    } else {
        format!(
            "While {} is typically a {} crop, it might still work in month {} with some adjustments.",
            name, crop.season, reading.month
        )
    });

    parts.push(format!(
        "{} typically takes about {} days to grow until harvest.",
        name, crop.growing_days
    ));

    Ok(parts.join(" "))
}
