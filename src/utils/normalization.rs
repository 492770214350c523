//! Normalization Utilities
//!
//! Shared curves that map raw agronomic and market values onto [0, 1].
//! Every function here is total: degenerate inputs (zero requirement, empty
//! price spread, non-positive decay width) resolve to a defined value rather
//! than NaN or a panic.

use crate::types::ValueRange;

/// Clamp to the unit interval, mapping NaN to 0
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Score a nutrient reading against the crop's requirement
///
/// Curve:
/// - below requirement: linear `reading / requirement` (0 at zero nutrient)
/// - requirement ..= 2x requirement: 1.0
/// - above 2x: decays linearly `1 - (reading - 2r) / 2r`, floored at 0.5
pub fn nutrient_score(reading: f64, requirement: f64) -> f64 {
    if requirement <= 0.0 {
        return 1.0;
    }
    let reading = reading.max(0.0);

    if reading < requirement {
        return reading / requirement;
    }

    let ceiling = requirement * 2.0;
    if reading > ceiling {
        return (1.0 - (reading - ceiling) / ceiling).max(0.5);
    }

    1.0
}

/// Score a reading against an optimal range with linear decay outside it
///
/// 1.0 inside `[min, max]`; outside, the score drops by `distance / half_width`
/// measured from the nearer bound and is floored at 0.
pub fn range_score(value: f64, range: &ValueRange, half_width: f64) -> f64 {
    if range.contains(value) {
        return 1.0;
    }
    if half_width <= 0.0 {
        return 0.0;
    }

    let distance = (value - range.min).abs().min((value - range.max).abs());
    (1.0 - distance / half_width).max(0.0)
}

/// Optional reading: absent values are neutral (1.0)
pub fn optional_range_score(value: Option<f64>, range: &ValueRange, half_width: f64) -> f64 {
    value.map_or(1.0, |v| range_score(v, range, half_width))
}

/// Min-max normalize `value` into [0, 1]
///
/// Defined as 0 when the spread is empty (min == max).
pub fn min_max_normalize(value: f64, min: f64, max: f64) -> f64 {
    let spread = max - min;
    if spread <= 0.0 {
        return 0.0;
    }
    clamp_unit((value - min) / spread)
}
