//! Plain-language explanations for recommended crops
//!
//! - `crop_rationale`: how a soil reading compares to one crop's requirements
//! - `market_narrative`: price, movement and demand/supply summary for a crop

pub mod crop_rationale;
pub mod market_narrative;

pub use crop_rationale::{classify_nutrient, crop_rationale, NutrientLevel};
pub use market_narrative::{display_name, explain_market_trends};
