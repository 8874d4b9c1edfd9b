//! Data models
//!
//! Value types shared by the catalog, both analysis pathways, and callers.

mod analysis_result;
mod candidate;
mod catalog_entry;
mod meal_record;
mod nutrition;

pub use analysis_result::UnifiedResult;
pub use candidate::Candidate;
pub use catalog_entry::CatalogEntry;
pub use meal_record::{DailySummary, MealRecord};
pub use nutrition::NutrientProfile;
