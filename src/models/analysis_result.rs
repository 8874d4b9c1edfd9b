//! Unified analysis result
//!
//! The common output of both analysis pathways. Nothing in it records which
//! pathway produced it.

use serde::{Deserialize, Serialize};

use super::{CatalogEntry, NutrientProfile};

/// Food identity plus nutrients, ready for presentation or storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedResult {
    pub food_name: String,
    pub serving_size: String,
    pub nutrients: NutrientProfile,
    pub confidence: f64,
}

impl UnifiedResult {
    /// Build a result from a resolved catalog entry and the confidence of the
    /// candidate that resolved to it
    pub fn from_catalog_entry(entry: &CatalogEntry, confidence: f64) -> Self {
        Self {
            food_name: entry.name.clone(),
            serving_size: entry.serving_size.clone(),
            nutrients: entry.nutrients,
            confidence,
        }
    }
}
