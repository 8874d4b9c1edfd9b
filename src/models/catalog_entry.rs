//! Catalog entry model
//!
//! One known food with its nutrient profile, as stored in the bundled catalog.

use serde::{Deserialize, Serialize};

use super::NutrientProfile;
use crate::catalog::normalize_key;

/// A food in the nutrient catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub name: String,
    /// Free text, e.g. "1 slice (107g)"
    pub serving_size: String,
    pub nutrients: NutrientProfile,
}

impl CatalogEntry {
    /// Lookup key for this entry
    pub fn normalized_key(&self) -> String {
        normalize_key(&self.name)
    }
}
