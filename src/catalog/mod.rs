//! Nutrient catalog
//!
//! Immutable in-memory set of known foods, loaded once and shared read-only.
//! Lookup goes through normalized keys (lowercase, trimmed names).

mod orchestrator;
mod resolver;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::CatalogEntry;

pub use orchestrator::resolve_best;
pub use resolver::{resolve, resolve_with_stage, MatchStage, Resolution};

/// Catalog bundled into the binary
const BUNDLED_CATALOG: &str = include_str!("../../data/nutrients.json");

/// Catalog load error types
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog is not a valid list of food records: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Catalog record {index} has an empty name")]
    EmptyName { index: usize },

    #[error("Catalog record '{name}' has an invalid {field} value")]
    InvalidNutrient { name: String, field: &'static str },
}

/// Normalize a food name or label into a lookup key
pub fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The nutrient catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Entries in load order
    entries: Vec<CatalogEntry>,
    /// Distinct keys in order of first appearance
    keys: Vec<String>,
    /// Key to index of the last entry carrying it
    index: HashMap<String, usize>,
}

impl Catalog {
    /// A catalog with no entries; every resolution against it returns none
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from entries in load order
    ///
    /// Entries whose names normalize to the same key silently overwrite
    /// earlier ones for lookup purposes.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, CatalogLoadError> {
        let mut keys = Vec::new();
        let mut index = HashMap::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            let key = entry.normalized_key();
            if key.is_empty() {
                return Err(CatalogLoadError::EmptyName { index: i });
            }
            if let Some(field) = entry.nutrients.invalid_field() {
                return Err(CatalogLoadError::InvalidNutrient {
                    name: entry.name.clone(),
                    field,
                });
            }

            if index.insert(key.clone(), i).is_some() {
                debug!("Catalog key '{}' redefined by record {}", key, i);
            } else {
                keys.push(key);
            }
        }

        Ok(Self {
            entries,
            keys,
            index,
        })
    }

    /// Parse a JSON array of `{name, servingSize, nutrients}` records
    pub fn from_json_str(json: &str) -> Result<Self, CatalogLoadError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    /// Load a catalog from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogLoadError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let catalog = Self::from_json_str(&json)?;
        info!(
            "Loaded {} catalog entries ({} keys) from {}",
            catalog.entries.len(),
            catalog.keys.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Load the catalog compiled into the binary
    pub fn bundled() -> Result<Self, CatalogLoadError> {
        let catalog = Self::from_json_str(BUNDLED_CATALOG)?;
        info!("Loaded {} bundled catalog entries", catalog.entries.len());
        Ok(catalog)
    }

    /// Load from `path`, or the bundled catalog when no path is given
    ///
    /// A load failure is logged and yields an empty catalog so the service
    /// keeps running; resolution against it always returns none.
    pub fn load_or_empty(path: Option<&Path>) -> Self {
        let loaded = match path {
            Some(path) => Self::load(path),
            None => Self::bundled(),
        };

        loaded.unwrap_or_else(|e| {
            warn!("{}; continuing with an empty catalog", e);
            Self::empty()
        })
    }

    /// All entries in load order
    pub fn all_entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Exact lookup by normalized key
    pub fn by_key(&self, key: &str) -> Option<&CatalogEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    /// Distinct keys in stable load order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Catalog;
    use crate::models::{CatalogEntry, NutrientProfile};

    pub fn entry(name: &str, calories: f64) -> CatalogEntry {
        CatalogEntry {
            name: name.to_string(),
            serving_size: "1 serving".to_string(),
            nutrients: NutrientProfile {
                calories,
                ..NutrientProfile::zero()
            },
        }
    }

    pub fn catalog(names: &[&str]) -> Catalog {
        let entries = names
            .iter()
            .enumerate()
            .map(|(i, name)| entry(name, (i + 1) as f64 * 100.0))
            .collect();
        Catalog::from_entries(entries).unwrap()
    }
}
